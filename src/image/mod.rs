//! Source image handling
//!
//! Palette construction consumes decoded RGBA8 pixel buffers. The
//! [`ImageLoader`] trait is the seam between the core and whatever decodes
//! the files; [`PngLoader`] is the production implementation. Buffers are
//! transient: the builder loads one image, folds its pixels into the
//! quantizer histogram, and drops the buffer before touching the next.

mod png_loader;

pub use png_loader::PngLoader;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::color::Rgba;

/// Error produced while decoding a source image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("png decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("unsupported color type: {0:?}")]
    UnsupportedColorType(png::ColorType),
}

/// Rotation applied to a source image before its pixels are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees clockwise.
    Cw90,
    /// 180 degrees.
    Cw180,
    /// 270 degrees clockwise.
    Cw270,
}

impl Rotation {
    /// Map a degree value from configuration to a rotation.
    ///
    /// Only 0, 90, 180 and 270 are valid; other values are rejected.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }
}

/// A reference to a source image contributing pixels to a palette.
///
/// Holds the path and the transforms to apply on load. The decoded pixel
/// buffer is deliberately not part of this type; it only exists while the
/// image is being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Path to the image file.
    pub path: PathBuf,
    /// Name derived from the file stem, used in diagnostics.
    pub name: String,
    /// Rotation applied on load.
    pub rotate: Rotation,
    /// Mirror horizontally after rotation.
    pub flip_x: bool,
    /// Mirror vertically after rotation.
    pub flip_y: bool,
}

impl ImageRef {
    /// Create an untransformed reference to an image file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            rotate: Rotation::None,
            flip_x: false,
            flip_y: false,
        }
    }

    /// Set the rotation applied on load.
    pub fn with_rotation(mut self, rotate: Rotation) -> Self {
        self.rotate = rotate;
        self
    }

    /// Set the horizontal flip applied on load.
    pub fn with_flip_x(mut self, flip: bool) -> Self {
        self.flip_x = flip;
        self
    }

    /// Set the vertical flip applied on load.
    pub fn with_flip_y(mut self, flip: bool) -> Self {
        self.flip_y = flip;
        self
    }
}

/// A decoded RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 data, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Number of pixels in the buffer.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Iterate over the pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(4)
            .map(|px| Rgba::new(px[0], px[1], px[2], px[3]))
    }

    /// Rotate the image clockwise.
    pub fn rotated(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => self,
            Rotation::Cw90 => self.rotated_90(),
            Rotation::Cw180 => self.rotated_90().rotated_90(),
            Rotation::Cw270 => self.rotated_90().rotated_90().rotated_90(),
        }
    }

    fn rotated_90(self) -> Self {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut out = vec![0u8; self.data.len()];
        for y in 0..h {
            for x in 0..w {
                // (x, y) lands at (h - 1 - y, x) in the rotated image
                let src = (y * w + x) * 4;
                let dst = (x * h + (h - 1 - y)) * 4;
                out[dst..dst + 4].copy_from_slice(&self.data[src..src + 4]);
            }
        }
        Self {
            width: self.height,
            height: self.width,
            data: out,
        }
    }

    /// Mirror the image horizontally.
    pub fn flipped_x(mut self) -> Self {
        let w = self.width as usize;
        for row in self.data.chunks_exact_mut(w * 4) {
            for x in 0..w / 2 {
                let (a, b) = (x * 4, (w - 1 - x) * 4);
                for c in 0..4 {
                    row.swap(a + c, b + c);
                }
            }
        }
        self
    }

    /// Mirror the image vertically.
    pub fn flipped_y(mut self) -> Self {
        let (w, h) = (self.width as usize, self.height as usize);
        let row_bytes = w * 4;
        for y in 0..h / 2 {
            let (top, bottom) = (y * row_bytes, (h - 1 - y) * row_bytes);
            for i in 0..row_bytes {
                self.data.swap(top + i, bottom + i);
            }
        }
        self
    }
}

/// Decodes an [`ImageRef`] into an RGBA8 buffer with its transforms applied.
///
/// Injected into the palette builder so the core never touches the
/// filesystem in tests.
pub trait ImageLoader {
    /// Load and decode the referenced image.
    fn load(&self, image: &ImageRef) -> Result<DecodedImage, ImageError>;
}
