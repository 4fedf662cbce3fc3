//! PNG file loader

use std::fs::File;
use std::io::BufReader;

use super::{DecodedImage, ImageError, ImageLoader, ImageRef};

/// Production [`ImageLoader`] decoding PNG files to RGBA8.
///
/// Grayscale, RGB, indexed and 16-bit inputs are normalized to 8-bit RGBA
/// by the decoder. Rotation and flips from the [`ImageRef`] are applied
/// before the buffer is returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngLoader;

impl PngLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageLoader for PngLoader {
    fn load(&self, image: &ImageRef) -> Result<DecodedImage, ImageError> {
        let file = File::open(&image.path)?;
        let mut decoder = png::Decoder::new(BufReader::new(file));
        decoder.set_transformations(png::Transformations::normalize_to_color8());

        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let data = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => rgb_to_rgba(&buf),
            png::ColorType::Grayscale => gray_to_rgba(&buf),
            png::ColorType::GrayscaleAlpha => gray_alpha_to_rgba(&buf),
            // Indexed is expanded to RGB(A) by normalize_to_color8
            other => return Err(ImageError::UnsupportedColorType(other)),
        };

        let mut decoded = DecodedImage {
            width: info.width,
            height: info.height,
            data,
        };

        decoded = decoded.rotated(image.rotate);
        if image.flip_x {
            decoded = decoded.flipped_x();
        }
        if image.flip_y {
            decoded = decoded.flipped_y();
        }

        Ok(decoded)
    }
}

fn rgb_to_rgba(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 3 * 4);
    for px in buf.chunks_exact(3) {
        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    out
}

fn gray_to_rgba(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() * 4);
    for &v in buf {
        out.extend_from_slice(&[v, v, v, 255]);
    }
    out
}

fn gray_alpha_to_rgba(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() * 2);
    for px in buf.chunks_exact(2) {
        out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
    }
    out
}
