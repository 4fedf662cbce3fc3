//! Shared test doubles for palette construction
//!
//! The real quantizer's output order is not reproducible, so the
//! integration tests drive the protocol with a deterministic mock: it
//! keeps the first occurrence of every distinct RGB it sees (seeds first,
//! then pixels in submission order) and returns up to `max_colors` of
//! them. The image loader serves decoded buffers from memory so no test
//! touches the filesystem.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use palgen::{
    DecodedImage, ImageError, ImageLoader, ImageRef, QuantizeError, QuantizeSession, Quantizer,
    Rgba,
};

/// Deterministic quantizer: distinct colors in first-seen order.
pub struct MockQuantizer {
    drop_seeds: bool,
}

impl MockQuantizer {
    pub fn new() -> Self {
        Self { drop_seeds: false }
    }

    /// A misbehaving variant that loses its seed colors, for exercising
    /// the unresolved-fixed-color path.
    pub fn dropping_seeds() -> Self {
        Self { drop_seeds: true }
    }
}

impl Quantizer for MockQuantizer {
    fn begin(
        &self,
        _speed: i32,
        max_colors: usize,
    ) -> Result<Box<dyn QuantizeSession>, QuantizeError> {
        Ok(Box::new(MockSession {
            max_colors,
            drop_seeds: self.drop_seeds,
            colors: Vec::new(),
        }))
    }
}

struct MockSession {
    max_colors: usize,
    drop_seeds: bool,
    colors: Vec<Rgba>,
}

impl MockSession {
    fn push_distinct(&mut self, color: Rgba) {
        if !self.colors.iter().any(|c| c.rgb_eq(&color)) {
            self.colors.push(color);
        }
    }
}

impl QuantizeSession for MockSession {
    fn add_fixed_color(&mut self, color: Rgba) -> Result<(), QuantizeError> {
        if !self.drop_seeds {
            self.push_distinct(color);
        }
        Ok(())
    }

    fn add_pixels(&mut self, pixels: &[Rgba]) -> Result<(), QuantizeError> {
        for &px in pixels {
            self.push_distinct(px);
        }
        Ok(())
    }

    fn quantize(&mut self) -> Result<Vec<Rgba>, QuantizeError> {
        Ok(self.colors.iter().copied().take(self.max_colors).collect())
    }
}

/// Quantizer whose sessions always fail to quantize, with drop tracking
/// to verify resources are released on the failure path.
pub struct FailingQuantizer {
    pub session_dropped: Arc<AtomicBool>,
}

impl FailingQuantizer {
    pub fn new() -> Self {
        Self {
            session_dropped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Quantizer for FailingQuantizer {
    fn begin(
        &self,
        _speed: i32,
        _max_colors: usize,
    ) -> Result<Box<dyn QuantizeSession>, QuantizeError> {
        Ok(Box::new(FailingSession {
            dropped: Arc::clone(&self.session_dropped),
        }))
    }
}

struct FailingSession {
    dropped: Arc<AtomicBool>,
}

impl Drop for FailingSession {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl QuantizeSession for FailingSession {
    fn add_fixed_color(&mut self, _color: Rgba) -> Result<(), QuantizeError> {
        Ok(())
    }

    fn add_pixels(&mut self, _pixels: &[Rgba]) -> Result<(), QuantizeError> {
        Ok(())
    }

    fn quantize(&mut self) -> Result<Vec<Rgba>, QuantizeError> {
        Err(QuantizeError::Backend("mock quantizer failure".into()))
    }
}

/// In-memory [`ImageLoader`]; unknown paths fail like a missing file.
#[derive(Default)]
pub struct MemoryLoader {
    images: HashMap<PathBuf, DecodedImage>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-row image built from the given pixels.
    pub fn insert(&mut self, path: impl Into<PathBuf>, pixels: &[Rgba]) {
        let mut data = Vec::with_capacity(pixels.len() * 4);
        for px in pixels {
            data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
        }
        self.images.insert(
            path.into(),
            DecodedImage {
                width: pixels.len() as u32,
                height: 1,
                data,
            },
        );
    }
}

impl ImageLoader for MemoryLoader {
    fn load(&self, image: &ImageRef) -> Result<DecodedImage, ImageError> {
        self.images.get(&image.path).cloned().ok_or_else(|| {
            ImageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such image: {}", image.path.display()),
            ))
        })
    }
}
