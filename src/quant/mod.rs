//! Quantizer interface
//!
//! The external color quantizer is injected behind a trait so tests can
//! substitute a deterministic implementation; the production backend's
//! output order is not reproducible across runs and nothing in the core
//! may depend on it. A [`QuantizeSession`] owns all backend resources for
//! one `generate` call and releases them on drop, failure paths included.

mod liq;

pub use liq::LiqQuantizer;

use thiserror::Error;

use crate::color::Rgba;

/// Error reported by a quantizer backend.
#[derive(Debug, Error)]
pub enum QuantizeError {
    /// The backend could not allocate its working state.
    #[error("out of memory")]
    OutOfMemory,

    /// Any other backend failure, with the backend's own message.
    #[error("{0}")]
    Backend(String),
}

/// Factory for quantization sessions.
pub trait Quantizer {
    /// Start a session with the given speed/quality tradeoff and color
    /// ceiling. The session never produces more than `max_colors` colors.
    fn begin(&self, speed: i32, max_colors: usize)
        -> Result<Box<dyn QuantizeSession>, QuantizeError>;
}

/// One quantization run: seed colors, streamed pixels, one result.
///
/// Dropping the session releases the backend's histogram and attribute
/// resources.
pub trait QuantizeSession {
    /// Seed a color that must appear in the output if at all possible,
    /// without biasing frequency-based selection.
    fn add_fixed_color(&mut self, color: Rgba) -> Result<(), QuantizeError>;

    /// Fold a flattened row of pixels into the histogram, weighted
    /// uniformly.
    fn add_pixels(&mut self, pixels: &[Rgba]) -> Result<(), QuantizeError>;

    /// Run quantization over everything accumulated so far and return the
    /// representative colors, at most `max_colors` of them, in backend
    /// order.
    fn quantize(&mut self) -> Result<Vec<Rgba>, QuantizeError>;
}
