//! Palette model and construction
//!
//! The [`Palette`] data model, the [`PaletteBuilder`] construction
//! protocol, and the fixed-color resolution logic that reconciles
//! quantizer output with pinned constraints.

mod builder;
mod builtin;
mod error;
#[allow(clippy::module_inception)]
mod palette;
mod resolver;

pub use builder::{ConvertJob, PaletteBuilder, Tileset, TilesetGroup};
pub use error::PaletteError;
pub use palette::{FixedColor, Palette, DEFAULT_QUANTIZE_SPEED, PALETTE_MAX_ENTRIES};
