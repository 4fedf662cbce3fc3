//! palgen: indexed palette generation for constrained image encoders
//!
//! This library builds fixed-capacity indexed color palettes (up to 256
//! entries) for downstream image encoding on memory-constrained targets.
//! Callers supply source images, pinned ("fixed") color constraints, and a
//! color mode; the builder merges an externally computed quantization
//! result with the pinned constraints into one consistent, gap-aware index
//! table.
//!
//! # Quick Start
//!
//! ```
//! use palgen::{FixedColor, Palette, PaletteBuilder, Rgba};
//!
//! // A palette with one exact key color and no images quantizes nothing:
//! // the fixed entries become the whole table.
//! let mut palette = Palette::new("ui");
//! palette.add_fixed_color(FixedColor::new(0, Rgba::opaque(0, 0, 0), true));
//!
//! PaletteBuilder::new().generate(&mut palette, &[]).unwrap();
//! assert_eq!(palette.num_entries, 1);
//! ```
//!
//! # Construction protocol
//!
//! For a palette with source images, [`PaletteBuilder::generate`] runs the
//! full pipeline:
//!
//! 1. Reserved names (`xlibc`, `rgb332`) bypass everything and produce a
//!    builtin 256-color reference table.
//! 2. An `automatic` palette first collects its images from the conversion
//!    jobs that reference it by name.
//! 3. Each image is decoded, filtered (pixels matching an exact fixed
//!    color never reach the quantizer), mode-converted, and folded into
//!    the quantizer histogram; one image buffer is resident at a time.
//! 4. The quantizer runs once, its output lands at the front of the entry
//!    table, and the fixed-color constraints are resolved against it:
//!    non-exact entries are swapped to their pinned indices, exact entries
//!    are written there after relocating any occupant. Nothing is dropped
//!    in the process, but slots can end up as *holes*: positions below
//!    `num_entries` holding no entry.
//!
//! # Injected backends
//!
//! The quantizer and the image decoder sit behind the [`Quantizer`] and
//! [`ImageLoader`] traits. Production code uses libimagequant and a PNG
//! decoder; tests substitute deterministic doubles, because the real
//! quantizer's output order is not reproducible across runs.

pub mod color;
pub mod config;
pub mod image;
pub mod palette;
pub mod quant;

pub use color::{Color, ColorMode, Rgba};
pub use config::{Config, ConfigError};
pub use image::{DecodedImage, ImageError, ImageLoader, ImageRef, PngLoader, Rotation};
pub use palette::{
    ConvertJob, FixedColor, Palette, PaletteBuilder, PaletteError, Tileset, TilesetGroup,
    DEFAULT_QUANTIZE_SPEED, PALETTE_MAX_ENTRIES,
};
pub use quant::{LiqQuantizer, QuantizeError, QuantizeSession, Quantizer};
