//! Error type for palette generation

use thiserror::Error;

use crate::image::ImageError;
use crate::quant::QuantizeError;

/// Error produced by palette construction.
///
/// Any failure aborts the whole `generate` call for its palette; there is
/// no partial-success table. Callers match on the variant rather than
/// inspecting a code.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// A backend could not allocate its working state.
    #[error("out of memory while {context}")]
    Allocation {
        /// What was being done when the allocation failed.
        context: String,
    },

    /// An input path matched no files.
    #[error("could not find file(s): '{path}'")]
    ImageNotFound {
        /// The pattern or path as supplied by the caller.
        path: String,
    },

    /// A source image could not be read or decoded.
    #[error("failed to load image '{path}'")]
    ImageLoad {
        /// Path of the failing image.
        path: String,
        #[source]
        source: ImageError,
    },

    /// More fixed colors than the palette can hold, or a pinned index
    /// beyond its capacity.
    #[error("fixed colors exceed the capacity of palette '{name}' ({max} entries)")]
    TooManyFixedColors {
        /// Name of the offending palette.
        name: String,
        /// The palette's capacity.
        max: usize,
    },

    /// A palette with neither images nor fixed colors has nothing to
    /// build from.
    #[error("no fixed colors or images to create palette '{name}' with")]
    EmptyPalette {
        /// Name of the offending palette.
        name: String,
    },

    /// The external quantizer failed.
    #[error("failed to generate palette '{name}'")]
    Quantize {
        /// Name of the offending palette.
        name: String,
        #[source]
        source: QuantizeError,
    },
}
