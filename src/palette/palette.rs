//! Palette data model

use std::path::PathBuf;

use tracing::debug;

use super::error::PaletteError;
use crate::color::{Color, ColorMode, Rgba};
use crate::image::ImageRef;

/// Hard ceiling on palette capacity.
pub const PALETTE_MAX_ENTRIES: usize = 256;

/// Default speed/quality tradeoff passed to the quantizer.
pub const DEFAULT_QUANTIZE_SPEED: i32 = 3;

/// A caller-declared color pinned to a specific palette index.
///
/// A non-exact fixed color is seeded into the quantizer and moved to its
/// pinned index afterwards. An `exact` fixed color bypasses quantization
/// entirely and appears verbatim (mode-converted) at its index; pixels
/// matching its RGB never reach the quantizer. Exact entries are typically
/// transparency or key colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedColor {
    /// The table slot this color must occupy.
    pub index: usize,
    /// The declared color.
    pub color: Rgba,
    /// Whether the color bypasses quantization entirely.
    pub exact: bool,
}

impl FixedColor {
    pub const fn new(index: usize, color: Rgba, exact: bool) -> Self {
        Self {
            index,
            color,
            exact,
        }
    }
}

/// A fixed-capacity indexed color palette.
///
/// The entry table is array-backed with one `Option<Color>` per slot:
/// `None` marks an unoccupied slot. Slots below [`num_entries`] that are
/// `None` are *holes*: wasted but legal positions in the final table.
///
/// A palette is configured by the caller (or the [config
/// layer](crate::config)) and then populated exactly once by
/// [`PaletteBuilder::generate`](super::PaletteBuilder::generate).
///
/// [`num_entries`]: Palette::num_entries
#[derive(Debug, Clone)]
pub struct Palette {
    /// Palette name; reserved names select a builtin table.
    pub name: String,
    /// Capacity of the entry table, at most [`PALETTE_MAX_ENTRIES`].
    pub max_entries: usize,
    /// One past the highest occupied index after generation.
    pub num_entries: usize,
    /// The entry table, `max_entries` slots.
    pub entries: Vec<Option<Color>>,
    /// Pinned color constraints in declaration order.
    pub fixed_entries: Vec<FixedColor>,
    /// Bit layout entries are packed into.
    pub mode: ColorMode,
    /// Quantizer speed/quality tradeoff (higher is faster).
    pub quantize_speed: i32,
    /// Whether source images are discovered from conversion jobs.
    pub automatic: bool,
    /// Source images in registration order.
    pub images: Vec<ImageRef>,
}

impl Palette {
    /// Create an empty palette with default configuration: full 256-entry
    /// capacity, `1555-gbgr` mode, quantize speed 3.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_entries: PALETTE_MAX_ENTRIES,
            num_entries: 0,
            entries: vec![None; PALETTE_MAX_ENTRIES],
            fixed_entries: Vec::new(),
            mode: ColorMode::default(),
            quantize_speed: DEFAULT_QUANTIZE_SPEED,
            automatic: false,
            images: Vec::new(),
        }
    }

    /// Shrink the capacity of the entry table. Clamped to
    /// [`PALETTE_MAX_ENTRIES`].
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.min(PALETTE_MAX_ENTRIES);
        self.entries = vec![None; self.max_entries];
        self
    }

    /// Set the color mode.
    pub fn with_mode(mut self, mode: ColorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the quantizer speed/quality tradeoff.
    pub fn with_quantize_speed(mut self, speed: i32) -> Self {
        self.quantize_speed = speed;
        self
    }

    /// Enable automatic image discovery from conversion jobs.
    pub fn automatic(mut self, automatic: bool) -> Self {
        self.automatic = automatic;
        self
    }

    /// Append a pinned color constraint.
    pub fn add_fixed_color(&mut self, fixed: FixedColor) {
        self.fixed_entries.push(fixed);
    }

    /// Register a single source image.
    pub fn add_image(&mut self, image: ImageRef) {
        debug!("adding image: {} [{}]", image.path.display(), image.name);
        self.images.push(image);
    }

    /// Register every image matched for an input path.
    ///
    /// Path expansion (globbing) is the caller's collaborator; this takes
    /// the already-expanded match list and fails with
    /// [`PaletteError::ImageNotFound`] when nothing matched.
    pub fn add_images<I>(&mut self, pattern: &str, paths: I) -> Result<(), PaletteError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut matched = false;
        for path in paths {
            self.add_image(ImageRef::new(path));
            matched = true;
        }
        if !matched {
            return Err(PaletteError::ImageNotFound {
                path: pattern.to_string(),
            });
        }
        Ok(())
    }

    /// Count the holes: slots below [`num_entries`](Self::num_entries)
    /// holding no entry.
    pub fn holes(&self) -> usize {
        self.entries[..self.num_entries]
            .iter()
            .filter(|slot| slot.is_none())
            .count()
    }
}
