//! Fixed-color resolution
//!
//! Merges the quantizer's output with the pinned color constraints. The
//! table is reconciled in three passes over the same slot array: store the
//! quantized colors, move non-exact fixed colors to their pinned indices
//! by swapping, then write exact fixed colors, relocating whatever their
//! pinned index currently holds. No occupied slot is ever dropped.

use tracing::warn;

use super::palette::FixedColor;
use crate::color::{Color, ColorMode};

pub(super) struct FixedColorResolver<'a> {
    entries: &'a mut [Option<Color>],
    mode: ColorMode,
    max_index: Option<usize>,
}

impl<'a> FixedColorResolver<'a> {
    pub(super) fn new(entries: &'a mut [Option<Color>], mode: ColorMode) -> Self {
        Self {
            entries,
            mode,
            max_index: None,
        }
    }

    /// Store the quantizer's colors at the front of the table.
    pub(super) fn store_quantized(&mut self, colors: &[Color]) {
        for (i, &color) in colors.iter().enumerate() {
            self.entries[i] = Some(color);
            self.bump(i);
        }
    }

    /// Move each non-exact fixed color to its pinned index.
    ///
    /// The color was seeded into the quantizer, so it is expected among the
    /// first `quant_count` slots; swapping it into place relocates the
    /// displaced occupant to the vacated slot instead of dropping it. A
    /// seed the quantizer did not return leaves its pinned slot
    /// unresolved; the unmet constraint is surfaced as a warning, not an
    /// error.
    pub(super) fn place_non_exact(&mut self, fixed: &[FixedColor], quant_count: usize) {
        for entry in fixed.iter().filter(|f| !f.exact) {
            let want = self.mode.convert(entry.color);
            let found = self.entries[..quant_count]
                .iter()
                .position(|slot| slot.is_some_and(|c| c.rgba.rgb_eq(&want.rgba)));

            match found {
                Some(pos) => {
                    self.entries.swap(pos, entry.index);
                    self.bump(entry.index);
                }
                None => {
                    warn!(
                        "fixed color ({}, {}, {}) not present in quantized output; \
                         palette index {} left unresolved",
                        entry.color.r, entry.color.g, entry.color.b, entry.index
                    );
                }
            }
        }
    }

    /// Write each exact fixed color at its pinned index.
    ///
    /// Runs after all non-exact placements. A current occupant of the
    /// pinned index is first moved to the lowest free slot; one always
    /// exists because the quantizer's color budget excluded every exact
    /// entry.
    pub(super) fn place_exact(&mut self, fixed: &[FixedColor]) {
        for entry in fixed.iter().filter(|f| f.exact) {
            let converted = self.mode.convert(entry.color);

            if self.entries[entry.index].is_some() {
                if let Some(free) = self.entries.iter().position(Option::is_none) {
                    self.entries[free] = self.entries[entry.index].take();
                    self.bump(free);
                }
            }

            self.entries[entry.index] = Some(converted);
            self.bump(entry.index);
        }
    }

    /// One past the highest occupied index, or 0 for an empty table.
    pub(super) fn num_entries(&self) -> usize {
        self.max_index.map_or(0, |i| i + 1)
    }

    fn bump(&mut self, index: usize) {
        self.max_index = Some(self.max_index.map_or(index, |m| m.max(index)));
    }
}
