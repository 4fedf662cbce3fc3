//! Color-mode bit packing
//!
//! Target hardware stores palette entries as packed 16-bit words. Each
//! [`ColorMode`] describes one bit layout; [`ColorMode::convert`] rounds an
//! RGBA color to the nearest representable value and produces both the
//! rounded RGBA and the packed word.

use serde::Deserialize;

use super::rgba::Rgba;

/// An RGBA color together with its mode-packed representation.
///
/// A `Color` can only be produced by [`ColorMode::convert`], so its `rgba`
/// channels are always rounded to mode-representable values and `packed`
/// is always consistent with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Mode-rounded RGBA channels (alpha passes through unchanged).
    pub rgba: Rgba,
    /// The packed 16-bit form written to the target palette table.
    pub packed: u16,
}

/// Palette entry bit layout for the target hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ColorMode {
    /// 1:5:5:5 with the green LSB in the top bit: `g0 r4..r0 g5..g1 b4..b0`.
    #[default]
    #[serde(rename = "1555-gbgr")]
    Gbgr1555,
    /// Standard 5:6:5, red in the top bits.
    #[serde(rename = "565-rgb")]
    Rgb565,
    /// 5:6:5 with red and blue swapped.
    #[serde(rename = "565-bgr")]
    Bgr565,
}

/// Round an 8-bit channel down to `max + 1` levels.
#[inline]
fn quantize_channel(v: u8, max: u32) -> u8 {
    ((v as u32 * max + 127) / 255) as u8
}

/// Expand a quantized channel back to the 8-bit value it represents.
#[inline]
fn expand_channel(v: u8, max: u32) -> u8 {
    ((v as u32 * 255 + max / 2) / max) as u8
}

impl ColorMode {
    /// Convert a color to this mode.
    ///
    /// The RGB channels are rounded to the nearest mode-representable
    /// values (so converting the result again is a no-op) and packed into
    /// the mode's 16-bit layout. Alpha is carried through untouched; it
    /// never participates in packing.
    ///
    /// # Example
    ///
    /// ```
    /// use palgen::{ColorMode, Rgba};
    ///
    /// let white = ColorMode::Gbgr1555.convert(Rgba::opaque(255, 255, 255));
    /// assert_eq!(white.packed, 0xFFFF);
    /// ```
    pub fn convert(self, color: Rgba) -> Color {
        match self {
            ColorMode::Gbgr1555 => {
                let r5 = quantize_channel(color.r, 31);
                let g6 = quantize_channel(color.g, 63);
                let b5 = quantize_channel(color.b, 31);
                let packed = ((g6 as u16 & 1) << 15)
                    | ((r5 as u16) << 10)
                    | ((g6 as u16 >> 1) << 5)
                    | b5 as u16;
                Color {
                    rgba: Rgba::new(
                        expand_channel(r5, 31),
                        expand_channel(g6, 63),
                        expand_channel(b5, 31),
                        color.a,
                    ),
                    packed,
                }
            }
            ColorMode::Rgb565 => {
                let r5 = quantize_channel(color.r, 31);
                let g6 = quantize_channel(color.g, 63);
                let b5 = quantize_channel(color.b, 31);
                let packed = ((r5 as u16) << 11) | ((g6 as u16) << 5) | b5 as u16;
                Color {
                    rgba: Rgba::new(
                        expand_channel(r5, 31),
                        expand_channel(g6, 63),
                        expand_channel(b5, 31),
                        color.a,
                    ),
                    packed,
                }
            }
            ColorMode::Bgr565 => {
                let r5 = quantize_channel(color.r, 31);
                let g6 = quantize_channel(color.g, 63);
                let b5 = quantize_channel(color.b, 31);
                let packed = ((b5 as u16) << 11) | ((g6 as u16) << 5) | r5 as u16;
                Color {
                    rgba: Rgba::new(
                        expand_channel(r5, 31),
                        expand_channel(g6, 63),
                        expand_channel(b5, 31),
                        color.a,
                    ),
                    packed,
                }
            }
        }
    }
}
