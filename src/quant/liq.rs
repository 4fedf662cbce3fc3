//! libimagequant-backed quantizer

use super::{QuantizeError, QuantizeSession, Quantizer};
use crate::color::Rgba;

/// Production [`Quantizer`] backed by the `imagequant` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiqQuantizer;

impl LiqQuantizer {
    pub fn new() -> Self {
        Self
    }
}

impl Quantizer for LiqQuantizer {
    fn begin(
        &self,
        speed: i32,
        max_colors: usize,
    ) -> Result<Box<dyn QuantizeSession>, QuantizeError> {
        let mut attr = imagequant::new();
        attr.set_speed(speed).map_err(map_liq)?;
        attr.set_max_colors(max_colors as u32).map_err(map_liq)?;
        let hist = imagequant::Histogram::new(&attr);
        Ok(Box::new(LiqSession { attr, hist }))
    }
}

struct LiqSession {
    attr: imagequant::Attributes,
    hist: imagequant::Histogram,
}

impl QuantizeSession for LiqSession {
    fn add_fixed_color(&mut self, color: Rgba) -> Result<(), QuantizeError> {
        self.hist
            .add_fixed_color(to_liq(color), 0.0)
            .map_err(map_liq)
    }

    fn add_pixels(&mut self, pixels: &[Rgba]) -> Result<(), QuantizeError> {
        let row: Vec<imagequant::RGBA> = pixels.iter().copied().map(to_liq).collect();
        let mut image = self
            .attr
            .new_image(row, pixels.len(), 1, 0.0)
            .map_err(map_liq)?;
        self.hist.add_image(&self.attr, &mut image).map_err(map_liq)
    }

    fn quantize(&mut self) -> Result<Vec<Rgba>, QuantizeError> {
        let mut result = self.hist.quantize(&self.attr).map_err(map_liq)?;
        Ok(result
            .palette()
            .iter()
            .map(|c| Rgba::new(c.r, c.g, c.b, c.a))
            .collect())
    }
}

#[inline]
fn to_liq(color: Rgba) -> imagequant::RGBA {
    imagequant::RGBA::new(color.r, color.g, color.b, color.a)
}

fn map_liq(err: imagequant::Error) -> QuantizeError {
    match err {
        imagequant::Error::OutOfMemory => QuantizeError::OutOfMemory,
        other => QuantizeError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_respects_max_colors() {
        let mut session = LiqQuantizer::new().begin(3, 4).unwrap();
        let pixels: Vec<Rgba> = (0u8..=255)
            .map(|v| Rgba::opaque(v, v.wrapping_mul(3), v.wrapping_mul(7)))
            .collect();
        session.add_pixels(&pixels).unwrap();
        let colors = session.quantize().unwrap();
        assert!(!colors.is_empty());
        assert!(colors.len() <= 4);
    }

    #[test]
    fn test_fixed_color_survives_quantization() {
        let mut session = LiqQuantizer::new().begin(3, 8).unwrap();
        let key = Rgba::opaque(255, 0, 255);
        session.add_fixed_color(key).unwrap();
        session
            .add_pixels(&vec![Rgba::opaque(10, 10, 10); 64])
            .unwrap();
        let colors = session.quantize().unwrap();
        assert!(colors.iter().any(|c| c.rgb_eq(&key)));
    }
}
