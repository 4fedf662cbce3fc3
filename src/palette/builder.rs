//! Palette construction orchestration
//!
//! [`PaletteBuilder`] runs the full construction protocol: builtin bypass,
//! automatic image collection, quantization input assembly, and fixed-color
//! resolution. The quantizer and image loader are injected so the protocol
//! can be exercised with deterministic test doubles.

use tracing::{debug, info, warn};

use super::builtin;
use super::error::PaletteError;
use super::palette::Palette;
use super::resolver::FixedColorResolver;
use crate::color::{Color, Rgba};
use crate::image::{ImageLoader, ImageRef, PngLoader};
use crate::quant::{LiqQuantizer, QuantizeError, Quantizer};

/// An external conversion job, as seen by automatic palette construction.
///
/// Only the palette-name reference and the job's image lists matter here;
/// everything else about a conversion is out of this crate's scope.
#[derive(Debug, Clone, Default)]
pub struct ConvertJob {
    /// Name of the palette this job encodes against.
    pub palette_name: String,
    /// The job's source images, in declaration order.
    pub images: Vec<ImageRef>,
    /// Optional tileset group converted alongside the images.
    pub tileset_group: Option<TilesetGroup>,
}

/// A group of tilesets belonging to a conversion job.
#[derive(Debug, Clone, Default)]
pub struct TilesetGroup {
    /// The group's tilesets, in declaration order.
    pub tilesets: Vec<Tileset>,
}

/// A single tileset: one source image sliced downstream.
#[derive(Debug, Clone)]
pub struct Tileset {
    /// The tileset's source image.
    pub image: ImageRef,
}

/// Builds palettes from images and fixed-color constraints.
///
/// Holds the quantizer and image-loader backends; [`PaletteBuilder::new`]
/// wires the production pair (libimagequant and the PNG loader), and
/// [`with_backends`](Self::with_backends) accepts any substitute. The
/// builder is stateless across calls and reusable for any number of
/// palettes.
///
/// # Example
///
/// ```
/// use palgen::{FixedColor, Palette, PaletteBuilder, Rgba};
///
/// let mut palette = Palette::new("ui");
/// palette.add_fixed_color(FixedColor::new(0, Rgba::opaque(0, 0, 0), true));
///
/// PaletteBuilder::new().generate(&mut palette, &[]).unwrap();
/// assert_eq!(palette.num_entries, 1);
/// ```
pub struct PaletteBuilder<Q = LiqQuantizer, L = PngLoader> {
    quantizer: Q,
    loader: L,
}

impl PaletteBuilder {
    /// Create a builder with the production backends.
    pub fn new() -> Self {
        Self {
            quantizer: LiqQuantizer::new(),
            loader: PngLoader::new(),
        }
    }
}

impl Default for PaletteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Quantizer, L: ImageLoader> PaletteBuilder<Q, L> {
    /// Create a builder with injected backends.
    pub fn with_backends(quantizer: Q, loader: L) -> Self {
        Self { quantizer, loader }
    }

    /// Run the full construction protocol for one palette.
    ///
    /// On success the palette's entry table, `num_entries`, and hole
    /// accounting are final. On any failure the call aborts with no
    /// partial table and all backend resources released; the entry table
    /// is only touched once every precondition has passed.
    pub fn generate(
        &self,
        palette: &mut Palette,
        jobs: &[ConvertJob],
    ) -> Result<(), PaletteError> {
        if let Some(table) = builtin::table_for(&palette.name) {
            builtin::fill(palette, table);
            return Ok(());
        }

        info!("generating palette '{}'", palette.name);

        if palette.automatic {
            collect_automatic(palette, jobs);
        }

        if palette.fixed_entries.len() > palette.max_entries
            || palette
                .fixed_entries
                .iter()
                .any(|f| f.index >= palette.max_entries)
        {
            return Err(PaletteError::TooManyFixedColors {
                name: palette.name.clone(),
                max: palette.max_entries,
            });
        }

        if palette.images.is_empty() {
            self.generate_from_fixed(palette)
        } else {
            self.generate_from_images(palette)
        }
    }

    /// The no-images path: fixed entries become the whole table.
    fn generate_from_fixed(&self, palette: &mut Palette) -> Result<(), PaletteError> {
        warn!("creating palette '{}' without images", palette.name);

        if palette.fixed_entries.is_empty() {
            return Err(PaletteError::EmptyPalette {
                name: palette.name.clone(),
            });
        }

        let mut max_index = 0;
        for fixed in &palette.fixed_entries {
            palette.entries[fixed.index] = Some(palette.mode.convert(fixed.color));
            max_index = max_index.max(fixed.index);
        }
        palette.num_entries = max_index + 1;

        self.log_summary(palette);
        Ok(())
    }

    /// The quantization pipeline: assemble the histogram, quantize once,
    /// and resolve fixed-color constraints against the result.
    fn generate_from_images(&self, palette: &mut Palette) -> Result<(), PaletteError> {
        let exact_entries = palette.fixed_entries.iter().filter(|f| f.exact).count();
        let quant_capacity = palette.max_entries - exact_entries;

        debug!("available quantization colors: {}", quant_capacity);

        // The session owns every backend resource for this call; dropping
        // it (on any return path) releases them.
        let mut session = self
            .quantizer
            .begin(palette.quantize_speed, quant_capacity)
            .map_err(|e| quantize_failure(&palette.name, e))?;

        // Non-exact fixed colors are guaranteed-inclusion seeds; exact
        // ones stay out of the quantizer's sight entirely.
        for fixed in palette.fixed_entries.iter().filter(|f| !f.exact) {
            let seed = palette.mode.convert(fixed.color);
            session
                .add_fixed_color(seed.rgba)
                .map_err(|e| quantize_failure(&palette.name, e))?;
        }

        let exact_colors: Vec<Rgba> = palette
            .fixed_entries
            .iter()
            .filter(|f| f.exact)
            .map(|f| f.color)
            .collect();

        let mut need_quantize = false;

        if quant_capacity > 1 {
            for image in &palette.images {
                info!(" - reading '{}'", image.path.display());

                let decoded = self.loader.load(image).map_err(|e| {
                    PaletteError::ImageLoad {
                        path: image.path.display().to_string(),
                        source: e,
                    }
                })?;

                // Pixels matching an exact color's RGB must never
                // influence which colors the quantizer selects.
                let mut pixels = Vec::with_capacity(decoded.pixel_count());
                for px in decoded.pixels() {
                    if exact_colors.iter().any(|c| px.rgb_eq(c)) {
                        continue;
                    }
                    pixels.push(palette.mode.convert(px).rgba);
                }

                if !pixels.is_empty() {
                    session
                        .add_pixels(&pixels)
                        .map_err(|e| quantize_failure(&palette.name, e))?;
                    need_quantize = true;
                }
                // decoded buffer dropped here, before the next image loads
            }
        }

        let quantized: Vec<Color> = if need_quantize {
            let colors = session
                .quantize()
                .map_err(|e| quantize_failure(&palette.name, e))?;
            if colors.len() > quant_capacity {
                return Err(quantize_failure(
                    &palette.name,
                    QuantizeError::Backend(format!(
                        "quantizer returned {} colors for a budget of {}",
                        colors.len(),
                        quant_capacity
                    )),
                ));
            }
            colors
                .into_iter()
                .map(|c| palette.mode.convert(c))
                .collect()
        } else {
            Vec::new()
        };

        let mut resolver = FixedColorResolver::new(&mut palette.entries, palette.mode);
        resolver.store_quantized(&quantized);
        resolver.place_non_exact(&palette.fixed_entries, quantized.len());
        resolver.place_exact(&palette.fixed_entries);
        palette.num_entries = resolver.num_entries();

        self.log_summary(palette);
        Ok(())
    }

    fn log_summary(&self, palette: &Palette) {
        let unused = palette.max_entries - palette.num_entries + palette.holes();
        info!(
            "generated palette '{}' with {} colors ({} unused)",
            palette.name, palette.num_entries, unused
        );
    }
}

/// Register every image of every conversion job that encodes against this
/// palette, preserving job order and, within a job, images before tileset
/// images.
fn collect_automatic(palette: &mut Palette, jobs: &[ConvertJob]) {
    for job in jobs {
        if job.palette_name != palette.name {
            continue;
        }

        for image in &job.images {
            palette.add_image(image.clone());
        }

        if let Some(group) = &job.tileset_group {
            for tileset in &group.tilesets {
                palette.add_image(tileset.image.clone());
            }
        }
    }
}

fn quantize_failure(name: &str, source: QuantizeError) -> PaletteError {
    match source {
        QuantizeError::OutOfMemory => PaletteError::Allocation {
            context: format!("quantizing palette '{name}'"),
        },
        other => PaletteError::Quantize {
            name: name.to_string(),
            source: other,
        },
    }
}
