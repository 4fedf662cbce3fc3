//! YAML project configuration
//!
//! Deserializes palette and conversion-job declarations from a project
//! file and turns them into the runtime types the builder consumes.

use serde::Deserialize;
use thiserror::Error;

use crate::color::{ColorMode, Rgba};
use crate::image::{ImageRef, Rotation};
use crate::palette::{
    ConvertJob, FixedColor, Palette, Tileset, TilesetGroup, DEFAULT_QUANTIZE_SPEED,
    PALETTE_MAX_ENTRIES,
};

/// Error produced while reading project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid rotation {degrees} for image '{path}' (expected 0, 90, 180 or 270)")]
    InvalidRotation { path: String, degrees: u16 },
}

/// Top-level project configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Palette declarations.
    #[serde(default)]
    pub palettes: Vec<PaletteConfig>,

    /// Conversion-job declarations, consulted by automatic palettes.
    #[serde(default)]
    pub converts: Vec<ConvertConfig>,
}

impl Config {
    /// Parse a configuration document.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }
}

/// One palette declaration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PaletteConfig {
    pub name: String,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default)]
    pub mode: ColorMode,

    #[serde(default = "default_quantize_speed")]
    pub quantize_speed: i32,

    /// Discover images from converts that reference this palette.
    #[serde(default)]
    pub automatic: bool,

    #[serde(default)]
    pub fixed_entries: Vec<FixedEntryConfig>,

    #[serde(default)]
    pub images: Vec<ImageConfig>,
}

fn default_max_entries() -> usize {
    PALETTE_MAX_ENTRIES
}

fn default_quantize_speed() -> i32 {
    DEFAULT_QUANTIZE_SPEED
}

/// A pinned color declaration.
#[derive(Debug, Deserialize)]
pub struct FixedEntryConfig {
    pub index: usize,
    pub color: RgbConfig,
    #[serde(default)]
    pub exact: bool,
}

/// An RGB triplet in configuration.
#[derive(Debug, Deserialize)]
pub struct RgbConfig {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A source image: either a bare path or a path with transforms.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageConfig {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        rotate: u16,
        #[serde(default, rename = "flip-x")]
        flip_x: bool,
        #[serde(default, rename = "flip-y")]
        flip_y: bool,
    },
}

impl ImageConfig {
    fn to_image_ref(&self) -> Result<ImageRef, ConfigError> {
        match self {
            ImageConfig::Path(path) => Ok(ImageRef::new(path)),
            ImageConfig::Detailed {
                path,
                rotate,
                flip_x,
                flip_y,
            } => {
                let rotation = Rotation::from_degrees(*rotate).ok_or_else(|| {
                    ConfigError::InvalidRotation {
                        path: path.clone(),
                        degrees: *rotate,
                    }
                })?;
                Ok(ImageRef::new(path)
                    .with_rotation(rotation)
                    .with_flip_x(*flip_x)
                    .with_flip_y(*flip_y))
            }
        }
    }
}

impl PaletteConfig {
    /// Build the runtime palette this declaration describes.
    pub fn to_palette(&self) -> Result<Palette, ConfigError> {
        let mut palette = Palette::new(&self.name)
            .with_max_entries(self.max_entries)
            .with_mode(self.mode)
            .with_quantize_speed(self.quantize_speed)
            .automatic(self.automatic);

        for fixed in &self.fixed_entries {
            palette.add_fixed_color(FixedColor::new(
                fixed.index,
                Rgba::opaque(fixed.color.r, fixed.color.g, fixed.color.b),
                fixed.exact,
            ));
        }

        for image in &self.images {
            palette.add_image(image.to_image_ref()?);
        }

        Ok(palette)
    }
}

/// One conversion-job declaration, reduced to what palette construction
/// needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConvertConfig {
    pub name: String,

    /// Name of the palette this job encodes against.
    pub palette: String,

    #[serde(default)]
    pub images: Vec<ImageConfig>,

    #[serde(default)]
    pub tilesets: Vec<ImageConfig>,
}

impl ConvertConfig {
    /// Build the job descriptor this declaration describes.
    pub fn to_job(&self) -> Result<ConvertJob, ConfigError> {
        let images = self
            .images
            .iter()
            .map(ImageConfig::to_image_ref)
            .collect::<Result<Vec<_>, _>>()?;

        let tilesets = self
            .tilesets
            .iter()
            .map(|t| Ok(Tileset { image: t.to_image_ref()? }))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(ConvertJob {
            palette_name: self.palette.clone(),
            images,
            tileset_group: if tilesets.is_empty() {
                None
            } else {
                Some(TilesetGroup { tilesets })
            },
        })
    }
}
