//! Configuration persistence for pixmark settings

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_LINE_WIDTH, DEFAULT_MOSAIC_RADIUS, Pen};
use crate::render::geometry::MOSAIC_OVERLAP;
use crate::render::mosaic::BLOCK_SIZE;

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl ShapeColor {
    /// Opaque `#ff0000`
    pub const RED: ShapeColor = ShapeColor {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

/// Folder exported images are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

impl SaveLocation {
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            SaveLocation::Pictures => {
                dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            }
            SaveLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixmarkConfig {
    /// Stroke color for rectangles, ellipses, paths and arrows
    pub pen_color: ShapeColor,
    /// Stroke width in logical pixels
    pub pen_width: f32,
    /// Mosaic brush radius in logical pixels
    pub mosaic_radius: f32,
    /// Mosaic block edge in logical pixels (scaled by the device pixel ratio)
    pub mosaic_block_size: u32,
    /// Fraction of a brush diameter consecutive mosaic dabs overlap by
    pub mosaic_overlap: f32,
    /// Where "save" writes the exported image
    pub save_location: SaveLocation,
    /// End the session after a successful copy or save
    pub exit_after_export: bool,
}

impl Default for PixmarkConfig {
    fn default() -> Self {
        Self {
            pen_color: ShapeColor::RED,
            pen_width: DEFAULT_LINE_WIDTH,
            mosaic_radius: DEFAULT_MOSAIC_RADIUS,
            mosaic_block_size: BLOCK_SIZE,
            mosaic_overlap: MOSAIC_OVERLAP,
            save_location: SaveLocation::Pictures,
            exit_after_export: true,
        }
    }
}

impl PixmarkConfig {
    const APP_DIR: &'static str = "pixmark";
    const FILE_NAME: &'static str = "config.json";

    /// Platform config file, e.g. `~/.config/pixmark/config.json`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::FILE_NAME))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("Could not resolve config path for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Pen handed to every fresh vector annotation
    pub fn pen(&self) -> Pen {
        Pen {
            color: self.pen_color,
            line_width: self.pen_width,
        }
    }
}
