//! Editor defaults, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::element::{TextAlign, TextStyle};
use crate::error::{EditorError, EditorResult};
use crate::gradient::{GradientConfig, HexColor};
use crate::persistence::PersistenceError;
use crate::renderer::ExportFormat;
use crate::scene::{Background, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, Scene};

/// A named canvas size offered in the design panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPreset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const CANVAS_PRESETS: [CanvasPreset; 4] = [
    CanvasPreset { name: "Square", width: 1080, height: 1080 },
    CanvasPreset { name: "Portrait", width: 1080, height: 1350 },
    CanvasPreset { name: "Landscape", width: 1920, height: 1080 },
    CanvasPreset { name: "Banner", width: 4000, height: 2000 },
];

/// Look a preset up by name, ignoring case
pub fn find_preset(name: &str) -> Option<CanvasPreset> {
    CANVAS_PRESETS.iter().copied().find(|preset| preset.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: HexColor,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background: HexColor::WHITE,
        }
    }
}

/// Style given to newly added text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub color: HexColor,
    pub align: TextAlign,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            content: "Your Text Here".to_owned(),
            font_family: "inter".to_owned(),
            font_size: 48.0,
            color: HexColor::BLACK,
            align: TextAlign::Left,
        }
    }
}

impl TextDefaults {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            color: self.color.to_color32(),
            align: self.align,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// 0 to 1
    pub quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas: CanvasConfig,
    pub gradient: GradientConfig,
    pub gradient_line_width: f32,
    pub text: TextDefaults,
    /// Share of the canvas an inserted image is scaled to fit
    pub image_fit_ratio: f32,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            gradient: GradientConfig::default(),
            gradient_line_width: 12.0,
            text: TextDefaults::default(),
            image_fit_ratio: 0.7,
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let json = fs::read_to_string(path.as_ref()).map_err(PersistenceError::from)?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(PersistenceError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EditorResult<()> {
        crate::scene::validate_dimensions(self.canvas.width, self.canvas.height)?;
        if !(self.image_fit_ratio > 0.0 && self.image_fit_ratio <= 1.0) {
            return Err(PersistenceError::InvalidDocument(format!(
                "image_fit_ratio must be in (0, 1], got {}",
                self.image_fit_ratio
            ))
            .into());
        }
        Ok(())
    }

    /// Empty scene with the configured size and background
    pub fn initial_scene(&self) -> EditorResult<Scene> {
        Scene::new(
            self.canvas.width,
            self.canvas.height,
            Background::Solid(self.canvas.background.to_color32()),
        )
    }

    pub fn preset(&self, name: &str) -> EditorResult<CanvasPreset> {
        find_preset(name).ok_or_else(|| EditorError::UnknownPreset(name.to_owned()))
    }
}
