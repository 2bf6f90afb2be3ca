use egui::{Color32, Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::element::common::{TEXT_CHAR_WIDTH_EM, TEXT_LINE_HEIGHT_EM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Typography of a text object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub color: Color32,
    pub align: TextAlign,
}

impl TextStyle {
    /// Copy with a storable font size: negative sizes become 0 and
    /// non-finite ones the default
    pub fn sanitized(self) -> Self {
        let font_size = if self.font_size.is_finite() {
            self.font_size.max(0.0)
        } else {
            Self::default().font_size
        };
        Self { font_size, ..self }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "inter".to_owned(),
            font_size: 48.0,
            color: Color32::BLACK,
            align: TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    pub content: String,
    pub style: TextStyle,
}

impl TextObject {
    pub fn new(content: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: content.into(),
            style: style.sanitized(),
        }
    }

    /// Approximate box occupied by the text.
    ///
    /// Glyph shaping belongs to the renderer; this estimate only drives hit
    /// testing and bounds.
    pub fn estimated_size(&self) -> Vec2 {
        let size = self.style.font_size.max(0.0);
        let lines = self.content.split('\n');
        let (count, widest) = lines.fold((0usize, 0usize), |(count, widest), line| {
            (count + 1, widest.max(line.chars().count()))
        });
        vec2(
            widest as f32 * size * TEXT_CHAR_WIDTH_EM,
            count as f32 * size * TEXT_LINE_HEIGHT_EM,
        )
    }
}
