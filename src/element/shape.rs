use egui::{Color32, Pos2, Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::gradient::LinearGradient;

/// Paint used to fill an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    Solid(Color32),
    /// Gradient in the coordinate space of the filled box (origin top-left)
    Gradient(LinearGradient),
}

impl Fill {
    pub fn color_at(&self, point: Pos2) -> Color32 {
        match self {
            Fill::Solid(color) => *color,
            Fill::Gradient(gradient) => gradient.sample(point).to_color32(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeObject {
    pub kind: ShapeKind,
    pub width: f32,
    pub height: f32,
    pub fill: Fill,
}

impl ShapeObject {
    pub fn new(kind: ShapeKind, width: f32, height: f32, fill: Fill) -> Self {
        Self {
            kind,
            width: if width.is_finite() { width.max(0.0) } else { 0.0 },
            height: if height.is_finite() { height.max(0.0) } else { 0.0 },
            fill,
        }
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }

    pub fn contains_local(&self, local: Vec2) -> bool {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        match self.kind {
            ShapeKind::Rectangle => local.x.abs() <= hw && local.y.abs() <= hh,
            ShapeKind::Ellipse => {
                if hw <= 0.0 || hh <= 0.0 {
                    return false;
                }
                let (nx, ny) = (local.x / hw, local.y / hh);
                nx * nx + ny * ny <= 1.0
            }
        }
    }

    /// Fill colour at a local point (origin at the shape centre)
    pub fn color_at(&self, local: Vec2) -> Color32 {
        let in_box = (local + self.size() / 2.0).to_pos2();
        self.fill.color_at(in_box)
    }
}
