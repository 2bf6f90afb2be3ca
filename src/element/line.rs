use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::common::{self, clamp_stroke_width};
use crate::gradient::{self, GradientConfig, LinearGradient, StopColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// Straight stroke painted with a gradient along its length.
///
/// Endpoints are offsets from the owning object's position, so the object's
/// position is always the midpoint once the line has been recentred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientLine {
    start: Vec2,
    end: Vec2,
    width: f32,
    cap: LineCap,
    config: GradientConfig,
    stroke: LinearGradient,
}

impl GradientLine {
    /// Build a line from canvas endpoints; returns it with its centre
    pub fn from_points(a: Pos2, b: Pos2, width: f32, config: GradientConfig) -> (Pos2, Self) {
        let config = config.sanitized();
        let center = a + (b - a) / 2.0;
        let start = a - center;
        let end = b - center;
        let line = Self {
            start,
            end,
            width: clamp_stroke_width(width),
            cap: LineCap::Round,
            config,
            stroke: gradient::build_line_gradient(start.to_pos2(), end.to_pos2(), &config),
        };
        (center, line)
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn cap(&self) -> LineCap {
        self.cap
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    /// Gradient in the line's local space
    pub fn stroke(&self) -> &LinearGradient {
        &self.stroke
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    pub(crate) fn set_offsets(&mut self, start: Vec2, end: Vec2) {
        self.start = start;
        self.end = end;
        self.refresh_stroke();
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = clamp_stroke_width(width);
    }

    pub fn set_cap(&mut self, cap: LineCap) {
        self.cap = cap;
    }

    pub fn set_config(&mut self, config: GradientConfig) {
        self.config = config.sanitized();
        self.refresh_stroke();
    }

    fn refresh_stroke(&mut self) {
        self.stroke = gradient::build_line_gradient(self.start.to_pos2(), self.end.to_pos2(), &self.config);
    }

    /// Bounds of the stroke around the object's origin
    pub fn local_rect(&self) -> Rect {
        common::calculate_bounds(&[self.start.to_pos2(), self.end.to_pos2()], self.width / 2.0)
    }

    /// Whether a local point falls inside the painted stroke
    pub fn covers(&self, local: Vec2) -> bool {
        let (a, b, p) = (self.start.to_pos2(), self.end.to_pos2(), local.to_pos2());
        let half = self.width / 2.0;
        match self.cap {
            LineCap::Round => common::distance_to_line_segment(p, a, b) <= half,
            LineCap::Butt | LineCap::Square => {
                let length = self.length();
                if length == 0.0 {
                    return self.cap == LineCap::Square && (p - a).abs().max_elem() <= half;
                }
                let (t, perpendicular) = common::project_onto_segment(p, a, b);
                let overhang = if self.cap == LineCap::Square { half / length } else { 0.0 };
                perpendicular <= half && t >= -overhang && t <= 1.0 + overhang
            }
        }
    }

    /// Stroke colour at a local point
    pub fn color_at(&self, local: Vec2) -> StopColor {
        let origin = gradient::line_local_origin(self.start.to_pos2(), self.end.to_pos2());
        self.stroke.sample(local.to_pos2() - origin.to_vec2())
    }
}
