//! Gradient fill computation.
//!
//! Everything here is pure: configs go in by value, gradient definitions come
//! out. Area gradients live in the coordinate space of the rectangle they
//! fill (origin at its top-left corner); line gradients live in the local
//! space of the line, whose origin is the top-left corner of the endpoints'
//! bounding box.

use std::fmt;
use std::str::FromStr;

use egui::{Color32, Pos2, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Lines shorter than this get their gradient stretched to this length
pub const MIN_LINE_EXTENT: f32 = 1.0;

/// An opaque sRGB colour written as `#rgb` or `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor::rgb(0xff, 0xff, 0xff);
    pub const BLACK: HexColor = HexColor::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgb(self.r, self.g, self.b)
    }

    /// Combine with an opacity percentage (clamped to 0..=100)
    pub fn with_opacity(self, opacity_percent: f32) -> StopColor {
        StopColor::from_hex(self, opacity_percent)
    }
}

impl FromStr for HexColor {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EditorError::InvalidColor(s.to_string());
        let digits = s.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            3 => Ok(Self::rgb(
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            )),
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = EditorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colour of a gradient stop, alpha kept as a fraction so it survives
/// serialization exactly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl StopColor {
    pub fn from_hex(hex: HexColor, opacity_percent: f32) -> Self {
        let opacity = if opacity_percent.is_nan() { 0.0 } else { opacity_percent };
        Self {
            r: hex.r,
            g: hex.g,
            b: hex.b,
            alpha: opacity.clamp(0.0, 100.0) / 100.0,
        }
    }

    pub fn to_color32(self) -> Color32 {
        let a = (self.alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, a)
    }

    pub(crate) fn lerp(self, other: StopColor, t: f32) -> StopColor {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        StopColor {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            alpha: self.alpha + (other.alpha - self.alpha) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: StopColor,
}

/// A linear gradient between two points with stops sorted by offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub start: Pos2,
    pub end: Pos2,
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn two_stop(start: Pos2, end: Pos2, from: StopColor, to: StopColor) -> Self {
        Self {
            start,
            end,
            stops: vec![
                ColorStop { offset: 0.0, color: from },
                ColorStop { offset: 1.0, color: to },
            ],
        }
    }

    /// Colour at `point`, projected onto the gradient axis and clamped
    pub fn sample(&self, point: Pos2) -> StopColor {
        let axis = self.end - self.start;
        let length_sq = axis.length_sq();
        let t = if length_sq <= f32::EPSILON {
            0.0
        } else {
            ((point - self.start).dot(axis) / length_sq).clamp(0.0, 1.0)
        };
        self.color_at_offset(t)
    }

    pub fn color_at_offset(&self, t: f32) -> StopColor {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return StopColor { r: 0, g: 0, b: 0, alpha: 0.0 };
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.offset {
                let span = hi.offset - lo.offset;
                let local = if span <= f32::EPSILON { 1.0 } else { (t - lo.offset) / span };
                return lo.color.lerp(hi.color, local);
            }
        }
        last.color
    }
}

/// Gradient parameters as edited in the properties panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Direction in degrees, 0 pointing along +x, growing clockwise (y down)
    pub angle: f32,
    pub start_color: HexColor,
    pub start_opacity: f32,
    pub end_color: HexColor,
    pub end_opacity: f32,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            angle: 135.0,
            start_color: HexColor::rgb(0x4f, 0x46, 0xe5),
            start_opacity: 100.0,
            end_color: HexColor::rgb(0x22, 0xd3, 0xee),
            end_opacity: 100.0,
        }
    }
}

impl GradientConfig {
    pub fn start_stop_color(&self) -> StopColor {
        self.start_color.with_opacity(self.start_opacity)
    }

    pub fn end_stop_color(&self) -> StopColor {
        self.end_color.with_opacity(self.end_opacity)
    }

    /// Copy with every value storable: a non-finite angle falls back to the
    /// default and opacities are clamped to 0..=100, NaN counting as 0
    pub fn sanitized(self) -> Self {
        let opacity = |value: f32| if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) };
        Self {
            angle: if self.angle.is_finite() { self.angle } else { Self::default().angle },
            start_opacity: opacity(self.start_opacity),
            end_opacity: opacity(self.end_opacity),
            ..self
        }
    }
}

/// Gradient covering a `width` x `height` rectangle along `config.angle`.
///
/// The axis passes through the centre and spans the full diagonal, so the
/// first and last stop colours reach the corners whatever the angle.
pub fn build_area_gradient(width: f32, height: f32, config: &GradientConfig) -> LinearGradient {
    let config = config.sanitized();
    let radians = config.angle.to_radians();
    let center = pos2(width / 2.0, height / 2.0);
    let half_diagonal = (width * width + height * height).sqrt() / 2.0;
    let offset = vec2(radians.cos(), radians.sin()) * half_diagonal;

    LinearGradient::two_stop(
        center - offset,
        center + offset,
        config.start_stop_color(),
        config.end_stop_color(),
    )
}

/// Gradient for a stroke from `a` to `b`, in the line's local space.
///
/// The gradient always starts at the endpoint with the smaller x (smaller y
/// on ties), so the result does not depend on the direction the line was
/// drawn in.
pub fn build_line_gradient(a: Pos2, b: Pos2, config: &GradientConfig) -> LinearGradient {
    let origin = line_local_origin(a, b).to_vec2();
    let (earlier, later) = order_endpoints(a, b);

    let start = earlier - origin;
    let mut end = later - origin;
    let span = end - start;
    let length = span.length();
    if length < MIN_LINE_EXTENT {
        let direction: Vec2 = if length > f32::EPSILON { span / length } else { vec2(1.0, 0.0) };
        end = start + direction * MIN_LINE_EXTENT;
    }

    LinearGradient::two_stop(start, end, config.start_stop_color(), config.end_stop_color())
}

/// Top-left corner of the endpoints' bounding box
pub fn line_local_origin(a: Pos2, b: Pos2) -> Pos2 {
    pos2(a.x.min(b.x), a.y.min(b.y))
}

/// Endpoints ordered by x, then y
pub fn order_endpoints(a: Pos2, b: Pos2) -> (Pos2, Pos2) {
    if a.x < b.x || (a.x == b.x && a.y <= b.y) {
        (a, b)
    } else {
        (b, a)
    }
}
