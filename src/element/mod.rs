use egui::{Pos2, Rect, Vec2, vec2};
use serde::{Deserialize, Serialize};

// Re-export concrete implementations
pub(crate) mod common;
mod image;
mod line;
mod shape;
mod text;

pub use common::{MIN_STROKE_WIDTH, clamp_stroke_width};
pub use image::ImageObject;
pub use line::{GradientLine, LineCap};
pub use shape::{Fill, ShapeKind, ShapeObject};
pub use text::{TextAlign, TextObject, TextStyle};

use crate::geometry::ObjectTransform;
use crate::gradient::{self, GradientConfig};
use crate::id_generator::{self, ObjectId};

/// Variant-specific payload of a scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Text(TextObject),
    Image(ImageObject),
    Shape(ShapeObject),
    GradientLine(GradientLine),
}

/// An entry of the scene's paint order.
///
/// The envelope (position, rotation, scale, opacity) is shared by every
/// variant; `position` is the object's centre in logical canvas space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    id: ObjectId,
    position: Pos2,
    rotation: f32,
    scale: Vec2,
    opacity: f32,
    kind: ObjectKind,
}

impl SceneObject {
    /// Create an object with a freshly generated id
    pub fn new(position: Pos2, kind: ObjectKind) -> Self {
        Self {
            id: id_generator::generate_id(),
            position,
            rotation: 0.0,
            scale: vec2(1.0, 1.0),
            opacity: 1.0,
            kind,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the element type as a string
    pub fn element_type(&self) -> &'static str {
        match self.kind {
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
            ObjectKind::Shape(_) => "shape",
            ObjectKind::GradientLine(_) => "gradient_line",
        }
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    // Snapshots are JSON, which has no NaN or infinity, so the setters
    // below leave the envelope untouched when handed such values.

    pub fn set_position(&mut self, position: Pos2) {
        if position.is_finite() {
            self.position = position;
        }
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.rotation = degrees.rem_euclid(360.0);
        }
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        if scale.is_finite() {
            self.scale = scale;
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn transform(&self) -> ObjectTransform {
        ObjectTransform::new(self.position, self.rotation, self.scale)
    }

    /// Untransformed geometry around the object's centre
    pub fn local_rect(&self) -> Rect {
        match &self.kind {
            ObjectKind::Text(text) => common::centered_rect(text.estimated_size()),
            ObjectKind::Image(image) => common::centered_rect(image.size()),
            ObjectKind::Shape(shape) => common::centered_rect(shape.size()),
            ObjectKind::GradientLine(line) => line.local_rect(),
        }
    }

    /// Axis-aligned bounds in canvas space
    pub fn bounds(&self) -> Rect {
        self.transform().canvas_bounds(self.local_rect())
    }

    /// Test if the object covers the given canvas position
    pub fn contains(&self, pos: Pos2) -> bool {
        let Some(local) = self.transform().to_local(pos) else {
            return false;
        };
        match &self.kind {
            ObjectKind::Text(_) | ObjectKind::Image(_) => self.local_rect().contains(local.to_pos2()),
            ObjectKind::Shape(shape) => shape.contains_local(local),
            ObjectKind::GradientLine(line) => line.covers(local),
        }
    }

    /// Paint the object with a solid or gradient fill.
    ///
    /// Returns false for variants a fill does not apply to.
    pub fn apply_fill(&mut self, fill: Fill) -> bool {
        match (&mut self.kind, fill) {
            (ObjectKind::Shape(shape), fill) => {
                shape.fill = fill;
                true
            }
            (ObjectKind::Text(text), Fill::Solid(color)) => {
                text.style.color = color;
                true
            }
            _ => false,
        }
    }

    /// Apply a gradient config: shapes get an area gradient sized to their
    /// box, lines get a stroke gradient along their length
    pub fn apply_gradient(&mut self, config: &GradientConfig) -> bool {
        match &mut self.kind {
            ObjectKind::Shape(shape) => {
                shape.fill = Fill::Gradient(gradient::build_area_gradient(shape.width, shape.height, config));
                true
            }
            ObjectKind::GradientLine(line) => {
                line.set_config(*config);
                true
            }
            ObjectKind::Text(_) | ObjectKind::Image(_) => false,
        }
    }

    /// Canvas-space endpoints of a line object
    pub fn line_endpoints(&self) -> Option<(Pos2, Pos2)> {
        let ObjectKind::GradientLine(line) = &self.kind else {
            return None;
        };
        let transform = self.transform();
        Some((transform.to_canvas(line.start()), transform.to_canvas(line.end())))
    }

    /// Move the endpoints of a line object and recentre it on their midpoint.
    ///
    /// The stroke gradient is rebuilt so it follows the new direction.
    pub fn set_line_endpoints(&mut self, a: Pos2, b: Pos2) -> bool {
        if !(a.is_finite() && b.is_finite()) {
            return false;
        }
        let transform = self.transform();
        let ObjectKind::GradientLine(line) = &mut self.kind else {
            return false;
        };
        let center = a + (b - a) / 2.0;
        let recentred = ObjectTransform { position: center, ..transform };
        match (recentred.to_local(a), recentred.to_local(b)) {
            (Some(start), Some(end)) => {
                line.set_offsets(start, end);
                self.position = center;
                true
            }
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match &self.kind {
            ObjectKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextObject> {
        match &mut self.kind {
            ObjectKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&GradientLine> {
        match &self.kind {
            ObjectKind::GradientLine(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut GradientLine> {
        match &mut self.kind {
            ObjectKind::GradientLine(line) => Some(line),
            _ => None,
        }
    }
}

/// Factory functions for creating elements
pub mod factory {
    use super::*;
    use crate::assets::AssetId;

    pub fn create_text(position: Pos2, content: impl Into<String>, style: TextStyle) -> SceneObject {
        SceneObject::new(position, ObjectKind::Text(TextObject::new(content, style)))
    }

    /// Image centred on `position`, uniformly scaled by `scale`
    pub fn create_image(position: Pos2, asset: AssetId, width: u32, height: u32, scale: f32) -> SceneObject {
        let mut object = SceneObject::new(position, ObjectKind::Image(ImageObject::new(asset, width, height)));
        object.set_scale(vec2(scale, scale));
        object
    }

    pub fn create_shape(position: Pos2, kind: ShapeKind, width: f32, height: f32, fill: Fill) -> SceneObject {
        SceneObject::new(position, ObjectKind::Shape(ShapeObject::new(kind, width, height, fill)))
    }

    pub fn create_gradient_line(a: Pos2, b: Pos2, width: f32, config: GradientConfig) -> SceneObject {
        let (center, line) = GradientLine::from_points(a, b, width, config);
        SceneObject::new(center, ObjectKind::GradientLine(line))
    }
}
