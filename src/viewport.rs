//! Mapping between display pixels and logical canvas pixels.
//!
//! The canvas is shown scaled down to fit the space available on screen
//! (never scaled up), optionally under a pan/zoom transform owned by the
//! render surface. Pointer events arrive in display pixels and must be
//! turned into logical canvas coordinates before they touch the scene.

use egui::{Pos2, Vec2, pos2, vec2};
use log::debug;

use crate::renderer::RenderSurface;

/// Pan/zoom of the render surface, mapping canvas pixels to view pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewportTransform {
    pub fn new(zoom: f32, pan: Vec2) -> Self {
        Self { zoom, pan }
    }

    /// Convert a canvas point to view space
    pub fn project(&self, canvas: Pos2) -> Pos2 {
        pos2(canvas.x * self.zoom + self.pan.x, canvas.y * self.zoom + self.pan.y)
    }

    /// Convert a view point back to canvas space.
    /// Returns `None` if the zoom cannot be inverted.
    pub fn unproject(&self, view: Pos2) -> Option<Pos2> {
        if !self.zoom.is_finite() || self.zoom.abs() <= f32::EPSILON {
            return None;
        }
        Some(pos2((view.x - self.pan.x) / self.zoom, (view.y - self.pan.y) / self.zoom))
    }
}

/// Keeps the display scale of the canvas in step with the display rectangle
/// and the logical canvas size.
///
/// Size changes only mark the mapper dirty; the scale is recomputed once in
/// [`CoordinateMapper::layout`], however many changes happened since.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    logical: Vec2,
    display: Vec2,
    scale: f32,
    dirty: bool,
}

impl CoordinateMapper {
    pub fn new(logical_width: u32, logical_height: u32) -> Self {
        Self {
            logical: vec2(logical_width as f32, logical_height as f32),
            display: Vec2::ZERO,
            scale: 1.0,
            dirty: false,
        }
    }

    /// Fit scale of a logical canvas inside a display rectangle, capped at 1.
    ///
    /// `None` for empty or non-finite sizes.
    pub fn compute_scale(display: Vec2, logical: Vec2) -> Option<f32> {
        let positive = |v: Vec2| v.x > 0.0 && v.y > 0.0 && v.x.is_finite() && v.y.is_finite();
        if !positive(display) || !positive(logical) {
            return None;
        }
        let scale = (display.x / logical.x).min(display.y / logical.y).min(1.0);
        (scale.is_finite() && scale > 0.0).then_some(scale)
    }

    pub fn set_display_size(&mut self, width: f32, height: f32) {
        let display = vec2(width, height);
        if display != self.display {
            self.display = display;
            self.dirty = true;
        }
    }

    pub fn set_logical_size(&mut self, width: u32, height: u32) {
        let logical = vec2(width as f32, height as f32);
        if logical != self.logical {
            self.logical = logical;
            self.dirty = true;
        }
    }

    /// Recompute the scale if anything changed since the last layout pass.
    ///
    /// An empty display rectangle keeps the last valid scale.
    pub fn layout(&mut self) -> f32 {
        if self.dirty {
            self.dirty = false;
            match Self::compute_scale(self.display, self.logical) {
                Some(scale) => self.scale = scale,
                None => debug!(
                    "Keeping display scale {} for display {:?} / canvas {:?}",
                    self.scale, self.display, self.logical
                ),
            }
        }
        self.scale
    }

    /// Scale from the last layout pass
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn logical_size(&self) -> Vec2 {
        self.logical
    }

    /// On-screen size of the canvas, at least one pixel per side
    pub fn display_canvas_size(&self) -> Vec2 {
        vec2(
            (self.logical.x * self.scale).round().max(1.0),
            (self.logical.y * self.scale).round().max(1.0),
        )
    }

    /// Map a pointer position (display pixels, relative to the canvas
    /// element) to logical canvas space.
    ///
    /// The surface's own scene-point mapping wins when it has one; otherwise
    /// the display scale is undone and then the surface's viewport transform.
    pub fn to_logical(&self, display_point: Pos2, surface: &dyn RenderSurface) -> Pos2 {
        if let Some(point) = surface.scene_point(display_point, self.scale) {
            return point;
        }
        let normalized = pos2(display_point.x / self.scale, display_point.y / self.scale);
        surface.viewport_transform().unproject(normalized).unwrap_or(normalized)
    }

    /// Inverse of [`CoordinateMapper::to_logical`] for the manual path
    pub fn to_display(&self, logical: Pos2, viewport: ViewportTransform) -> Pos2 {
        let view = viewport.project(logical);
        pos2(view.x * self.scale, view.y * self.scale)
    }
}
