use egui::{Pos2, Rect, Vec2, pos2, vec2};

/// Placement of an object in canvas space.
///
/// Object geometry is described around a local origin at the object's centre;
/// the transform scales, then rotates about that origin, then moves it to
/// `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub position: Pos2,
    /// Rotation in degrees, clockwise on screen (y points down)
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            position: Pos2::ZERO,
            rotation: 0.0,
            scale: vec2(1.0, 1.0),
        }
    }
}

impl ObjectTransform {
    pub fn new(position: Pos2, rotation: f32, scale: Vec2) -> Self {
        Self { position, rotation, scale }
    }

    /// Local-to-canvas matrix (row major, affine)
    pub fn to_matrix(&self) -> [[f32; 3]; 3] {
        let radians = self.rotation.to_radians();
        let cos = radians.cos();
        let sin = radians.sin();

        let scale = [
            [self.scale.x, 0.0, 0.0],
            [0.0, self.scale.y, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let rotate = [
            [cos, -sin, 0.0],
            [sin, cos, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let translate = [
            [1.0, 0.0, self.position.x],
            [0.0, 1.0, self.position.y],
            [0.0, 0.0, 1.0],
        ];

        multiply_matrices(&translate, &multiply_matrices(&rotate, &scale))
    }

    pub fn to_canvas(&self, local: Vec2) -> Pos2 {
        apply(&self.to_matrix(), local.to_pos2())
    }

    /// Map a canvas point back into local space.
    ///
    /// Returns `None` when the transform has collapsed (zero scale).
    pub fn to_local(&self, canvas: Pos2) -> Option<Vec2> {
        let inverse = invert_affine(&self.to_matrix())?;
        Some(apply(&inverse, canvas).to_vec2())
    }

    /// Axis-aligned canvas bounds of a local rectangle
    pub fn canvas_bounds(&self, local: Rect) -> Rect {
        let corners = [
            local.left_top(),
            local.right_top(),
            local.left_bottom(),
            local.right_bottom(),
        ];
        let mut bounds = Rect::NOTHING;
        for corner in corners {
            bounds.extend_with(self.to_canvas(corner.to_vec2()));
        }
        bounds
    }
}

fn apply(m: &[[f32; 3]; 3], p: Pos2) -> Pos2 {
    pos2(
        m[0][0] * p.x + m[0][1] * p.y + m[0][2],
        m[1][0] * p.x + m[1][1] * p.y + m[1][2],
    )
}

fn invert_affine(m: &[[f32; 3]; 3]) -> Option<[[f32; 3]; 3]> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    if det.abs() <= f32::EPSILON || !det.is_finite() {
        return None;
    }
    let inv_det = 1.0 / det;
    let a = m[1][1] * inv_det;
    let b = -m[0][1] * inv_det;
    let c = -m[1][0] * inv_det;
    let d = m[0][0] * inv_det;
    Some([
        [a, b, -(a * m[0][2] + b * m[1][2])],
        [c, d, -(c * m[0][2] + d * m[1][2])],
        [0.0, 0.0, 1.0],
    ])
}

fn multiply_matrices(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}
