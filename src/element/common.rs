use egui::{Pos2, Rect, Vec2};

// Common constants for all element types
pub const MIN_STROKE_WIDTH: f32 = 1.0;
/// Average advance of a glyph, in font-size units
pub const TEXT_CHAR_WIDTH_EM: f32 = 0.6;
/// Line height, in font-size units
pub const TEXT_LINE_HEIGHT_EM: f32 = 1.16;

/// Stroke width floored at [`MIN_STROKE_WIDTH`]; non-finite widths get the minimum
pub fn clamp_stroke_width(width: f32) -> f32 {
    if width.is_finite() { width.max(MIN_STROKE_WIDTH) } else { MIN_STROKE_WIDTH }
}

/// Calculate distance from a point to a line segment (used for stroke hit testing)
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Position of `point` along the segment, 0 at `line_start` and 1 at `line_end`,
/// together with its perpendicular distance from the infinite line
pub(crate) fn project_onto_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> (f32, f32) {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;
    let len_sq = line_vec.length_sq();
    if len_sq == 0.0 {
        return (0.0, point_vec.length());
    }
    let t = point_vec.dot(line_vec) / len_sq;
    let perpendicular = (point_vec - line_vec * t).length();
    (t, perpendicular)
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Rectangle of `size` centred on the local origin
pub(crate) fn centered_rect(size: Vec2) -> Rect {
    Rect::from_center_size(Pos2::ZERO, size)
}
