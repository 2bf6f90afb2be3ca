use egui::{Pos2, pos2, vec2};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use image::RgbaImage;
use scene_editor::{
    AssetStore, CoordinateMapper, InteractionMode, RasterSurface, RenderError, RenderSurface, Scene, ViewportTransform,
};

/// Surface with its own display-to-scene mapping
#[derive(Default)]
struct MappingSurface {
    mode: InteractionMode,
}

impl RenderSurface for MappingSurface {
    fn request_repaint(&mut self) {}

    fn load_scene<'a>(&'a mut self, _scene: &'a Scene, _assets: &'a AssetStore) -> LocalBoxFuture<'a, Result<(), RenderError>> {
        async { Ok(()) }.boxed_local()
    }

    fn render(&mut self, scene: &Scene, _assets: &AssetStore) -> Result<RgbaImage, RenderError> {
        Ok(RgbaImage::new(scene.width(), scene.height()))
    }

    fn scene_point(&self, display_point: Pos2, _display_scale: f32) -> Option<Pos2> {
        Some(pos2(display_point.x + 1000.0, display_point.y))
    }

    fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }
}

fn fitted(display_width: f32, display_height: f32) -> CoordinateMapper {
    let mut mapper = CoordinateMapper::new(4000, 2000);
    mapper.set_display_size(display_width, display_height);
    mapper.layout();
    mapper
}

#[test]
fn test_scale_fits_and_never_upscales() {
    assert_eq!(CoordinateMapper::compute_scale(vec2(800.0, 600.0), vec2(4000.0, 2000.0)), Some(0.2));
    assert_eq!(CoordinateMapper::compute_scale(vec2(10000.0, 10000.0), vec2(4000.0, 2000.0)), Some(1.0));

    assert_eq!(fitted(800.0, 600.0).scale(), 0.2);
    assert_eq!(fitted(10000.0, 10000.0).scale(), 1.0);
    assert_eq!(fitted(800.0, 600.0).display_canvas_size(), vec2(800.0, 400.0));
}

#[test]
fn test_empty_display_keeps_last_scale() {
    let mut mapper = fitted(800.0, 600.0);

    mapper.set_display_size(0.0, 600.0);
    assert_eq!(mapper.layout(), 0.2);
    mapper.set_display_size(f32::NAN, 600.0);
    assert_eq!(mapper.layout(), 0.2);
    assert!(mapper.scale().is_finite());
}

#[test]
fn test_changes_are_applied_once_per_layout() {
    let mut mapper = fitted(800.0, 600.0);
    mapper.set_display_size(400.0, 300.0);
    mapper.set_logical_size(1000, 1000);
    assert!(mapper.is_dirty());
    assert_eq!(mapper.scale(), 0.2);

    assert_eq!(mapper.layout(), 0.3);
    assert!(!mapper.is_dirty());

    // Same size again: nothing to recompute
    mapper.set_display_size(400.0, 300.0);
    assert!(!mapper.is_dirty());
}

#[test]
fn test_manual_mapping_undoes_scale_and_viewport() {
    let mapper = fitted(800.0, 600.0);
    let mut surface = RasterSurface::new();

    assert_eq!(mapper.to_logical(pos2(100.0, 50.0), &surface), pos2(500.0, 250.0));

    let viewport = ViewportTransform::new(2.0, vec2(100.0, 0.0));
    surface.set_viewport_transform(viewport);
    let logical = mapper.to_logical(pos2(100.0, 50.0), &surface);
    assert_eq!(logical, pos2(200.0, 125.0));
    assert_eq!(mapper.to_display(logical, viewport), pos2(100.0, 50.0));
}

#[test]
fn test_surface_scene_point_wins() {
    let mapper = fitted(800.0, 600.0);
    assert_eq!(mapper.to_logical(pos2(5.0, 6.0), &MappingSurface::default()), pos2(1005.0, 6.0));
}

#[test]
fn test_degenerate_zoom_falls_back_to_normalized_point() {
    let mapper = fitted(800.0, 600.0);
    let mut surface = RasterSurface::new();
    surface.set_viewport_transform(ViewportTransform::new(0.0, vec2(10.0, 10.0)));
    assert_eq!(mapper.to_logical(pos2(20.0, 20.0), &surface), pos2(100.0, 100.0));
}
