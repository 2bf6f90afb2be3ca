use std::cell::Cell;
use std::rc::Rc;

use egui::{Color32, pos2};
use futures::FutureExt;
use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use image::RgbaImage;
use scene_editor::{
    AssetId, AssetStore, Background, EditorConfig, EditorError, ExportFormat, Fill, GradientConfig, InteractionMode,
    LayerOrder, ObjectKind, RasterSurface, RenderError, RenderSurface, Scene, Session, ShapeKind, Snapshot, TextAlign,
    TextStyle,
};

mod common;

fn session(width: u32, height: u32) -> Session {
    common::init_logger();
    Session::headless(common::small_config(width, height)).unwrap()
}

/// Raster surface whose scene loads can be made to fail or to stall
#[derive(Default)]
struct FlakySurface {
    inner: RasterSurface,
    fail_loads: Rc<Cell<bool>>,
    stall_loads: Rc<Cell<bool>>,
    repaints: Rc<Cell<u32>>,
}

impl RenderSurface for FlakySurface {
    fn request_repaint(&mut self) {
        self.repaints.set(self.repaints.get() + 1);
    }

    fn load_scene<'a>(&'a mut self, scene: &'a Scene, assets: &'a AssetStore) -> LocalBoxFuture<'a, Result<(), RenderError>> {
        if self.fail_loads.get() {
            return async { Err(RenderError::MissingAsset(AssetId::new())) }.boxed_local();
        }
        if self.stall_loads.get() {
            return async {
                futures::pending!();
                Ok(())
            }
            .boxed_local();
        }
        self.inner.load_scene(scene, assets)
    }

    fn render(&mut self, scene: &Scene, assets: &AssetStore) -> Result<RgbaImage, RenderError> {
        self.inner.render(scene, assets)
    }

    fn interaction_mode(&self) -> InteractionMode {
        self.inner.interaction_mode()
    }

    fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.inner.set_interaction_mode(mode);
    }
}

#[test]
fn test_new_session_has_nothing_to_undo() {
    let mut session = session(400, 200);
    assert!(!session.can_undo());
    assert!(!session.can_redo());
    assert!(!block_on(session.undo()).unwrap());
    assert!(!block_on(session.redo()).unwrap());
}

#[test]
fn test_default_session_matches_config() {
    common::init_logger();
    let session = Session::headless(EditorConfig::default()).unwrap();
    assert_eq!((session.scene().width(), session.scene().height()), (4000, 2000));
    assert_eq!(session.scene().background(), &Background::Solid(Color32::WHITE));
    assert!(session.scene().is_empty());
}

#[test]
fn test_invalid_resize_is_rejected() {
    let mut session = session(400, 200);

    let err = session.resize_canvas(0, 500).unwrap_err();
    assert!(matches!(err, EditorError::InvalidDimension { width: 0, height: 500 }));
    assert_eq!((session.scene().width(), session.scene().height()), (400, 200));
    assert!(!session.can_undo());

    session.apply_preset("Square").unwrap();
    assert_eq!((session.scene().width(), session.scene().height()), (1080, 1080));
    assert!(session.can_undo());
    assert!(matches!(session.apply_preset("Poster"), Err(EditorError::UnknownPreset(_))));
}

#[test]
fn test_each_committed_change_is_one_history_entry() {
    let mut session = session(400, 200);
    let text = session.add_text("Hello", TextStyle::default()).unwrap();
    assert_eq!(session.selection(), Some(text));
    session.set_background(Background::Gradient(GradientConfig::default())).unwrap();
    session.add_shape(ShapeKind::Ellipse, 50.0, 30.0, Fill::Solid(Color32::BLUE)).unwrap();

    assert_eq!(session.history().past_len(), 4);

    // Selecting is not an edit
    session.select(Some(text)).unwrap();
    assert_eq!(session.history().past_len(), 4);
}

#[test]
fn test_undo_then_redo_restores_identical_scene() {
    let mut session = session(400, 200);
    session.add_shape(ShapeKind::Rectangle, 100.0, 100.0, Fill::Solid(Color32::RED)).unwrap();
    let second = session.add_text("Title", TextStyle::default()).unwrap();
    let before = Snapshot::capture(session.scene()).unwrap();

    assert!(block_on(session.undo()).unwrap());
    assert_eq!(session.scene().len(), 1);
    assert_eq!(session.selection(), None);
    assert!(session.can_redo());

    assert!(block_on(session.redo()).unwrap());
    assert_eq!(Snapshot::capture(session.scene()).unwrap(), before);
    assert!(session.scene().find(second).is_some());
    assert!(!session.history().is_restoring());

    // The replay itself was not recorded
    assert_eq!(session.history().past_len(), 3);
    assert_eq!(session.history().future_len(), 0);
}

#[test]
fn test_new_edit_after_undo_drops_redo() {
    let mut session = session(400, 200);
    session.add_default_text().unwrap();
    session.add_default_text().unwrap();
    block_on(session.undo()).unwrap();
    assert!(session.can_redo());

    session.add_shape(ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::RED)).unwrap();
    assert!(!session.can_redo());
}

#[test]
fn test_failed_restore_rolls_back() {
    common::init_logger();
    let fail_loads = Rc::new(Cell::new(false));
    let surface = FlakySurface {
        fail_loads: fail_loads.clone(),
        ..FlakySurface::default()
    };
    let mut session = Session::new(common::small_config(400, 200), Box::new(surface)).unwrap();
    let id = session.add_shape(ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::RED)).unwrap();

    fail_loads.set(true);
    let err = block_on(session.undo()).unwrap_err();
    assert!(matches!(err, EditorError::Render(RenderError::MissingAsset(_))));
    assert!(session.scene().find(id).is_some());
    assert!(session.can_undo());
    assert!(!session.can_redo());
    assert!(!session.history().is_restoring());

    fail_loads.set(false);
    assert!(block_on(session.undo()).unwrap());
    assert!(session.scene().is_empty());
}

#[test]
fn test_cancelled_undo_leaves_history_usable() {
    common::init_logger();
    let stall_loads = Rc::new(Cell::new(false));
    let surface = FlakySurface {
        stall_loads: stall_loads.clone(),
        ..FlakySurface::default()
    };
    let mut session = Session::new(common::small_config(400, 200), Box::new(surface)).unwrap();
    let first = session.add_shape(ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::RED)).unwrap();

    // Poll the undo once while the surface is still loading, then give up on it
    stall_loads.set(true);
    assert!(session.undo().now_or_never().is_none());
    assert!(!session.history().is_restoring());
    assert!(session.scene().find(first).is_some());
    assert_eq!((session.history().past_len(), session.history().future_len()), (2, 0));

    stall_loads.set(false);
    session.add_shape(ShapeKind::Ellipse, 10.0, 10.0, Fill::Solid(Color32::BLUE)).unwrap();
    assert_eq!(session.history().past_len(), 3);

    assert!(block_on(session.undo()).unwrap());
    assert_eq!(session.scene().len(), 1);
    assert!(session.scene().find(first).is_some());
}

#[test]
fn test_non_finite_values_keep_history_restorable() {
    let mut session = session(400, 200);
    session.add_shape(ShapeKind::Rectangle, f32::INFINITY, 20.0, Fill::Solid(Color32::RED)).unwrap();
    assert!(session.set_selected_opacity(f32::NAN).unwrap());
    assert_eq!(session.selected_object().unwrap().opacity(), 1.0);
    assert!(session.set_selected_opacity(0.5).unwrap());

    let broken = GradientConfig {
        angle: f32::NAN,
        start_opacity: f32::INFINITY,
        end_opacity: f32::NAN,
        ..GradientConfig::default()
    };
    session.set_background(Background::Gradient(broken)).unwrap();
    session.set_gradient_config(broken).unwrap();
    session.add_gradient_layer().unwrap();
    session.set_text_style(TextStyle { font_size: f32::NAN, ..TextStyle::default() }).unwrap();

    assert_eq!(session.gradient_config().angle, GradientConfig::default().angle);
    assert_eq!(session.gradient_config().start_opacity, 100.0);
    assert_eq!(session.gradient_config().end_opacity, 0.0);

    // Every entry recorded above can be stepped back through
    let entries = session.history().past_len();
    for _ in 1..entries {
        assert!(block_on(session.undo()).unwrap());
    }
    assert!(session.scene().is_empty());
    while session.can_redo() {
        assert!(block_on(session.redo()).unwrap());
    }
    assert_eq!(session.scene().len(), 3);
    let shape = &session.scene().objects()[0];
    assert_eq!(shape.opacity(), 0.5);
    assert_eq!(shape.bounds().width(), 0.0);
}

#[test]
fn test_pointer_events_apply_pending_layout() {
    let mut session = session(400, 200);
    session.set_display_size(200.0, 100.0);
    session.activate_gradient_line_tool().unwrap();

    // No explicit layout() call: the press already maps with scale 0.5
    let id = session.pointer_down(pos2(10.0, 10.0)).unwrap().unwrap();
    session.pointer_up(pos2(60.0, 10.0)).unwrap();
    assert_eq!(session.mapper().scale(), 0.5);
    let (a, b) = session.scene().find(id).unwrap().line_endpoints().unwrap();
    assert!((a - pos2(20.0, 20.0)).length() < 1e-3);
    assert!((b - pos2(120.0, 20.0)).length() < 1e-3);

    // Points that map nowhere are dropped
    assert_eq!(session.pointer_down(pos2(f32::NAN, 10.0)).unwrap(), None);
    assert_eq!(session.scene().len(), 1);
}

#[test]
fn test_mutations_request_repaints() {
    common::init_logger();
    let repaints = Rc::new(Cell::new(0));
    let surface = FlakySurface {
        repaints: repaints.clone(),
        ..FlakySurface::default()
    };
    let mut session = Session::new(common::small_config(400, 200), Box::new(surface)).unwrap();

    let id = session.add_default_text().unwrap();
    assert_eq!(repaints.get(), 1);
    session.select(None).unwrap();
    assert_eq!(repaints.get(), 1);
    session.delete_object(id).unwrap();
    assert_eq!(repaints.get(), 2);
    block_on(session.undo()).unwrap();
    assert_eq!(repaints.get(), 3);
}

#[test]
fn test_export_is_deterministic() {
    let mut session = session(400, 200);
    session.add_shape(ShapeKind::Rectangle, 100.0, 100.0, Fill::Solid(Color32::RED)).unwrap();

    let pixels = session.render().unwrap();
    assert_eq!(pixels.get_pixel(200, 100).0, [255, 0, 0, 255]);
    assert_eq!(pixels.get_pixel(10, 10).0, [255, 255, 255, 255]);

    let first = session.export_raster(ExportFormat::Jpeg, 1.0).unwrap();
    let second = session.export_raster(ExportFormat::Jpeg, 1.0).unwrap();
    assert_eq!(first, second);
    assert_eq!(&first[..2], &[0xff, 0xd8]);

    let decoded = image::load_from_memory(&first).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 200));

    // The configured default is full-quality JPEG
    assert_eq!(session.export_default().unwrap(), first);

    let png = session.export_raster(ExportFormat::Png, 1.0).unwrap();
    assert_eq!(image::load_from_memory(&png).unwrap().to_rgba8(), pixels);
}

#[test]
fn test_image_insertion_fits_the_canvas() {
    let mut session = session(400, 200);
    let id = block_on(session.add_image(common::png_bytes(40, 40, [0, 128, 0, 255]))).unwrap();

    let object = session.scene().find(id).unwrap();
    // min(400 * 0.7 / 40, 200 * 0.7 / 40)
    assert!((object.scale().x - 3.5).abs() < 1e-5);
    assert_eq!(object.position(), pos2(200.0, 100.0));
    assert_eq!(session.selection(), Some(id));

    let preview = session.image_preview().unwrap();
    assert_eq!((preview.width, preview.height), (40, 40));
    assert!(session.assets().contains(preview.asset));
    assert_eq!(session.render().unwrap().get_pixel(200, 100).0, [0, 128, 0, 255]);
}

#[test]
fn test_undecodable_image_adds_nothing() {
    let mut session = session(400, 200);
    block_on(session.add_image(common::png_bytes(4, 4, [0, 0, 0, 255]))).unwrap();
    let entries = session.history().past_len();

    let err = block_on(session.add_image(b"definitely not an image".to_vec())).unwrap_err();
    assert!(matches!(err, EditorError::AssetDecodeFailure(_)));
    assert_eq!(session.scene().len(), 1);
    assert_eq!(session.history().past_len(), entries);
    assert!(session.image_preview().is_none());
}

#[test]
fn test_text_style_creates_text_when_needed() {
    let mut session = session(400, 200);
    let style = TextStyle {
        font_family: "roboto".to_owned(),
        font_size: 32.0,
        color: Color32::RED,
        align: TextAlign::Center,
    };

    let id = session.set_text_style(style.clone()).unwrap();
    let text = session.scene().find(id).unwrap().as_text().unwrap();
    assert_eq!(text.content, "Your Text Here");
    assert_eq!(text.style, style);
    assert_eq!(session.history().past_len(), 2);

    // Styling the selected text again does not create another object
    session.set_text_style(TextStyle::default()).unwrap();
    assert_eq!(session.scene().len(), 1);

    assert!(session.set_text_content("Launch day").unwrap());
    assert_eq!(session.scene().find(id).unwrap().as_text().unwrap().content, "Launch day");

    session.select(None).unwrap();
    assert!(!session.set_text_content("ignored").unwrap());
}

#[test]
fn test_layer_actions_on_selection() {
    let mut session = session(400, 200);
    let bottom = session.add_shape(ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::RED)).unwrap();
    let middle = session.add_shape(ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::GREEN)).unwrap();
    let top = session.add_shape(ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::BLUE)).unwrap();

    session.select(Some(bottom)).unwrap();
    assert!(session.reorder_selected(LayerOrder::BringToFront).unwrap());
    assert_eq!(session.scene().paint_order(), vec![middle, top, bottom]);
    assert!(!session.reorder_object(bottom, LayerOrder::BringForward).unwrap());

    assert_eq!(session.delete_selected().unwrap(), Some(bottom));
    assert_eq!(session.selection(), None);
    assert_eq!(session.delete_selected().unwrap(), None);
    assert!(!session.reorder_selected(LayerOrder::SendToBack).unwrap());
}

#[test]
fn test_gradient_layer_and_fills() {
    let mut session = session(400, 200);
    let layer = session.add_gradient_layer().unwrap();
    let object = session.scene().find(layer).unwrap();
    assert_eq!(object.bounds().size(), egui::vec2(400.0, 200.0));
    assert!(matches!(object.kind(), ObjectKind::Shape(shape) if matches!(shape.fill, Fill::Gradient(_))));

    assert!(session.apply_fill_to_selected(Fill::Solid(Color32::BLACK)).unwrap());
    assert!(session.set_selected_opacity(0.25).unwrap());
    assert_eq!(session.selected_object().unwrap().opacity(), 0.25);

    let text = session.add_default_text().unwrap();
    assert!(!session.apply_gradient_to_selected(&GradientConfig::default()).unwrap());
    assert_eq!(session.selection(), Some(text));
}

#[test]
fn test_drawing_a_line_through_the_session() {
    let mut session = session(400, 200);
    session.set_display_size(200.0, 100.0);
    assert_eq!(session.layout(), 0.5);

    session.activate_gradient_line_tool().unwrap();
    assert!(!session.surface().interaction_mode().selection_enabled);

    let id = session.pointer_down(pos2(10.0, 10.0)).unwrap().unwrap();
    assert_eq!(session.history().past_len(), 1);
    session.pointer_move(pos2(50.0, 10.0)).unwrap();
    session.pointer_move(pos2(55.0, 12.0)).unwrap();
    assert_eq!(session.history().past_len(), 1);

    assert_eq!(session.pointer_up(pos2(60.0, 10.0)).unwrap(), Some(id));
    assert_eq!(session.history().past_len(), 2);

    let (a, b) = session.scene().find(id).unwrap().line_endpoints().unwrap();
    assert!((a - pos2(20.0, 20.0)).length() < 1e-3);
    assert!((b - pos2(120.0, 20.0)).length() < 1e-3);

    // The canvas does not select while the tool owns the pointer
    session.select(None).unwrap();
    assert_eq!(session.select_at(pos2(30.0, 10.0)).unwrap(), None);

    session.deactivate_gradient_line_tool().unwrap();
    assert!(session.surface().interaction_mode().selection_enabled);
    assert_eq!(session.pointer_down(pos2(30.0, 10.0)).unwrap(), Some(id));

    block_on(session.undo()).unwrap();
    assert!(session.scene().is_empty());
}

#[test]
fn test_line_settings_follow_the_session() {
    let mut session = session(400, 200);
    session.set_display_size(400.0, 200.0);
    session.layout();
    session.activate_gradient_line_tool().unwrap();
    let id = session.pointer_down(pos2(10.0, 10.0)).unwrap().unwrap();

    session.set_gradient_line_width(30.0).unwrap();
    let config = GradientConfig { angle: 10.0, ..GradientConfig::default() };
    session.set_gradient_line_config(config).unwrap();
    let line = session.scene().find(id).unwrap().as_line().unwrap();
    assert_eq!(line.width(), 30.0);
    assert_eq!(line.config(), &config);

    session.set_background(Background::Gradient(GradientConfig::default())).unwrap();
    session.set_gradient_config(config).unwrap();
    assert_eq!(session.scene().background(), &Background::Gradient(config));
    assert_eq!(session.gradient_config(), &config);
}

#[test]
fn test_documents_round_trip_with_images() {
    let path = common::temp_path("doc.json");
    let mut session = session(300, 150);
    block_on(session.add_image(common::png_bytes(6, 3, [10, 20, 30, 255]))).unwrap();
    session.add_text("Caption", TextStyle::default()).unwrap();
    session.save_document(&path).unwrap();

    let mut reopened = Session::headless(EditorConfig::default()).unwrap();
    block_on(reopened.open_document(&path)).unwrap();
    assert_eq!(reopened.scene(), session.scene());
    assert!(!reopened.can_undo());
    assert_eq!(reopened.assets().len(), 1);

    // New ids never collide with the loaded ones
    let fresh = reopened.add_default_text().unwrap();
    assert!(session.scene().find(fresh).is_none());

    let _ = std::fs::remove_dir_all(scene_editor::persistence::assets_dir(&path));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_attaching_a_surface_resets_history() {
    let mut session = session(400, 200);
    session.add_default_text().unwrap();
    assert!(session.can_undo());

    block_on(session.attach_surface(Box::new(RasterSurface::new()))).unwrap();
    assert!(!session.can_undo());
    assert_eq!(session.history().past_len(), 1);
    assert_eq!(session.scene().len(), 1);
}
