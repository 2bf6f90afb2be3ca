//! The editing session: the one object panels and toolbars talk to.
//!
//! Every operation mutates the scene store, then [`Session::flush`] turns the
//! store's events into a repaint request and, for committed changes, a
//! history entry.

use std::path::Path;

use egui::Pos2;
use image::RgbaImage;
use log::{debug, error, info, warn};

use crate::assets::{self, AssetId, AssetStore};
use crate::config::EditorConfig;
use crate::element::{Fill, SceneObject, ShapeKind, TextStyle, factory};
use crate::error::{EditorError, EditorResult};
use crate::event::{EventHandler, SceneEvent};
use crate::gradient::{self, GradientConfig};
use crate::history::{History, RestoreTicket};
use crate::id_generator::ObjectId;
use crate::persistence;
use crate::renderer::{ExportFormat, RasterSurface, RenderSurface, encode_raster};
use crate::scene::{Background, Scene};
use crate::scene_store::{LayerOrder, SceneStore};
use crate::tools::GradientLineTool;
use crate::viewport::CoordinateMapper;

/// The last image decoded for insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePreview {
    pub asset: AssetId,
    pub width: u32,
    pub height: u32,
}

pub struct Session {
    config: EditorConfig,
    store: SceneStore,
    history: History,
    mapper: CoordinateMapper,
    line_tool: GradientLineTool,
    gradient: GradientConfig,
    surface: Box<dyn RenderSurface>,
    assets: AssetStore,
    image_preview: Option<ImagePreview>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("history", &format!("<{} past, {} future>", self.history.past_len(), self.history.future_len()))
            .field("line_tool", &self.line_tool.current_state_name())
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session on a fresh scene built from `config`
    pub fn new(config: EditorConfig, surface: Box<dyn RenderSurface>) -> EditorResult<Self> {
        let scene = config.initial_scene()?;
        Self::with_scene(config, scene, surface)
    }

    /// Start a session on an existing scene
    pub fn with_scene(config: EditorConfig, scene: Scene, surface: Box<dyn RenderSurface>) -> EditorResult<Self> {
        scene.validate()?;
        let mut history = History::new();
        history.initialize_from(&scene)?;
        let mapper = CoordinateMapper::new(scene.width(), scene.height());
        let line_tool = GradientLineTool::new(config.gradient, config.gradient_line_width);

        info!("Session started on a {}x{} canvas", scene.width(), scene.height());
        Ok(Self {
            gradient: config.gradient.sanitized(),
            config,
            store: SceneStore::new(scene),
            history,
            mapper,
            line_tool,
            surface,
            assets: AssetStore::new(),
            image_preview: None,
        })
    }

    /// Session drawing to the built-in software rasterizer
    pub fn headless(config: EditorConfig) -> EditorResult<Self> {
        Self::new(config, Box::new(RasterSurface::new()))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        self.store.scene()
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn gradient_line_tool(&self) -> &GradientLineTool {
        &self.line_tool
    }

    /// Gradient used for gradient layers and gradient backgrounds
    pub fn gradient_config(&self) -> &GradientConfig {
        &self.gradient
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.store.subscribe(handler);
    }

    /// Turn pending store events into a repaint and a history entry
    fn flush(&mut self) -> EditorResult<()> {
        let events = self.store.take_events();
        if events.is_empty() {
            return Ok(());
        }
        let scene = self.store.scene();
        self.mapper.set_logical_size(scene.width(), scene.height());

        if events.iter().any(SceneEvent::needs_repaint) {
            self.surface.request_repaint();
        }
        if events.iter().any(SceneEvent::records_history) {
            match self.history.record_scene(self.store.scene()) {
                Ok(appended) => debug!("History record appended: {}", appended),
                // Replayed scenes must not re-enter the history
                Err(EditorError::RestoreInFlight) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn add(&mut self, object: SceneObject) -> EditorResult<ObjectId> {
        let kind = object.element_type();
        let id = self.store.add_object(object)?;
        self.flush()?;
        info!("Added {} object {}", kind, id);
        Ok(id)
    }

    pub fn add_text(&mut self, content: impl Into<String>, style: TextStyle) -> EditorResult<ObjectId> {
        let center = self.store.scene().center();
        self.add(factory::create_text(center, content, style))
    }

    /// Text with the configured default content and style
    pub fn add_default_text(&mut self) -> EditorResult<ObjectId> {
        let content = self.config.text.content.clone();
        let style = self.config.text.style();
        self.add_text(content, style)
    }

    /// Decode an image file and add it scaled to fit the canvas.
    ///
    /// Nothing is added and the preview is cleared if decoding fails.
    pub async fn add_image(&mut self, bytes: Vec<u8>) -> EditorResult<ObjectId> {
        match assets::decode_image(bytes).await {
            Ok(decoded) => self.add_decoded_image(decoded),
            Err(err) => {
                error!("Image insertion failed: {}", err);
                self.image_preview = None;
                Err(err)
            }
        }
    }

    /// Add already decoded pixels, centred and scaled to
    /// `image_fit_ratio` of the canvas
    pub fn add_decoded_image(&mut self, decoded: RgbaImage) -> EditorResult<ObjectId> {
        let (width, height) = decoded.dimensions();
        let scene = self.store.scene();
        let ratio = self.config.image_fit_ratio;
        let scale = (scene.width() as f32 * ratio / width.max(1) as f32)
            .min(scene.height() as f32 * ratio / height.max(1) as f32);
        let center = scene.center();

        let asset = self.assets.insert(decoded);
        let id = self.add(factory::create_image(center, asset, width, height, scale))?;
        self.image_preview = Some(ImagePreview { asset, width, height });
        Ok(id)
    }

    pub fn image_preview(&self) -> Option<ImagePreview> {
        self.image_preview
    }

    /// Shape centred on the canvas
    pub fn add_shape(&mut self, kind: ShapeKind, width: f32, height: f32, fill: Fill) -> EditorResult<ObjectId> {
        let center = self.store.scene().center();
        self.add(factory::create_shape(center, kind, width, height, fill))
    }

    /// Full-canvas rectangle painted with the current gradient
    pub fn add_gradient_layer(&mut self) -> EditorResult<ObjectId> {
        let scene = self.store.scene();
        let (width, height) = (scene.width() as f32, scene.height() as f32);
        let fill = Fill::Gradient(gradient::build_area_gradient(width, height, &self.gradient));
        self.add_shape(ShapeKind::Rectangle, width, height, fill)
    }

    pub fn set_background(&mut self, background: Background) -> EditorResult<()> {
        self.store.set_background(background);
        self.flush()
    }

    /// Change the current gradient. It follows into the line tool, and into
    /// the background when that is a gradient.
    pub fn set_gradient_config(&mut self, config: GradientConfig) -> EditorResult<()> {
        let config = config.sanitized();
        self.gradient = config;
        self.line_tool.set_config(config, &mut self.store)?;
        if matches!(self.store.scene().background(), Background::Gradient(_)) {
            self.store.set_background(Background::Gradient(config));
        }
        self.flush()
    }

    /// Style the selected text, creating a default text object first when
    /// the selection is not text
    pub fn set_text_style(&mut self, style: TextStyle) -> EditorResult<ObjectId> {
        let id = match self.store.selected_object() {
            Some(object) if object.as_text().is_some() => object.id(),
            _ => {
                let center = self.store.scene().center();
                let object = factory::create_text(center, self.config.text.content.clone(), self.config.text.style());
                self.store.add_object(object)?
            }
        };
        self.store.modify_object(id, |object| {
            if let Some(text) = object.as_text_mut() {
                text.style = style.sanitized();
            }
        })?;
        self.flush()?;
        Ok(id)
    }

    /// Replace the content of the selected text. Returns false if the
    /// selection is not text.
    pub fn set_text_content(&mut self, content: impl Into<String>) -> EditorResult<bool> {
        let Some(id) = self.selected_text() else {
            return Ok(false);
        };
        let content = content.into();
        self.store.modify_object(id, |object| {
            if let Some(text) = object.as_text_mut() {
                text.content = content;
            }
        })?;
        self.flush()?;
        Ok(true)
    }

    fn selected_text(&self) -> Option<ObjectId> {
        self.store
            .selected_object()
            .filter(|object| object.as_text().is_some())
            .map(SceneObject::id)
    }

    /// Returns false if nothing is selected or the fill does not apply
    pub fn apply_fill_to_selected(&mut self, fill: Fill) -> EditorResult<bool> {
        self.modify_selected(|object| object.apply_fill(fill))
    }

    /// Returns false if nothing is selected or the gradient does not apply
    pub fn apply_gradient_to_selected(&mut self, config: &GradientConfig) -> EditorResult<bool> {
        self.modify_selected(|object| object.apply_gradient(config))
    }

    pub fn set_selected_opacity(&mut self, opacity: f32) -> EditorResult<bool> {
        self.modify_selected(|object| {
            object.set_opacity(opacity);
            true
        })
    }

    fn modify_selected(&mut self, f: impl FnOnce(&mut SceneObject) -> bool) -> EditorResult<bool> {
        let Some(id) = self.store.selection() else {
            return Ok(false);
        };
        let changed = self.store.modify_object(id, f)?;
        self.flush()?;
        Ok(changed)
    }

    /// Rejects non-positive sizes and leaves the canvas as it was
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> EditorResult<()> {
        if let Err(err) = self.store.resize(width, height) {
            warn!("Rejected canvas resize: {}", err);
            return Err(err);
        }
        self.flush()
    }

    pub fn apply_preset(&mut self, name: &str) -> EditorResult<()> {
        let preset = self.config.preset(name)?;
        self.resize_canvas(preset.width, preset.height)
    }

    /// Returns false when the object is already at the requested extreme
    pub fn reorder_object(&mut self, id: ObjectId, order: LayerOrder) -> EditorResult<bool> {
        let moved = self.store.reorder(id, order)?;
        self.flush()?;
        Ok(moved)
    }

    pub fn reorder_selected(&mut self, order: LayerOrder) -> EditorResult<bool> {
        match self.store.selection() {
            Some(id) => self.reorder_object(id, order),
            None => Ok(false),
        }
    }

    pub fn delete_object(&mut self, id: ObjectId) -> EditorResult<()> {
        self.store.remove_object(id)?;
        self.flush()?;
        info!("Deleted object {}", id);
        Ok(())
    }

    /// Delete the selected object, returning its id
    pub fn delete_selected(&mut self) -> EditorResult<Option<ObjectId>> {
        let Some(id) = self.store.selection() else {
            return Ok(None);
        };
        self.delete_object(id)?;
        Ok(Some(id))
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.store.selection()
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.store.selected_object()
    }

    pub fn select(&mut self, id: Option<ObjectId>) -> EditorResult<()> {
        self.store.select(id)?;
        self.flush()
    }

    /// Select the topmost object under a display point, or clear the
    /// selection when there is none. Ignored while canvas selection is
    /// suspended.
    pub fn select_at(&mut self, display_point: Pos2) -> EditorResult<Option<ObjectId>> {
        match self.logical_point(display_point) {
            Some(point) => self.select_at_logical(point),
            None => Ok(self.store.selection()),
        }
    }

    fn select_at_logical(&mut self, point: Pos2) -> EditorResult<Option<ObjectId>> {
        if !self.surface.interaction_mode().selection_enabled {
            debug!("Canvas selection suspended; ignoring press at {:?}", point);
            return Ok(self.store.selection());
        }
        let hit = self.surface.hit_test(self.store.scene(), point);
        self.select(hit)?;
        Ok(hit)
    }

    pub fn activate_gradient_line_tool(&mut self) -> EditorResult<()> {
        self.line_tool.activate(self.surface.as_mut())?;
        Ok(())
    }

    pub fn deactivate_gradient_line_tool(&mut self) -> EditorResult<()> {
        self.line_tool.deactivate(self.surface.as_mut())?;
        Ok(())
    }

    pub fn set_gradient_line_width(&mut self, width: f32) -> EditorResult<()> {
        self.line_tool.set_width(width, &mut self.store)?;
        self.flush()
    }

    pub fn set_gradient_line_config(&mut self, config: GradientConfig) -> EditorResult<()> {
        self.line_tool.set_config(config, &mut self.store)?;
        self.flush()
    }

    /// Map a display point onto the canvas, applying pending size changes
    /// first. Points that do not map to a finite canvas position are dropped.
    fn logical_point(&mut self, display_point: Pos2) -> Option<Pos2> {
        self.mapper.layout();
        let point = self.mapper.to_logical(display_point, self.surface.as_ref());
        if point.is_finite() {
            Some(point)
        } else {
            debug!("Dropping pointer event at {:?}: no finite canvas position", display_point);
            None
        }
    }

    /// Press at a display point: starts a line while the line tool is
    /// armed, selects otherwise
    pub fn pointer_down(&mut self, display_point: Pos2) -> EditorResult<Option<ObjectId>> {
        let Some(point) = self.logical_point(display_point) else {
            return Ok(None);
        };
        if self.line_tool.is_active() {
            let started = self.line_tool.on_pointer_down(point, &mut self.store)?;
            self.flush()?;
            return Ok(started);
        }
        self.select_at_logical(point)
    }

    pub fn pointer_move(&mut self, display_point: Pos2) -> EditorResult<bool> {
        let Some(point) = self.logical_point(display_point) else {
            return Ok(false);
        };
        let moved = self.line_tool.on_pointer_move(point, &mut self.store)?;
        self.flush()?;
        Ok(moved)
    }

    /// Release at a display point; returns the id of a committed line
    pub fn pointer_up(&mut self, display_point: Pos2) -> EditorResult<Option<ObjectId>> {
        let Some(point) = self.logical_point(display_point) else {
            return Ok(None);
        };
        let committed = self.line_tool.on_pointer_up(point, &mut self.store)?;
        self.flush()?;
        Ok(committed)
    }

    /// Size of the display rectangle the canvas is fitted into.
    ///
    /// The scale is recomputed on the next [`Session::layout`] or pointer
    /// event, whichever comes first.
    pub fn set_display_size(&mut self, width: f32, height: f32) {
        self.mapper.set_display_size(width, height);
    }

    /// Recompute the display scale after size changes
    pub fn layout(&mut self) -> f32 {
        self.mapper.layout()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Go back one history entry. `Ok(false)` when there is nothing to undo.
    pub async fn undo(&mut self) -> EditorResult<bool> {
        match self.history.begin_undo()? {
            Some(ticket) => self.restore(ticket).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Go forward one history entry. `Ok(false)` when there is nothing to
    /// redo.
    pub async fn redo(&mut self) -> EditorResult<bool> {
        match self.history.begin_redo()? {
            Some(ticket) => self.restore(ticket).await.map(|()| true),
            None => Ok(false),
        }
    }

    async fn restore(&mut self, ticket: RestoreTicket) -> EditorResult<()> {
        // Dropping this future mid-load rolls the history back through the guard
        let guard = self.history.guard(ticket);
        let direction = guard.direction();
        let scene = match guard.snapshot().restore() {
            Ok(scene) => scene,
            Err(err) => {
                error!("{:?} restore failed: {}", direction, err);
                guard.abort();
                return Err(err);
            }
        };
        if let Err(err) = self.surface.load_scene(&scene, &self.assets).await {
            error!("{:?} restore failed while loading the scene: {}", direction, err);
            guard.abort();
            return Err(err.into());
        }

        self.store.replace_scene(scene);
        let scene = self.store.scene();
        self.mapper.set_logical_size(scene.width(), scene.height());
        self.surface.request_repaint();
        // Already repainted; nothing of a replay goes into the history
        self.store.take_events();
        info!("{:?} restored a scene with {} objects", direction, self.store.scene().len());
        guard.finish();
        Ok(())
    }

    /// Current scene as pixels, in-progress line included
    pub fn render(&mut self) -> EditorResult<RgbaImage> {
        Ok(self.surface.render(self.store.scene(), &self.assets)?)
    }

    pub fn export_raster(&mut self, format: ExportFormat, quality: f32) -> EditorResult<Vec<u8>> {
        let pixels = self.render()?;
        let bytes = encode_raster(&pixels, format, quality)?;
        info!("Exported {} bytes of {}", bytes.len(), format);
        Ok(bytes)
    }

    /// Export with the configured format and quality
    pub fn export_default(&mut self) -> EditorResult<Vec<u8>> {
        let export = self.config.export;
        self.export_raster(export.format, export.quality)
    }

    pub fn save_document(&self, path: impl AsRef<Path>) -> EditorResult<()> {
        persistence::save_document(path.as_ref(), self.store.scene(), &self.assets)?;
        Ok(())
    }

    /// Replace the scene with a saved document and start a new history
    pub async fn open_document(&mut self, path: impl AsRef<Path>) -> EditorResult<()> {
        let scene = persistence::load_document(path.as_ref(), &self.assets)?;
        self.surface.load_scene(&scene, &self.assets).await?;

        self.store.select(None)?;
        self.store.replace_scene(scene);
        self.store.take_events();
        self.history.initialize_from(self.store.scene())?;
        let scene = self.store.scene();
        self.mapper.set_logical_size(scene.width(), scene.height());
        self.surface.request_repaint();
        Ok(())
    }

    /// Draw to a new surface. The history starts over from the current
    /// scene, as it does whenever the surface is rebuilt.
    pub async fn attach_surface(&mut self, mut surface: Box<dyn RenderSurface>) -> EditorResult<()> {
        surface.load_scene(self.store.scene(), &self.assets).await?;
        if self.line_tool.is_active() {
            self.line_tool.deactivate(self.surface.as_mut())?;
        }
        self.surface = surface;
        self.history.initialize_from(self.store.scene())?;
        self.surface.request_repaint();
        info!("Render surface attached; history reset");
        Ok(())
    }
}
