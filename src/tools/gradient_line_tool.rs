use egui::Pos2;
use log::{debug, info, warn};

use crate::element::{clamp_stroke_width, factory};
use crate::error::{EditorResult, TransitionError};
use crate::gradient::GradientConfig;
use crate::id_generator::ObjectId;
use crate::renderer::{InteractionMode, RenderSurface};
use crate::scene_store::SceneStore;
use crate::tools::ToolState;

/// Draws straight gradient strokes with press, drag and release.
///
/// Pointer points are expected in logical canvas space. The tool only talks
/// to the scene store; history picks the line up when it is committed on
/// release.
#[derive(Debug, Clone)]
pub struct GradientLineTool {
    state: ToolState,
    config: GradientConfig,
    width: f32,
    saved_mode: Option<InteractionMode>,
}

impl GradientLineTool {
    pub fn new(config: GradientConfig, width: f32) -> Self {
        Self {
            state: ToolState::Idle,
            config: config.sanitized(),
            width: clamp_stroke_width(width),
            saved_mode: None,
        }
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn current_state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn in_progress(&self) -> Option<ObjectId> {
        self.state.in_progress()
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Arm the tool: suspend canvas selection and show a crosshair.
    ///
    /// Activating an already active tool does nothing.
    pub fn activate(&mut self, surface: &mut dyn RenderSurface) -> Result<(), TransitionError> {
        if self.state.is_active() {
            debug!("Gradient line tool already active ({})", self.state.name());
            return Ok(());
        }
        self.state.transition(ToolState::Armed)?;
        self.saved_mode = Some(surface.interaction_mode());
        surface.set_interaction_mode(InteractionMode::DRAWING);
        info!("Gradient line tool armed");
        Ok(())
    }

    /// Disarm the tool and give the canvas its previous interaction mode
    /// back. A line being dragged stays in the scene as it is.
    pub fn deactivate(&mut self, surface: &mut dyn RenderSurface) -> Result<(), TransitionError> {
        if !self.state.is_active() {
            return Ok(());
        }
        if let Some(line) = self.state.in_progress() {
            info!("Gradient line tool deactivated mid-drag; leaving line {} in place", line);
        }
        self.state.transition(ToolState::Idle)?;
        surface.set_interaction_mode(self.saved_mode.take().unwrap_or_default());
        Ok(())
    }

    /// Start a line at `point`. Returns the new line's id, or `None` when
    /// the tool is not armed.
    pub fn on_pointer_down(&mut self, point: Pos2, store: &mut SceneStore) -> EditorResult<Option<ObjectId>> {
        match self.state {
            ToolState::Idle => Ok(None),
            ToolState::Dragging { line, .. } => {
                warn!("Pointer down while line {} is still being drawn", line);
                Err(TransitionError::ToolBusy(format!("line {} is still being drawn", line)).into())
            }
            ToolState::Armed => {
                let object = factory::create_gradient_line(point, point, self.width, self.config);
                let line = store.add_live_object(object)?;
                self.state.transition(ToolState::Dragging { line, anchor: point })?;
                debug!("Started line {} at {:?}", line, point);
                Ok(Some(line))
            }
        }
    }

    /// Stretch the line in progress to `point`.
    /// Returns whether a line was updated.
    pub fn on_pointer_move(&mut self, point: Pos2, store: &mut SceneStore) -> EditorResult<bool> {
        let ToolState::Dragging { line, anchor } = self.state else {
            return Ok(false);
        };
        if !self.stretch(line, anchor, point, store)? {
            return Ok(false);
        }
        self.state.transition(ToolState::Dragging { line, anchor })?;
        Ok(true)
    }

    /// Finish the line in progress at `point` and commit it.
    /// Returns the committed line's id.
    pub fn on_pointer_up(&mut self, point: Pos2, store: &mut SceneStore) -> EditorResult<Option<ObjectId>> {
        let ToolState::Dragging { line, anchor } = self.state else {
            return Ok(None);
        };
        if !self.stretch(line, anchor, point, store)? {
            return Ok(None);
        }
        store.commit_object(line)?;
        self.state.transition(ToolState::Armed)?;
        info!("Committed gradient line {}", line);
        Ok(Some(line))
    }

    fn stretch(&mut self, line: ObjectId, anchor: Pos2, point: Pos2, store: &mut SceneStore) -> EditorResult<bool> {
        if store.scene().find(line).is_none() {
            // Removed behind our back (delete or restore); wait for the next press.
            warn!("Line {} vanished while being drawn", line);
            self.state = ToolState::Armed;
            return Ok(false);
        }
        store.update_object(line, |object| object.set_line_endpoints(anchor, point))
    }

    /// Change the stroke width for new lines and for the line in progress
    pub fn set_width(&mut self, width: f32, store: &mut SceneStore) -> EditorResult<()> {
        self.width = clamp_stroke_width(width);
        let width = self.width;
        self.update_in_progress(store, |line| line.set_width(width))
    }

    /// Change the gradient for new lines and for the line in progress
    pub fn set_config(&mut self, config: GradientConfig, store: &mut SceneStore) -> EditorResult<()> {
        let config = config.sanitized();
        self.config = config;
        self.update_in_progress(store, |line| line.set_config(config))
    }

    fn update_in_progress(
        &mut self,
        store: &mut SceneStore,
        f: impl FnOnce(&mut crate::element::GradientLine),
    ) -> EditorResult<()> {
        let Some(line) = self.state.in_progress() else {
            return Ok(());
        };
        if store.scene().find(line).is_none() {
            self.state = ToolState::Armed;
            return Ok(());
        }
        store.update_object(line, |object| {
            if let Some(gradient_line) = object.as_line_mut() {
                f(gradient_line);
            }
        })
    }
}

impl Default for GradientLineTool {
    fn default() -> Self {
        Self::new(GradientConfig::default(), 12.0)
    }
}
