use log::debug;
use serde::{Deserialize, Serialize};

use crate::element::SceneObject;
use crate::error::{EditorError, EditorResult};
use crate::event::{EventBus, EventHandler, SceneEvent};
use crate::id_generator::ObjectId;
use crate::scene::{Background, Scene};
use crate::selection::Selection;

/// Layer actions available from the properties panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerOrder {
    /// Swap with the object directly above
    BringForward,
    /// Swap with the object directly below
    SendBackward,
    /// Move to the top of the paint order
    BringToFront,
    /// Move to the bottom of the paint order
    SendToBack,
}

/// Owner of the scene and the selection.
///
/// Every change is announced as a [`SceneEvent`], both to subscribers and to
/// a pending queue the session drains to drive repaints and history.
#[derive(Debug, Default)]
pub struct SceneStore {
    scene: Scene,
    selection: Selection,
    bus: EventBus,
    pending: Vec<SceneEvent>,
}

impl SceneStore {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection.id()
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selection.resolve(&self.scene)
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.bus.subscribe(handler);
    }

    /// Drain the events emitted since the last call
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.pending)
    }

    fn emit(&mut self, event: SceneEvent) {
        debug!("scene event: {:?}", event);
        self.bus.emit(&event);
        self.pending.push(event);
    }

    /// Append on top of the paint order and select it
    pub fn add_object(&mut self, object: SceneObject) -> EditorResult<ObjectId> {
        self.insert(object, false)
    }

    /// Like [`SceneStore::add_object`], for an object that is still being
    /// shaped; call [`SceneStore::commit_object`] once it is final
    pub fn add_live_object(&mut self, object: SceneObject) -> EditorResult<ObjectId> {
        self.insert(object, true)
    }

    fn insert(&mut self, object: SceneObject, live: bool) -> EditorResult<ObjectId> {
        let id = object.id();
        if self.scene.find(id).is_some() {
            return Err(EditorError::DuplicateObject(id));
        }
        self.scene.objects_mut().push(object);
        self.emit(if live { SceneEvent::LiveObjectAdded(id) } else { SceneEvent::ObjectAdded(id) });
        self.set_selection(Some(id));
        Ok(id)
    }

    /// Change an object without committing the change
    pub fn update_object<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut SceneObject) -> R) -> EditorResult<R> {
        let object = self.scene.find_mut(id).ok_or(EditorError::UnknownObject(id))?;
        let result = f(object);
        self.emit(SceneEvent::ObjectUpdated(id));
        Ok(result)
    }

    /// Declare the current state of an object final
    pub fn commit_object(&mut self, id: ObjectId) -> EditorResult<()> {
        if self.scene.find(id).is_none() {
            return Err(EditorError::UnknownObject(id));
        }
        self.emit(SceneEvent::ObjectModified(id));
        Ok(())
    }

    /// Change an object and commit the change
    pub fn modify_object<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut SceneObject) -> R) -> EditorResult<R> {
        let object = self.scene.find_mut(id).ok_or(EditorError::UnknownObject(id))?;
        let result = f(object);
        self.emit(SceneEvent::ObjectModified(id));
        Ok(result)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> EditorResult<SceneObject> {
        let index = self.scene.index_of(id).ok_or(EditorError::UnknownObject(id))?;
        let removed = self.scene.objects_mut().remove(index);
        self.emit(SceneEvent::ObjectRemoved(id));
        if self.selection.is(id) {
            self.set_selection(None);
        }
        Ok(removed)
    }

    pub fn set_background(&mut self, background: Background) {
        self.scene.set_background(background);
        self.emit(SceneEvent::BackgroundChanged);
    }

    /// Change the logical canvas size. Objects are kept as they are, even if
    /// they now fall outside the canvas.
    pub fn resize(&mut self, width: u32, height: u32) -> EditorResult<()> {
        if (self.scene.width(), self.scene.height()) == (width, height) {
            return Ok(());
        }
        self.scene.set_size(width, height)?;
        self.emit(SceneEvent::Resized { width, height });
        Ok(())
    }

    /// Move an object within the paint order.
    ///
    /// Returns false when the object is already at the requested extreme.
    pub fn reorder(&mut self, id: ObjectId, order: LayerOrder) -> EditorResult<bool> {
        let from = self.scene.index_of(id).ok_or(EditorError::UnknownObject(id))?;
        let last = self.scene.len() - 1;
        let to = match order {
            LayerOrder::BringForward => (from + 1).min(last),
            LayerOrder::SendBackward => from.saturating_sub(1),
            LayerOrder::BringToFront => last,
            LayerOrder::SendToBack => 0,
        };
        if to == from {
            return Ok(false);
        }

        let objects = self.scene.objects_mut();
        let object = objects.remove(from);
        objects.insert(to, object);
        self.emit(SceneEvent::Reordered { id, order, from, to });
        Ok(true)
    }

    pub fn select(&mut self, id: Option<ObjectId>) -> EditorResult<()> {
        if let Some(id) = id {
            if self.scene.find(id).is_none() {
                return Err(EditorError::UnknownObject(id));
            }
        }
        self.set_selection(id);
        Ok(())
    }

    fn set_selection(&mut self, id: Option<ObjectId>) {
        if self.selection.set(id) {
            self.emit(SceneEvent::SelectionChanged { selected: id });
        }
    }

    /// Swap in a restored scene. The selection survives only if its object
    /// is still present.
    pub(crate) fn replace_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.emit(SceneEvent::SceneReplaced);
        if self.selection.resolve(&self.scene).is_none() {
            self.set_selection(None);
        }
    }
}
