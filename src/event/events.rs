use crate::id_generator::ObjectId;
use crate::scene_store::LayerOrder;

/// Changes announced by the scene store
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// An object was added and committed
    ObjectAdded(ObjectId),
    /// An in-progress object was added; it is committed later
    LiveObjectAdded(ObjectId),
    /// An object changed and the change is final
    ObjectModified(ObjectId),
    /// An object changed while still being edited (e.g. mid-drag)
    ObjectUpdated(ObjectId),
    ObjectRemoved(ObjectId),
    Reordered {
        id: ObjectId,
        order: LayerOrder,
        from: usize,
        to: usize,
    },
    BackgroundChanged,
    Resized {
        width: u32,
        height: u32,
    },
    SelectionChanged {
        selected: Option<ObjectId>,
    },
    /// The whole scene was replaced while restoring history
    SceneReplaced,
}

impl SceneEvent {
    /// Whether the change must be captured by the history
    pub fn records_history(&self) -> bool {
        match self {
            SceneEvent::ObjectAdded(_)
            | SceneEvent::ObjectModified(_)
            | SceneEvent::ObjectRemoved(_)
            | SceneEvent::Reordered { .. }
            | SceneEvent::BackgroundChanged
            | SceneEvent::Resized { .. } => true,
            SceneEvent::LiveObjectAdded(_)
            | SceneEvent::ObjectUpdated(_)
            | SceneEvent::SelectionChanged { .. }
            | SceneEvent::SceneReplaced => false,
        }
    }

    /// Whether the visible canvas changed
    pub fn needs_repaint(&self) -> bool {
        !matches!(self, SceneEvent::SelectionChanged { .. })
    }
}
