use crate::element::SceneObject;
use crate::id_generator::ObjectId;
use crate::scene::Scene;

/// Zero or one active object, held as an id lookup rather than a reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    active: Option<ObjectId>,
}

impl Selection {
    pub fn id(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    pub fn is(&self, id: ObjectId) -> bool {
        self.active == Some(id)
    }

    /// Look the selected object up in `scene`; `None` once it was removed
    pub fn resolve<'a>(&self, scene: &'a Scene) -> Option<&'a SceneObject> {
        self.active.and_then(|id| scene.find(id))
    }

    /// Set the selection, returning whether it changed
    pub(crate) fn set(&mut self, id: Option<ObjectId>) -> bool {
        let changed = self.active != id;
        self.active = id;
        changed
    }
}
