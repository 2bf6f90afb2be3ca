use egui::Pos2;

use crate::element::SceneObject;
use crate::id_generator::ObjectId;
use crate::scene::Scene;

/// Topmost object under `point` (logical canvas coordinates)
pub fn hit_test(scene: &Scene, point: Pos2) -> Option<ObjectId> {
    hit_test_objects(scene.objects(), point)
}

/// Paint order is bottom-first, so search from the end
pub fn hit_test_objects(objects: &[SceneObject], point: Pos2) -> Option<ObjectId> {
    objects
        .iter()
        .rev()
        .find(|object| object.contains(point))
        .map(SceneObject::id)
}
