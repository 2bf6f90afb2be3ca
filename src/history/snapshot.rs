use crate::error::EditorResult;
use crate::scene::Scene;

/// A self-contained serialized copy of a scene.
///
/// Two snapshots compare equal exactly when the scenes they were taken from
/// serialize to the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn capture(scene: &Scene) -> EditorResult<Self> {
        Ok(Self(serde_json::to_string(scene)?))
    }

    /// Rebuild the scene this snapshot was taken from
    pub fn restore(&self) -> EditorResult<Scene> {
        let scene: Scene = serde_json::from_str(&self.0)?;
        scene.validate()?;
        Ok(scene)
    }
}
