//! Image sources referenced by scene objects.
//!
//! Pixels never live inside the scene: an image object only carries an
//! [`AssetId`], which keeps snapshots small and lets undo/redo restore image
//! objects without copying pixel data.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::channel::oneshot;
use image::RgbaImage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared, cheaply clonable store of decoded images
#[derive(Clone, Default)]
pub struct AssetStore {
    images: Arc<RwLock<HashMap<AssetId, Arc<RgbaImage>>>>,
}

impl fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStore")
            .field("images", &format!("<{} images>", self.images.read().len()))
            .finish()
    }
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, image: RgbaImage) -> AssetId {
        let id = AssetId::new();
        self.insert_with_id(id, image);
        id
    }

    pub(crate) fn insert_with_id(&self, id: AssetId, image: RgbaImage) {
        self.images.write().insert(id, Arc::new(image));
    }

    pub fn get(&self, id: AssetId) -> Option<Arc<RgbaImage>> {
        self.images.read().get(&id).cloned()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.images.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }
}

/// Decode an encoded image (PNG, JPEG, ...) off the calling thread.
///
/// Resolves to `AssetDecodeFailure` when the bytes are unreadable; nothing is
/// inserted into any store.
pub async fn decode_image(bytes: Vec<u8>) -> Result<RgbaImage, EditorError> {
    let (sender, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        let decoded = image::load_from_memory(&bytes).map(|image| image.to_rgba8());
        // The receiver may already be gone if the caller stopped waiting
        let _ = sender.send(decoded);
    });

    match receiver.await {
        Ok(Ok(image)) => {
            log::debug!("Successfully decoded image: {}x{}", image.width(), image.height());
            Ok(image)
        }
        Ok(Err(err)) => Err(EditorError::AssetDecodeFailure(err.to_string())),
        Err(oneshot::Canceled) => Err(EditorError::AssetDecodeFailure("decoder thread stopped".to_owned())),
    }
}
