//! Scene documents on disk.
//!
//! A document is a JSON file holding the scene; the images it references are
//! written next to it as PNG files in `<stem>.assets/`, named by asset id.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{AssetId, AssetStore};
use crate::element::ObjectKind;
use crate::id_generator;
use crate::scene::Scene;
use crate::util::time;

/// Format version written by this build
pub const DOCUMENT_VERSION: u32 = 1;

/// Errors that can occur while saving or loading documents
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read or write image asset {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: u32,
    /// Seconds since the UNIX epoch
    pub saved_at: u64,
    pub scene: Scene,
}

impl SceneDocument {
    pub fn new(scene: Scene) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            saved_at: time::timestamp_secs(),
            scene,
        }
    }
}

/// Directory holding the image assets of the document at `path`
pub fn assets_dir(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{}.assets", stem))
}

fn asset_path(dir: &Path, id: AssetId) -> PathBuf {
    dir.join(format!("{}.png", id))
}

fn referenced_assets(scene: &Scene) -> Vec<AssetId> {
    let mut ids = Vec::new();
    for object in scene.objects() {
        if let ObjectKind::Image(image) = object.kind() {
            if !ids.contains(&image.asset) {
                ids.push(image.asset);
            }
        }
    }
    ids
}

/// Write `scene` and the images it references
pub fn save_document(path: &Path, scene: &Scene, assets: &AssetStore) -> PersistenceResult<()> {
    let referenced = referenced_assets(scene);
    if !referenced.is_empty() {
        let dir = assets_dir(path);
        fs::create_dir_all(&dir)?;
        for id in referenced {
            let pixels = assets
                .get(id)
                .ok_or_else(|| PersistenceError::InvalidDocument(format!("image asset {} is not loaded", id)))?;
            let file = asset_path(&dir, id);
            pixels
                .save_with_format(&file, ImageFormat::Png)
                .map_err(|source| PersistenceError::Image { path: file.clone(), source })?;
            debug!("Wrote asset {}", file.display());
        }
    }

    let json = serde_json::to_string_pretty(&SceneDocument::new(scene.clone()))?;
    fs::write(path, json)?;
    info!("Saved scene with {} objects to {}", scene.len(), path.display());
    Ok(())
}

/// Read a document, importing its images into `assets`.
///
/// Ids handed out afterwards never collide with the loaded objects.
pub fn load_document(path: &Path, assets: &AssetStore) -> PersistenceResult<Scene> {
    let json = fs::read_to_string(path)?;
    let document: SceneDocument = serde_json::from_str(&json)?;
    if document.version > DOCUMENT_VERSION {
        return Err(PersistenceError::InvalidDocument(format!(
            "document version {} is newer than supported version {}",
            document.version, DOCUMENT_VERSION
        )));
    }
    if document.version < DOCUMENT_VERSION {
        warn!("Loading document written with older version {}", document.version);
    }

    let scene = document.scene;
    scene
        .validate()
        .map_err(|err| PersistenceError::InvalidDocument(err.to_string()))?;

    let dir = assets_dir(path);
    for id in referenced_assets(&scene) {
        if assets.contains(id) {
            continue;
        }
        let file = asset_path(&dir, id);
        let pixels = image::open(&file)
            .map_err(|source| PersistenceError::Image { path: file.clone(), source })?
            .to_rgba8();
        assets.insert_with_id(id, pixels);
    }

    if let Some(max_id) = scene.objects().iter().map(|object| object.id()).max() {
        id_generator::reserve_past(max_id);
    }
    info!("Loaded scene with {} objects from {}", scene.len(), path.display());
    Ok(scene)
}
