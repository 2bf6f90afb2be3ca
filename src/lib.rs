#![warn(clippy::all, rust_2018_idioms)]

pub mod assets;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gradient;
pub mod history;
pub mod id_generator;
pub mod persistence;
pub mod renderer;
pub mod scene;
pub mod scene_store;
pub mod selection;
pub mod session;
pub mod tools;
pub mod viewport;
mod util;

pub use assets::{AssetId, AssetStore};
pub use config::{CANVAS_PRESETS, CanvasPreset, EditorConfig};
pub use element::{Fill, ObjectKind, SceneObject, ShapeKind, TextAlign, TextStyle};
pub use error::{EditorError, EditorResult, TransitionError};
pub use event::{EventHandler, SceneEvent};
pub use gradient::{GradientConfig, HexColor};
pub use history::{History, Snapshot};
pub use id_generator::ObjectId;
pub use persistence::PersistenceError;
pub use renderer::{ExportFormat, InteractionMode, RasterSurface, RenderError, RenderSurface};
pub use scene::{Background, Scene};
pub use scene_store::{LayerOrder, SceneStore};
pub use session::{ImagePreview, Session};
pub use tools::{GradientLineTool, ToolState};
pub use viewport::{CoordinateMapper, ViewportTransform};
