//! The render capability the editing session draws through.
//!
//! A [`RenderSurface`] keeps its own projection of the scene (which it may
//! rebuild at any time) and turns it into pixels. The scene store stays the
//! authority; the surface is only ever told what to show.

use std::io::Cursor;

use egui::{CursorIcon, Pos2};
use futures::future::LocalBoxFuture;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{AssetId, AssetStore};
use crate::geometry;
use crate::id_generator::ObjectId;
use crate::scene::Scene;
use crate::viewport::ViewportTransform;

mod raster;
pub use raster::RasterSurface;

/// Largest canvas side the software rasterizer accepts
pub const MAX_RASTER_SIDE: u32 = 16_384;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image asset {0} is not available to the renderer")]
    MissingAsset(AssetId),

    #[error("Canvas of {width}x{height} is too large to rasterize")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("Failed to encode {format} export: {source}")]
    Encode {
        format: ExportFormat,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpeg"),
            Self::Png => write!(f, "png"),
        }
    }
}

/// How the canvas reacts to the pointer when no tool claims it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionMode {
    /// Pointer presses select objects
    pub selection_enabled: bool,
    pub cursor: CursorIcon,
}

impl InteractionMode {
    /// Mode used while a drawing tool owns the pointer
    pub const DRAWING: InteractionMode = InteractionMode {
        selection_enabled: false,
        cursor: CursorIcon::Crosshair,
    };
}

impl Default for InteractionMode {
    fn default() -> Self {
        Self {
            selection_enabled: true,
            cursor: CursorIcon::Default,
        }
    }
}

/// A place the scene is drawn to
pub trait RenderSurface {
    /// Ask for the scene to be drawn again
    fn request_repaint(&mut self);

    /// Rebuild the surface's projection from `scene`.
    ///
    /// May suspend while external assets are reloaded.
    fn load_scene<'a>(&'a mut self, scene: &'a Scene, assets: &'a AssetStore) -> LocalBoxFuture<'a, Result<(), RenderError>>;

    /// Draw `scene` at logical resolution
    fn render(&mut self, scene: &Scene, assets: &AssetStore) -> Result<RgbaImage, RenderError>;

    /// Topmost object under a logical canvas point
    fn hit_test(&self, scene: &Scene, point: Pos2) -> Option<ObjectId> {
        geometry::hit_test(scene, point)
    }

    /// Surface-provided mapping from a display point to the canvas.
    /// `None` lets the caller fall back to manual normalization.
    fn scene_point(&self, _display_point: Pos2, _display_scale: f32) -> Option<Pos2> {
        None
    }

    fn viewport_transform(&self) -> ViewportTransform {
        ViewportTransform::default()
    }

    fn interaction_mode(&self) -> InteractionMode;

    fn set_interaction_mode(&mut self, mode: InteractionMode);
}

/// Encode rendered pixels.
///
/// `quality` runs from 0 to 1 and only affects JPEG, which has no alpha
/// channel and is therefore flattened onto white.
pub fn encode_raster(image: &RgbaImage, format: ExportFormat, quality: f32) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Cursor::new(Vec::new());
    let (width, height) = image.dimensions();
    let result = match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes).write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8),
        ExportFormat::Jpeg => {
            let flattened = flatten_onto_white(image);
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality)).write_image(
                flattened.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|source| RenderError::Encode { format, source })?;
    Ok(bytes.into_inner())
}

/// Map 0..1 onto the encoder's 1..100 scale
pub fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_nan() { 1.0 } else { quality.clamp(0.0, 1.0) };
    ((quality * 100.0).round() as u8).max(1)
}

fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let over_white = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    })
}
