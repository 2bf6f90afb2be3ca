use std::sync::Arc;

use egui::{Color32, Rect, pos2};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use image::{Rgba, RgbaImage};
use log::debug;

use super::{InteractionMode, MAX_RASTER_SIDE, RenderError, RenderSurface};
use crate::assets::AssetStore;
use crate::element::{ObjectKind, SceneObject};
use crate::gradient;
use crate::scene::{Background, Scene};
use crate::viewport::ViewportTransform;

/// Deterministic software rasterizer.
///
/// Pixels are sampled at their centres without anti-aliasing, so the same
/// scene always produces the same bytes. Text is not rasterized.
#[derive(Debug, Default)]
pub struct RasterSurface {
    interaction: InteractionMode,
    viewport: ViewportTransform,
    repaint_requests: u64,
    loads: u64,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repaints requested so far
    pub fn repaint_requests(&self) -> u64 {
        self.repaint_requests
    }

    /// Number of completed scene loads
    pub fn loads(&self) -> u64 {
        self.loads
    }

    pub fn set_viewport_transform(&mut self, viewport: ViewportTransform) {
        self.viewport = viewport;
    }
}

impl RenderSurface for RasterSurface {
    fn request_repaint(&mut self) {
        self.repaint_requests += 1;
    }

    fn load_scene<'a>(&'a mut self, scene: &'a Scene, assets: &'a AssetStore) -> LocalBoxFuture<'a, Result<(), RenderError>> {
        async move {
            for object in scene.objects() {
                if let ObjectKind::Image(image) = object.kind() {
                    if !assets.contains(image.asset) {
                        return Err(RenderError::MissingAsset(image.asset));
                    }
                }
            }
            self.loads += 1;
            debug!("Raster surface loaded {} objects", scene.len());
            Ok(())
        }
        .boxed_local()
    }

    fn render(&mut self, scene: &Scene, assets: &AssetStore) -> Result<RgbaImage, RenderError> {
        let (width, height) = (scene.width(), scene.height());
        if width > MAX_RASTER_SIDE || height > MAX_RASTER_SIDE {
            return Err(RenderError::CanvasTooLarge { width, height });
        }

        let mut canvas = paint_background(width, height, scene.background());
        for object in scene.objects() {
            paint_object(&mut canvas, object, assets)?;
        }
        Ok(canvas)
    }

    fn viewport_transform(&self) -> ViewportTransform {
        self.viewport
    }

    fn interaction_mode(&self) -> InteractionMode {
        self.interaction
    }

    fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.interaction = mode;
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

fn paint_background(width: u32, height: u32, background: &Background) -> RgbaImage {
    match background {
        Background::Solid(color) => RgbaImage::from_pixel(width, height, to_rgba(*color)),
        Background::Gradient(config) => {
            let gradient = gradient::build_area_gradient(width as f32, height as f32, config);
            RgbaImage::from_fn(width, height, |x, y| {
                let color = gradient.sample(pos2(x as f32 + 0.5, y as f32 + 0.5));
                // Blend onto white so translucent stops look the same in every export format
                let mut pixel = Rgba([255, 255, 255, 255]);
                blend(&mut pixel, stop_rgba(color), 1.0);
                pixel
            })
        }
    }
}

fn stop_rgba(color: gradient::StopColor) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, (color.alpha * 255.0).round().clamp(0.0, 255.0) as u8])
}

/// Source-over compositing of unpremultiplied colours
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f32) {
    let sa = src.0[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: u8, d: u8| ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba([
        mix(src.0[0], dst.0[0]),
        mix(src.0[1], dst.0[1]),
        mix(src.0[2], dst.0[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

fn paint_object(canvas: &mut RgbaImage, object: &SceneObject, assets: &AssetStore) -> Result<(), RenderError> {
    let opacity = object.opacity();
    if opacity <= 0.0 {
        return Ok(());
    }
    let source = match object.kind() {
        ObjectKind::Text(_) => {
            debug!("Skipping glyphs of text object {}", object.id());
            return Ok(());
        }
        ObjectKind::Image(image) => Some(assets.get(image.asset).ok_or(RenderError::MissingAsset(image.asset))?),
        ObjectKind::Shape(_) | ObjectKind::GradientLine(_) => None,
    };

    let canvas_rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(canvas.width() as f32, canvas.height() as f32));
    let area = object.bounds().intersect(canvas_rect);
    if !area.is_positive() {
        return Ok(());
    }

    let transform = object.transform();
    let (x0, y0) = (area.min.x.floor() as u32, area.min.y.floor() as u32);
    let x1 = (area.max.x.ceil() as u32).min(canvas.width());
    let y1 = (area.max.y.ceil() as u32).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let Some(local) = transform.to_local(pos2(x as f32 + 0.5, y as f32 + 0.5)) else {
                continue;
            };
            let color = match (object.kind(), &source) {
                (ObjectKind::Shape(shape), _) if shape.contains_local(local) => to_rgba(shape.color_at(local)),
                (ObjectKind::GradientLine(line), _) if line.covers(local) => stop_rgba(line.color_at(local)),
                (ObjectKind::Image(image), Some(pixels)) => match image.source_pixel(local) {
                    Some((px, py)) => sample(pixels, px, py),
                    None => continue,
                },
                _ => continue,
            };
            blend(canvas.get_pixel_mut(x, y), color, opacity);
        }
    }
    Ok(())
}

fn sample(pixels: &Arc<RgbaImage>, x: u32, y: u32) -> Rgba<u8> {
    pixels.get_pixel_checked(x, y).copied().unwrap_or(Rgba([0, 0, 0, 0]))
}
