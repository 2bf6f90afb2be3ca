#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, Rgba, RgbaImage};
use scene_editor::{AssetId, EditorConfig};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Config with a small canvas so rendering stays quick
pub fn small_config(width: u32, height: u32) -> EditorConfig {
    let mut config = EditorConfig::default();
    config.canvas.width = width;
    config.canvas.height = height;
    config
}

/// Encoded PNG filled with one colour
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Unique path under the system temp dir
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("scene_editor_{}_{}", AssetId::new(), name))
}
