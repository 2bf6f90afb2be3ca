use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::assets::AssetId;

/// Image element referencing pixels held by the asset store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    pub asset: AssetId,
    /// Natural size of the source in pixels
    pub width: u32,
    pub height: u32,
}

impl ImageObject {
    pub fn new(asset: AssetId, width: u32, height: u32) -> Self {
        Self { asset, width, height }
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }

    /// Source pixel for a local point (origin at the image centre)
    pub fn source_pixel(&self, local: Vec2) -> Option<(u32, u32)> {
        let x = local.x + self.width as f32 / 2.0;
        let y = local.y + self.height as f32 / 2.0;
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (px, py) = (x.floor() as u32, y.floor() as u32);
        (px < self.width && py < self.height).then_some((px, py))
    }
}
