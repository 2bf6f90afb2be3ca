use std::collections::HashSet;

use egui::{Color32, Pos2, pos2};
use serde::{Deserialize, Serialize};

use crate::element::SceneObject;
use crate::error::{EditorError, EditorResult};
use crate::gradient::GradientConfig;
use crate::id_generator::ObjectId;

pub const DEFAULT_CANVAS_WIDTH: u32 = 4000;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 2000;

/// Canvas background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Background {
    Solid(Color32),
    /// Spans the whole canvas; recomputed from the config whenever the canvas
    /// size changes
    Gradient(GradientConfig),
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color32::WHITE)
    }
}

/// The editable document: canvas size, background and paint order
/// (first object is painted first, i.e. at the bottom)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    width: u32,
    height: u32,
    background: Background,
    objects: Vec<SceneObject>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background: Background::default(),
            objects: Vec::new(),
        }
    }
}

impl Scene {
    pub fn new(width: u32, height: u32, background: Background) -> EditorResult<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            background,
            objects: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn center(&self) -> Pos2 {
        pos2(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids from bottom to top
    pub fn paint_order(&self) -> Vec<ObjectId> {
        self.objects.iter().map(SceneObject::id).collect()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }

    pub fn find(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    pub(crate) fn find_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    pub(crate) fn objects_mut(&mut self) -> &mut Vec<SceneObject> {
        &mut self.objects
    }

    pub(crate) fn set_background(&mut self, background: Background) {
        self.background = match background {
            Background::Gradient(config) => Background::Gradient(config.sanitized()),
            solid => solid,
        };
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) -> EditorResult<()> {
        validate_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Check the invariants a deserialized scene must hold
    pub fn validate(&self) -> EditorResult<()> {
        validate_dimensions(self.width, self.height)?;
        let mut seen = HashSet::with_capacity(self.objects.len());
        for object in &self.objects {
            if !seen.insert(object.id()) {
                return Err(EditorError::DuplicateObject(object.id()));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_dimensions(width: u32, height: u32) -> EditorResult<()> {
    if width == 0 || height == 0 {
        return Err(EditorError::InvalidDimension { width, height });
    }
    Ok(())
}
