use std::fmt;

use serde::{Deserialize, Serialize};

/// World-space vector: meters, Y-up, rotations in degrees.
pub type Vec3 = [f64; 3];

/// Default thickness of the floor slab emitted by constructors and prompts.
pub const FLOOR_THICKNESS: f64 = 0.1;

fn zero_vec3() -> Vec3 {
    [0.0, 0.0, 0.0]
}

fn unit_vec3() -> Vec3 {
    [1.0, 1.0, 1.0]
}

/// Geometry source of a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Box,
    Model,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Box => "box",
            ItemKind::Model => "model",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural role of a placed item, assigned at creation and preserved
/// through every transformation. Documents written before roles existed
/// deserialize as furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemRole {
    Floor,
    Wall,
    #[default]
    Furniture,
}

impl ItemRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemRole::Floor => "floor",
            ItemRole::Wall => "wall",
            ItemRole::Furniture => "furniture",
        }
    }
}

impl fmt::Display for ItemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One placed object in the store layout.
///
/// The serialized field names are the persisted document contract: `type`
/// for the kind tag, `path` for model assets, and transform triples that
/// may be omitted (position and rotation default to zero, scale to one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub role: ItemRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "zero_vec3")]
    pub position: Vec3,
    #[serde(default = "zero_vec3")]
    pub rotation: Vec3,
    #[serde(default = "unit_vec3")]
    pub scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl SceneItem {
    /// Floor slab centered at the origin with the given footprint.
    pub fn floor(width: f64, depth: f64) -> Self {
        Self {
            kind: ItemKind::Box,
            role: ItemRole::Floor,
            path: None,
            position: zero_vec3(),
            rotation: zero_vec3(),
            scale: [width, FLOOR_THICKNESS, depth],
            color: None,
            texture: None,
            annotation: None,
        }
    }

    /// Wall segment resting on the floor plane.
    pub fn wall(position: Vec3, scale: Vec3) -> Self {
        Self {
            kind: ItemKind::Box,
            role: ItemRole::Wall,
            path: None,
            position,
            rotation: zero_vec3(),
            scale,
            color: None,
            texture: None,
            annotation: None,
        }
    }

    /// Box-shaped furniture resting on the floor plane.
    pub fn furniture(position: Vec3, scale: Vec3) -> Self {
        Self {
            kind: ItemKind::Box,
            role: ItemRole::Furniture,
            path: None,
            position,
            rotation: zero_vec3(),
            scale,
            color: None,
            texture: None,
            annotation: None,
        }
    }

    /// Furniture referencing an external 3D asset.
    pub fn model(path: impl Into<String>, position: Vec3, scale: Vec3) -> Self {
        Self {
            kind: ItemKind::Model,
            role: ItemRole::Furniture,
            path: Some(path.into()),
            position,
            rotation: zero_vec3(),
            scale,
            color: None,
            texture: None,
            annotation: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }
}

/// Ordered list of placed items describing a store layout. Index 0 is the
/// floor; serialization is a bare JSON array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scene {
    pub items: Vec<SceneItem>,
}

impl Scene {
    pub fn new(items: Vec<SceneItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The floor item, found by its role tag.
    pub fn floor(&self) -> Option<&SceneItem> {
        self.items.iter().find(|item| item.role == ItemRole::Floor)
    }

    /// The floor's annotation text, the channel the model uses to speak.
    pub fn floor_annotation(&self) -> Option<&str> {
        self.floor().and_then(|item| item.annotation.as_deref())
    }

    /// Copy with every annotation removed. Annotations are assistant-authored
    /// commentary and must not re-enter the model as scene context.
    pub fn without_annotations(&self) -> Scene {
        Scene {
            items: self
                .items
                .iter()
                .map(|item| SceneItem {
                    annotation: None,
                    ..item.clone()
                })
                .collect(),
        }
    }
}

impl From<Vec<SceneItem>> for Scene {
    fn from(items: Vec<SceneItem>) -> Self {
        Self { items }
    }
}
