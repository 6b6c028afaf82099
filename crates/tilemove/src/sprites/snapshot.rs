use serde::{Deserialize, Serialize};

use crate::world::{BlendMode, CharacterGraphic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: i32,
    pub height: i32,
}

impl FrameSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Graphic identity of a sprite plus the frame size its sheet resolved to.
/// `frame` is `None` when the graphic has no bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteBitmap {
    pub graphic: CharacterGraphic,
    pub frame: Option<FrameSize>,
}

/// Last state pushed to the renderer for one mover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualSnapshot {
    pub bitmap: Option<SpriteBitmap>,
    pub source_rect: Option<SourceRect>,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub opacity: u8,
    pub blend_mode: BlendMode,
    pub visible: bool,
    pub bush_depth: u8,
}

impl Default for VisualSnapshot {
    fn default() -> Self {
        Self {
            bitmap: None,
            source_rect: None,
            x: 0,
            y: 0,
            z: 0,
            opacity: 255,
            blend_mode: BlendMode::Normal,
            visible: true,
            bush_depth: 0,
        }
    }
}

impl VisualSnapshot {
    pub fn frame(&self) -> Option<FrameSize> {
        self.bitmap.as_ref().and_then(|bitmap| bitmap.frame)
    }

    pub fn graphic(&self) -> Option<&CharacterGraphic> {
        self.bitmap.as_ref().map(|bitmap| &bitmap.graphic)
    }
}

/// Attributes that changed this frame; untouched attributes stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpriteDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitmap: Option<SpriteBitmap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_rect: Option<SourceRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bush_depth: Option<u8>,
}

impl SpriteDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn changed_count(&self) -> usize {
        [
            self.bitmap.is_some(),
            self.source_rect.is_some(),
            self.x.is_some(),
            self.y.is_some(),
            self.z.is_some(),
            self.opacity.is_some(),
            self.blend_mode.is_some(),
            self.visible.is_some(),
            self.bush_depth.is_some(),
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
    }
}
