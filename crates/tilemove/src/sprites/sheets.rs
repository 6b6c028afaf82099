use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::snapshot::FrameSize;
use crate::world::TILE_SIZE_PX;

/// Character sheets hold 4 patterns by 4 facings.
pub const SHEET_FRAMES_PER_SIDE: i32 = 4;

/// Resolves a character sheet name to its pixel size. Loading and caching
/// the bitmaps themselves belongs to the renderer.
pub trait CharacterSheets {
    fn sheet_size(&self, character_name: &str) -> Option<FrameSize>;
}

/// In-memory sheet sizes keyed by character name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetSizes {
    sizes: HashMap<String, FrameSize>,
}

impl SheetSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, width: i32, height: i32) -> Self {
        self.insert(name, width, height);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, width: i32, height: i32) {
        self.sizes.insert(name.into(), FrameSize::new(width, height));
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl CharacterSheets for SheetSizes {
    fn sheet_size(&self, character_name: &str) -> Option<FrameSize> {
        self.sizes.get(character_name).copied()
    }
}

pub fn tile_frame() -> FrameSize {
    FrameSize::new(TILE_SIZE_PX, TILE_SIZE_PX)
}

pub fn character_frame(sheet: FrameSize) -> FrameSize {
    FrameSize::new(
        sheet.width / SHEET_FRAMES_PER_SIDE,
        sheet.height / SHEET_FRAMES_PER_SIDE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_frame_is_a_quarter_of_the_sheet() {
        assert_eq!(character_frame(FrameSize::new(128, 192)), FrameSize::new(32, 48));
    }

    #[test]
    fn sheet_sizes_deserialize_from_a_name_map() {
        let sheets: SheetSizes = serde_json::from_value(serde_json::json!({
            "hero": { "width": 128, "height": 192 }
        }))
        .expect("sheets");
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets.sheet_size("hero"), Some(FrameSize::new(128, 192)));
        assert_eq!(sheets.sheet_size("ghost"), None);
    }
}
