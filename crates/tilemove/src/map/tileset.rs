use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OBSTRUCTION_MASK: u8 = 0x0f;
pub const BUSH_FLAG: u8 = 0x40;
pub const COUNTER_FLAG: u8 = 0x80;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u16);

impl TileId {
    pub const EMPTY: TileId = TileId(0);

    /// Ids above zero draw a map tile instead of a character sheet.
    pub fn is_tile_graphic(self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileEntry {
    pub passage: u8,
    pub priority: u8,
}

impl TileEntry {
    pub const fn new(passage: u8, priority: u8) -> Self {
        Self { passage, priority }
    }

    pub fn blocks(self, bit: u8) -> bool {
        obstructs(self.passage, bit)
    }

    pub fn is_overlay(self) -> bool {
        self.priority == 0
    }

    pub fn is_bush(self) -> bool {
        self.passage & BUSH_FLAG == BUSH_FLAG
    }

    pub fn is_counter(self) -> bool {
        self.passage & COUNTER_FLAG == COUNTER_FLAG
    }
}

/// Direction bit set, or every direction blocked.
pub fn obstructs(passage: u8, bit: u8) -> bool {
    passage & bit != 0 || passage & OBSTRUCTION_MASK == OBSTRUCTION_MASK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilesetError {
    #[error("passage table has {passages} entries but priority table has {priorities}")]
    LengthMismatch { passages: usize, priorities: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilesetTable {
    passages: Vec<u8>,
    priorities: Vec<u8>,
}

impl TilesetTable {
    pub fn new(passages: Vec<u8>, priorities: Vec<u8>) -> Result<Self, TilesetError> {
        if passages.len() != priorities.len() {
            return Err(TilesetError::LengthMismatch {
                passages: passages.len(),
                priorities: priorities.len(),
            });
        }
        Ok(Self {
            passages,
            priorities,
        })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TileEntry>) -> Self {
        let (passages, priorities) = entries
            .into_iter()
            .map(|entry| (entry.passage, entry.priority))
            .unzip();
        Self {
            passages,
            priorities,
        }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn entry(&self, id: TileId) -> Option<TileEntry> {
        let index = id.0 as usize;
        Some(TileEntry {
            passage: *self.passages.get(index)?,
            priority: *self.priorities.get(index)?,
        })
    }

    pub fn passage(&self, id: TileId) -> Option<u8> {
        self.passages.get(id.0 as usize).copied()
    }

    pub fn priority(&self, id: TileId) -> Option<u8> {
        self.priorities.get(id.0 as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_tables() {
        let err = TilesetTable::new(vec![0, 1], vec![5]).expect_err("mismatch");
        assert_eq!(
            err,
            TilesetError::LengthMismatch {
                passages: 2,
                priorities: 1
            }
        );
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        let tileset = TilesetTable::from_entries([TileEntry::new(0, 5), TileEntry::new(0x0f, 1)]);
        assert_eq!(tileset.entry(TileId(1)), Some(TileEntry::new(0x0f, 1)));
        assert_eq!(tileset.entry(TileId(2)), None);
        assert_eq!(tileset.passage(TileId(7)), None);
        assert_eq!(tileset.priority(TileId(0)), Some(5));
    }

    #[test]
    fn obstruction_checks_direction_bit_or_full_block() {
        let down_only = TileEntry::new(0x01, 1);
        assert!(down_only.blocks(0x01));
        assert!(!down_only.blocks(0x08));
        assert!(!down_only.blocks(0));

        let sealed = TileEntry::new(0x0f, 1);
        assert!(sealed.blocks(0));

        let bush = TileEntry::new(BUSH_FLAG, 1);
        assert!(bush.is_bush());
        assert!(!bush.is_counter());
        assert!(!bush.blocks(0x02));
    }
}
