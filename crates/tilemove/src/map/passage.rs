use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use super::coords::TileCoord;
use super::grid::{CoordSet, GridSize};
use super::layers::{MapData, LAYER_COUNT};
use super::tileset::{obstructs, TileId, TilesetTable, OBSTRUCTION_MASK};

/// Per-coordinate passage byte flattened from the three tile layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageTable {
    size: GridSize,
    cells: Vec<u8>,
}

impl PassageTable {
    pub fn build(data: &MapData, tileset: &TilesetTable) -> Self {
        let size = data.size();
        let cells = (0..size.cell_count())
            .map(|index| merge_layers(data.stack_at(index), tileset))
            .collect();
        Self { size, cells }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn get(&self, coord: TileCoord) -> Option<u8> {
        self.size
            .index_of(coord)
            .and_then(|index| self.cells.get(index))
            .copied()
    }

    /// Out-of-bounds coordinates always block.
    pub fn blocks(&self, coord: TileCoord, bit: u8) -> bool {
        match self.get(coord) {
            Some(passage) => obstructs(passage, bit),
            None => true,
        }
    }

    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.size.width.to_le_bytes());
        hasher.update(self.size.height.to_le_bytes());
        hasher.update(&self.cells);
        to_hex_lower(&hasher.finalize())
    }
}

// Bottom to top. A later layer replaces the running value when it carries a
// nonzero passage byte or is a priority-0 overlay; it never ORs into it.
fn merge_layers(stack: [TileId; LAYER_COUNT], tileset: &TilesetTable) -> u8 {
    let mut value = 0;
    for tile_id in stack {
        let Some(entry) = tileset.entry(tile_id) else {
            return OBSTRUCTION_MASK;
        };
        if entry.passage != 0 {
            value = entry.passage;
        } else if entry.is_overlay() {
            value = 0;
        }
    }
    value
}

/// Bush and counter membership, built alongside the passage table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainFlags {
    bushes: CoordSet,
    counters: CoordSet,
}

impl TerrainFlags {
    pub fn build(data: &MapData, tileset: &TilesetTable) -> Self {
        let size = data.size();
        let mut bushes = CoordSet::new(size);
        let mut counters = CoordSet::new(size);
        for index in 0..size.cell_count() {
            let coord = size.coord_of(index);
            for tile_id in data.stack_at(index) {
                let Some(entry) = tileset.entry(tile_id) else {
                    continue;
                };
                if entry.is_bush() {
                    bushes.insert(coord);
                } else if entry.is_counter() {
                    counters.insert(coord);
                }
            }
        }
        Self { bushes, counters }
    }

    pub fn is_bush(&self, coord: TileCoord) -> bool {
        self.bushes.contains(coord)
    }

    pub fn is_counter(&self, coord: TileCoord) -> bool {
        self.counters.contains(coord)
    }

    pub fn has_any_bush(&self) -> bool {
        !self.bushes.is_empty()
    }

    pub fn bush_count(&self) -> usize {
        self.bushes.len()
    }

    pub fn counter_count(&self) -> usize {
        self.counters.len()
    }
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}
