use tracing::info;

use super::coords::TileCoord;
use super::layers::{MapData, LAYER_COUNT};
use super::passage::{PassageTable, TerrainFlags};
use super::tile_index::TileIndex;
use super::tileset::{TilesetTable, BUSH_FLAG, COUNTER_FLAG};
use crate::options::AntilagOptions;
use crate::rules::{resolver_for, PassabilityResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupantLookup {
    Indexed,
    Scan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainLookup {
    Flattened,
    Layered,
}

/// Everything derived from one map load. Rebuilt wholesale on transfer.
#[derive(Debug)]
pub struct GameMap {
    data: MapData,
    tileset: TilesetTable,
    passages: PassageTable,
    terrain: TerrainFlags,
    tile_index: TileIndex,
    options: AntilagOptions,
    resolver: Box<dyn PassabilityResolver>,
    occupant_lookup: OccupantLookup,
    bush_lookup: TerrainLookup,
    counter_lookup: TerrainLookup,
    display: (i32, i32),
}

impl GameMap {
    pub fn setup(data: MapData, tileset: TilesetTable, options: AntilagOptions) -> Self {
        let passages = PassageTable::build(&data, &tileset);
        let terrain = TerrainFlags::build(&data, &tileset);
        let tile_index = TileIndex::new(data.size());
        let resolver = resolver_for(&options);
        let lookup = |flat: bool| {
            if flat {
                TerrainLookup::Flattened
            } else {
                TerrainLookup::Layered
            }
        };
        let occupant_lookup = if options.indexed_occupants {
            OccupantLookup::Indexed
        } else {
            OccupantLookup::Scan
        };

        info!(
            width = data.width(),
            height = data.height(),
            tileset_len = tileset.len(),
            passage_fingerprint = %passages.fingerprint(),
            bush_tiles = terrain.bush_count(),
            counter_tiles = terrain.counter_count(),
            resolver = resolver.name(),
            occupant_lookup = ?occupant_lookup,
            "map_setup"
        );

        Self {
            data,
            tileset,
            passages,
            terrain,
            tile_index,
            options,
            resolver,
            occupant_lookup,
            bush_lookup: lookup(options.flat_bushes),
            counter_lookup: lookup(options.flat_counters),
            display: (0, 0),
        }
    }

    pub fn data(&self) -> &MapData {
        &self.data
    }

    pub fn tileset(&self) -> &TilesetTable {
        &self.tileset
    }

    pub fn passages(&self) -> &PassageTable {
        &self.passages
    }

    pub fn terrain(&self) -> &TerrainFlags {
        &self.terrain
    }

    pub fn tile_index(&self) -> &TileIndex {
        &self.tile_index
    }

    pub(crate) fn tile_index_mut(&mut self) -> &mut TileIndex {
        &mut self.tile_index
    }

    pub fn options(&self) -> &AntilagOptions {
        &self.options
    }

    pub fn resolver(&self) -> &dyn PassabilityResolver {
        self.resolver.as_ref()
    }

    pub fn occupant_lookup(&self) -> OccupantLookup {
        self.occupant_lookup
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.data.contains(coord)
    }

    /// Scroll offset in real units (128 per tile).
    pub fn display(&self) -> (i32, i32) {
        self.display
    }

    pub fn set_display(&mut self, x: i32, y: i32) {
        self.display = (x, y);
    }

    pub fn is_bush(&self, coord: TileCoord) -> bool {
        match self.bush_lookup {
            TerrainLookup::Flattened => self.terrain.is_bush(coord),
            TerrainLookup::Layered => self.layered_flag(coord, BUSH_FLAG),
        }
    }

    pub fn is_counter(&self, coord: TileCoord) -> bool {
        match self.counter_lookup {
            TerrainLookup::Flattened => self.terrain.is_counter(coord),
            TerrainLookup::Layered => self.layered_flag(coord, COUNTER_FLAG),
        }
    }

    pub fn has_any_bush(&self) -> bool {
        self.terrain.has_any_bush()
    }

    // Top layer down; the first tile carrying the flag answers.
    fn layered_flag(&self, coord: TileCoord, flag: u8) -> bool {
        for layer in (0..LAYER_COUNT).rev() {
            let Some(passage) = self
                .data
                .tile_at(coord, layer)
                .and_then(|tile_id| self.tileset.passage(tile_id))
            else {
                return false;
            };
            if passage & flag == flag {
                return true;
            }
        }
        false
    }
}
