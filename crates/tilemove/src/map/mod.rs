mod coords;
mod game_map;
mod grid;
mod layers;
mod passage;
mod tile_index;
mod tileset;

pub use coords::{Direction, TileCoord};
pub use game_map::{GameMap, OccupantLookup, TerrainLookup};
pub use grid::{CoordSet, GridSize};
pub use layers::{MapData, MapDataError, LAYER_COUNT};
pub use passage::{PassageTable, TerrainFlags};
pub use tile_index::{IndexViolation, TileIndex};
pub use tileset::{
    obstructs, TileEntry, TileId, TilesetError, TilesetTable, BUSH_FLAG, COUNTER_FLAG,
    OBSTRUCTION_MASK,
};
