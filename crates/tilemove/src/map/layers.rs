use thiserror::Error;

use super::coords::TileCoord;
use super::grid::GridSize;
use super::tileset::TileId;

pub const LAYER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapDataError {
    #[error("map must have a non-zero size, got {width}x{height}")]
    ZeroSized { width: u32, height: u32 },
    #[error("map must have exactly 3 tile layers, got {actual}")]
    LayerCount { actual: usize },
    #[error("layer {layer} has {actual} tiles, expected {expected}")]
    LayerSize {
        layer: usize,
        expected: usize,
        actual: usize,
    },
}

/// Three stacked tile-id layers, bottom layer first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapData {
    size: GridSize,
    layers: [Vec<TileId>; LAYER_COUNT],
}

impl MapData {
    pub fn new(width: u32, height: u32, layers: Vec<Vec<TileId>>) -> Result<Self, MapDataError> {
        if width == 0 || height == 0 {
            return Err(MapDataError::ZeroSized { width, height });
        }
        let size = GridSize::new(width, height);
        let expected = size.cell_count();
        for (layer, tiles) in layers.iter().enumerate() {
            if tiles.len() != expected {
                return Err(MapDataError::LayerSize {
                    layer,
                    expected,
                    actual: tiles.len(),
                });
            }
        }
        let layers: [Vec<TileId>; LAYER_COUNT] = layers
            .try_into()
            .map_err(|rest: Vec<Vec<TileId>>| MapDataError::LayerCount { actual: rest.len() })?;
        Ok(Self { size, layers })
    }

    /// A single-layer map with the upper layers left empty.
    pub fn from_ground(width: u32, height: u32, ground: Vec<TileId>) -> Result<Self, MapDataError> {
        let empty = vec![TileId::EMPTY; ground.len()];
        Self::new(width, height, vec![ground, empty.clone(), empty])
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.size.contains(coord)
    }

    pub fn tile_at(&self, coord: TileCoord, layer: usize) -> Option<TileId> {
        let index = self.size.index_of(coord)?;
        self.layers.get(layer)?.get(index).copied()
    }

    pub fn set_tile(&mut self, coord: TileCoord, layer: usize, tile: TileId) -> bool {
        let Some(index) = self.size.index_of(coord) else {
            return false;
        };
        match self.layers.get_mut(layer) {
            Some(tiles) => {
                tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Tile ids stacked at `index`, bottom layer first.
    pub(crate) fn stack_at(&self, index: usize) -> [TileId; LAYER_COUNT] {
        [
            self.layers[0][index],
            self.layers[1][index],
            self.layers[2][index],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_layer_count_and_sizes() {
        let ok = MapData::new(2, 1, vec![vec![TileId(1); 2]; 3]).expect("map");
        assert_eq!(ok.tile_at(TileCoord::new(1, 0), 2), Some(TileId(1)));

        let err = MapData::new(2, 1, vec![vec![TileId(1); 2]; 2]).expect_err("layers");
        assert_eq!(err, MapDataError::LayerCount { actual: 2 });

        let err = MapData::new(2, 2, vec![vec![TileId(0); 4], vec![TileId(0); 3], vec![]])
            .expect_err("size");
        assert_eq!(
            err,
            MapDataError::LayerSize {
                layer: 1,
                expected: 4,
                actual: 3
            }
        );

        let err = MapData::new(0, 4, vec![vec![]; 3]).expect_err("zero");
        assert_eq!(
            err,
            MapDataError::ZeroSized {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn tile_at_is_none_outside_the_map() {
        let map = MapData::from_ground(2, 2, vec![TileId(4); 4]).expect("map");
        assert_eq!(map.tile_at(TileCoord::new(1, 1), 0), Some(TileId(4)));
        assert_eq!(map.tile_at(TileCoord::new(1, 1), 1), Some(TileId::EMPTY));
        assert_eq!(map.tile_at(TileCoord::new(2, 0), 0), None);
        assert_eq!(map.tile_at(TileCoord::new(0, 0), 3), None);
    }
}
