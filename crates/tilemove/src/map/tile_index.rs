use std::collections::HashMap;

use thiserror::Error;

use super::coords::TileCoord;
use super::grid::GridSize;
use crate::world::MoverId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexViolation {
    #[error("mover {id:?} at {coord:?} is missing from the tile index")]
    Missing { id: MoverId, coord: TileCoord },
    #[error("mover {id:?} is indexed at {indexed:?} but stands at {actual:?}")]
    Misplaced {
        id: MoverId,
        indexed: TileCoord,
        actual: TileCoord,
    },
    #[error("mover {id:?} appears {count} times in the tile index")]
    Duplicated { id: MoverId, count: usize },
    #[error("tile index holds unknown mover {id:?} at {coord:?}")]
    Unknown { id: MoverId, coord: TileCoord },
}

/// Occupant ids per tile, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIndex {
    size: GridSize,
    cells: Vec<Vec<MoverId>>,
}

impl TileIndex {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![Vec::new(); size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn occupants(&self, coord: TileCoord) -> &[MoverId] {
        self.size
            .index_of(coord)
            .and_then(|index| self.cells.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn insert(&mut self, id: MoverId, coord: TileCoord) -> bool {
        let Some(index) = self.size.index_of(coord) else {
            return false;
        };
        self.cells[index].push(id);
        true
    }

    pub fn remove(&mut self, id: MoverId, coord: TileCoord) -> bool {
        let Some(index) = self.size.index_of(coord) else {
            return false;
        };
        let cell = &mut self.cells[index];
        match cell.iter().position(|occupant| *occupant == id) {
            Some(position) => {
                cell.remove(position);
                true
            }
            None => false,
        }
    }

    /// Removes from the old cell before appending to the new one.
    pub fn relocate(&mut self, id: MoverId, from: TileCoord, to: TileCoord) {
        self.remove(id, from);
        self.insert(id, to);
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn entry_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Checks every indexed id against the live positions of all movers.
    pub fn verify(
        &self,
        positions: impl IntoIterator<Item = (MoverId, TileCoord)>,
    ) -> Result<(), IndexViolation> {
        let expected = positions.into_iter().collect::<HashMap<_, _>>();
        let mut seen = HashMap::<MoverId, usize>::with_capacity(expected.len());

        for (index, cell) in self.cells.iter().enumerate() {
            let coord = self.size.coord_of(index);
            for id in cell {
                let Some(actual) = expected.get(id).copied() else {
                    return Err(IndexViolation::Unknown { id: *id, coord });
                };
                if actual != coord {
                    return Err(IndexViolation::Misplaced {
                        id: *id,
                        indexed: coord,
                        actual,
                    });
                }
                let count = seen.entry(*id).or_insert(0);
                *count += 1;
                if *count > 1 {
                    return Err(IndexViolation::Duplicated {
                        id: *id,
                        count: *count,
                    });
                }
            }
        }

        for (id, coord) in expected {
            if self.size.contains(coord) && !seen.contains_key(&id) {
                return Err(IndexViolation::Missing { id, coord });
            }
        }
        Ok(())
    }
}
