use super::coords::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    pub fn index_of(self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        Some(coord.y as usize * self.width as usize + coord.x as usize)
    }

    pub fn coord_of(self, index: usize) -> TileCoord {
        let width = self.width.max(1) as usize;
        TileCoord::new((index % width) as i32, (index / width) as i32)
    }
}

/// Dense membership grid for coordinate-keyed terrain sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordSet {
    size: GridSize,
    cells: Vec<bool>,
    len: usize,
}

impl CoordSet {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![false; size.cell_count()],
            len: 0,
        }
    }

    pub fn insert(&mut self, coord: TileCoord) -> bool {
        let Some(index) = self.size.index_of(coord) else {
            return false;
        };
        if self.cells[index] {
            return false;
        }
        self.cells[index] = true;
        self.len += 1;
        true
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.size
            .index_of(coord)
            .and_then(|index| self.cells.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_rejects_negative_and_overflowing_coords() {
        let size = GridSize::new(4, 3);
        assert_eq!(size.index_of(TileCoord::new(0, 0)), Some(0));
        assert_eq!(size.index_of(TileCoord::new(3, 2)), Some(11));
        assert_eq!(size.index_of(TileCoord::new(-1, 0)), None);
        assert_eq!(size.index_of(TileCoord::new(0, -1)), None);
        assert_eq!(size.index_of(TileCoord::new(4, 0)), None);
        assert_eq!(size.index_of(TileCoord::new(0, 3)), None);
        assert_eq!(size.coord_of(7), TileCoord::new(3, 1));
    }

    #[test]
    fn coord_set_keeps_distinct_cells_apart() {
        // A 5x3 grid where x + y * height would alias (3,0) and (0,1).
        let mut set = CoordSet::new(GridSize::new(5, 3));
        assert!(set.insert(TileCoord::new(3, 0)));
        assert!(!set.insert(TileCoord::new(3, 0)));
        assert!(!set.insert(TileCoord::new(9, 9)));
        assert!(set.contains(TileCoord::new(3, 0)));
        assert!(!set.contains(TileCoord::new(0, 1)));
        assert_eq!(set.len(), 1);
    }
}
