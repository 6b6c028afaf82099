use crate::map::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub from: TileCoord,
    pub to: TileCoord,
}

/// Remembers the tile seen at the previous frame to detect tile changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoverTracker {
    remembered: TileCoord,
    last: TileCoord,
    changed_tile: bool,
}

impl MoverTracker {
    pub fn new(coord: TileCoord) -> Self {
        Self {
            remembered: coord,
            last: coord,
            changed_tile: false,
        }
    }

    /// Called once per frame after the mover updated.
    pub fn observe(&mut self, current: TileCoord) -> Option<TileMove> {
        self.changed_tile = self.remembered != current;
        let tile_move = if self.changed_tile {
            self.last = self.remembered;
            Some(TileMove {
                from: self.remembered,
                to: current,
            })
        } else {
            None
        };
        self.remembered = current;
        tile_move
    }

    pub fn changed_tile(&self) -> bool {
        self.changed_tile
    }

    pub fn last(&self) -> TileCoord {
        self.last
    }

    pub fn remembered(&self) -> TileCoord {
        self.remembered
    }

    pub fn reset(&mut self, coord: TileCoord) {
        *self = Self::new(coord);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_tile_change_once() {
        let start = TileCoord::new(1, 1);
        let mut tracker = MoverTracker::new(start);
        assert_eq!(tracker.observe(start), None);
        assert!(!tracker.changed_tile());

        let next = TileCoord::new(1, 2);
        assert_eq!(
            tracker.observe(next),
            Some(TileMove {
                from: start,
                to: next
            })
        );
        assert!(tracker.changed_tile());
        assert_eq!(tracker.last(), start);

        assert_eq!(tracker.observe(next), None);
        assert!(!tracker.changed_tile());
        assert_eq!(tracker.last(), start);
    }

    #[test]
    fn multi_tile_jump_between_frames_is_one_move() {
        let start = TileCoord::new(0, 0);
        let mut tracker = MoverTracker::new(start);
        let landing = TileCoord::new(0, 3);
        let tile_move = tracker.observe(landing).expect("move");
        assert_eq!(tile_move.from, start);
        assert_eq!(tracker.remembered(), landing);
    }
}
