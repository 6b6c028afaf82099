use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Saturates at the `i32` range; a saturated coordinate is never on a map.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Stationary probe; maps to no obstruction bit.
    None,
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Up,
    ];

    pub fn obstruction_bit(self) -> u8 {
        match self {
            Direction::None => 0,
            Direction::Down => 0x01,
            Direction::Left => 0x02,
            Direction::Right => 0x04,
            Direction::Up => 0x08,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
        }
    }

    /// Row of a 4x4 character sheet that holds this facing.
    pub fn sheet_row(self) -> i32 {
        match self {
            Direction::None | Direction::Down => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Up => 3,
        }
    }
}
