mod mover;
mod occupant;
mod registry;
mod tracker;
mod view;

pub use mover::{
    BlendMode, CharacterGraphic, Mover, MoverId, TriggerKind, ALWAYS_ON_TOP_Z, BUSH_DEPTH_PX,
    REAL_UNITS_PER_TILE, TILE_SIZE_PX,
};
pub use occupant::Occupant;
pub use registry::{MoverRegistry, Occupants, RegistryError};
pub use tracker::{MoverTracker, TileMove};
pub use view::WorldView;
