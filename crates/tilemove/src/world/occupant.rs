use super::mover::{Mover, MoverId, TriggerKind};
use crate::map::{TileCoord, TileId};

/// What passability and trigger rules need to know about whoever stands on
/// a tile.
pub trait Occupant {
    fn occupant_id(&self) -> MoverId;
    fn position(&self) -> TileCoord;
    fn passes_through(&self) -> bool;
    fn tile_reference(&self) -> Option<TileId>;
    fn has_character_graphic(&self) -> bool;
    fn trigger_kind(&self) -> TriggerKind;
    fn is_jumping(&self) -> bool;
    fn request_start(&mut self);
}

impl Occupant for Mover {
    fn occupant_id(&self) -> MoverId {
        self.id()
    }

    fn position(&self) -> TileCoord {
        self.coord()
    }

    fn passes_through(&self) -> bool {
        self.through()
    }

    fn tile_reference(&self) -> Option<TileId> {
        self.graphic().tile_id
    }

    fn has_character_graphic(&self) -> bool {
        self.graphic().has_character()
    }

    fn trigger_kind(&self) -> TriggerKind {
        self.trigger()
    }

    fn is_jumping(&self) -> bool {
        self.jumping()
    }

    fn request_start(&mut self) {
        self.start();
    }
}
