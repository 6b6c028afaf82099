use super::mover::{Mover, MoverId};
use super::registry::{MoverRegistry, Occupants};
use crate::map::{GameMap, OccupantLookup, TileCoord};

/// Read-only pairing of the current map and its movers, handed to the
/// passability and trigger rules for the duration of one query.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    pub map: &'a GameMap,
    pub movers: &'a MoverRegistry,
}

impl<'a> WorldView<'a> {
    pub fn new(map: &'a GameMap, movers: &'a MoverRegistry) -> Self {
        Self { map, movers }
    }

    pub fn find_occupants(&self, coord: TileCoord) -> Occupants<'a> {
        match self.map.occupant_lookup() {
            OccupantLookup::Indexed => {
                Occupants::indexed(self.movers, self.map.tile_index().occupants(coord))
            }
            OccupantLookup::Scan => Occupants::scan(self.movers, coord),
        }
    }

    pub fn scan_occupants(&self, coord: TileCoord) -> Occupants<'a> {
        Occupants::scan(self.movers, coord)
    }

    /// Raw index contents, optionally including the player.
    pub fn tile_occupants(&self, coord: TileCoord, include_player: bool) -> Vec<MoverId> {
        if !self.map.contains(coord) {
            return Vec::new();
        }
        self.map
            .tile_index()
            .occupants(coord)
            .iter()
            .copied()
            .filter(|id| include_player || !self.movers.is_player(*id))
            .collect()
    }

    pub fn player(&self) -> &'a Mover {
        self.movers.player()
    }

    pub fn is_player(&self, id: MoverId) -> bool {
        self.movers.is_player(id)
    }
}
