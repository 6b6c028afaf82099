use std::collections::btree_map;
use std::collections::BTreeMap;
use std::slice;

use thiserror::Error;

use super::mover::{Mover, MoverId};
use crate::map::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("mover {0:?} is already registered")]
    Duplicate(MoverId),
    #[error("mover {0:?} is not registered")]
    Unknown(MoverId),
    #[error("the player-controlled mover {0:?} cannot be removed")]
    PlayerRemoval(MoverId),
}

/// All movers on the current map. The player is held apart from the other
/// occupants and never reported by `find_occupants`.
#[derive(Debug, Clone)]
pub struct MoverRegistry {
    player: Mover,
    events: BTreeMap<MoverId, Mover>,
}

impl MoverRegistry {
    pub fn new(player: Mover) -> Self {
        Self {
            player,
            events: BTreeMap::new(),
        }
    }

    pub fn player_id(&self) -> MoverId {
        self.player.id()
    }

    pub fn player(&self) -> &Mover {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Mover {
        &mut self.player
    }

    pub fn is_player(&self, id: MoverId) -> bool {
        id == self.player.id()
    }

    pub fn insert(&mut self, mover: Mover) -> Result<(), RegistryError> {
        let id = mover.id();
        if self.is_player(id) || self.events.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.events.insert(id, mover);
        Ok(())
    }

    pub fn remove(&mut self, id: MoverId) -> Result<Mover, RegistryError> {
        if self.is_player(id) {
            return Err(RegistryError::PlayerRemoval(id));
        }
        self.events.remove(&id).ok_or(RegistryError::Unknown(id))
    }

    pub fn get(&self, id: MoverId) -> Option<&Mover> {
        if self.is_player(id) {
            return Some(&self.player);
        }
        self.events.get(&id)
    }

    pub fn get_mut(&mut self, id: MoverId) -> Option<&mut Mover> {
        if self.is_player(id) {
            return Some(&mut self.player);
        }
        self.events.get_mut(&id)
    }

    pub fn mover_count(&self) -> usize {
        self.events.len() + 1
    }

    pub fn events(&self) -> btree_map::Values<'_, MoverId, Mover> {
        self.events.values()
    }

    /// Player first, then every other mover in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Mover> {
        std::iter::once(&self.player).chain(self.events.values())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mover> {
        std::iter::once(&mut self.player).chain(self.events.values_mut())
    }

    pub fn positions(&self) -> impl Iterator<Item = (MoverId, TileCoord)> + '_ {
        self.iter().map(|mover| (mover.id(), mover.coord()))
    }
}

/// Non-player movers standing on one tile, either read from the tile index
/// or found by scanning every mover.
#[derive(Debug, Clone)]
pub struct Occupants<'a> {
    movers: &'a MoverRegistry,
    source: OccupantSource<'a>,
}

#[derive(Debug, Clone)]
enum OccupantSource<'a> {
    Indexed(slice::Iter<'a, MoverId>),
    Scan {
        events: btree_map::Values<'a, MoverId, Mover>,
        coord: TileCoord,
    },
}

impl<'a> Occupants<'a> {
    pub(crate) fn indexed(movers: &'a MoverRegistry, ids: &'a [MoverId]) -> Self {
        Self {
            movers,
            source: OccupantSource::Indexed(ids.iter()),
        }
    }

    pub(crate) fn scan(movers: &'a MoverRegistry, coord: TileCoord) -> Self {
        Self {
            movers,
            source: OccupantSource::Scan {
                events: movers.events(),
                coord,
            },
        }
    }
}

impl<'a> Iterator for Occupants<'a> {
    type Item = &'a Mover;

    fn next(&mut self) -> Option<&'a Mover> {
        let movers = self.movers;
        match &mut self.source {
            OccupantSource::Indexed(ids) => ids
                .filter(|id| !movers.is_player(**id))
                .find_map(|id| movers.events.get(id)),
            OccupantSource::Scan { events, coord } => {
                let coord = *coord;
                events.find(|mover| mover.coord() == coord)
            }
        }
    }
}
