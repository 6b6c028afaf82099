use std::fmt;

use tracing::trace;

use crate::map::{Direction, TileCoord, TilesetTable, LAYER_COUNT};
use crate::options::AntilagOptions;
use crate::world::{Mover, MoverId, Occupant, WorldView};

/// Answers whether a tile can be left or entered in one direction.
pub trait PassabilityResolver: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn passable(
        &self,
        view: &WorldView<'_>,
        coord: TileCoord,
        direction: Direction,
        excluding: Option<MoverId>,
    ) -> bool;
}

pub fn resolver_for(options: &AntilagOptions) -> Box<dyn PassabilityResolver> {
    if options.flat_passages {
        Box::new(FlatResolver)
    } else {
        Box::new(LayeredResolver)
    }
}

/// Occupants from `find_occupants`, then the precomputed passage table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatResolver;

impl PassabilityResolver for FlatResolver {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn passable(
        &self,
        view: &WorldView<'_>,
        coord: TileCoord,
        direction: Direction,
        excluding: Option<MoverId>,
    ) -> bool {
        if !view.map.contains(coord) {
            return false;
        }
        let bit = direction.obstruction_bit();
        let tileset = view.map.tileset();
        let occupants = view.find_occupants(coord);
        if let Some(decided) = scan_occupants(occupants, tileset, bit, excluding) {
            return decided;
        }
        !view.map.passages().blocks(coord, bit)
    }
}

/// Every mover scanned for a match, then the tile layers top-down.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredResolver;

impl PassabilityResolver for LayeredResolver {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn passable(
        &self,
        view: &WorldView<'_>,
        coord: TileCoord,
        direction: Direction,
        excluding: Option<MoverId>,
    ) -> bool {
        if !view.map.contains(coord) {
            return false;
        }
        let bit = direction.obstruction_bit();
        let tileset = view.map.tileset();
        let occupants = view.scan_occupants(coord);
        if let Some(decided) = scan_occupants(occupants, tileset, bit, excluding) {
            return decided;
        }
        for layer in (0..LAYER_COUNT).rev() {
            let Some(entry) = view
                .map
                .data()
                .tile_at(coord, layer)
                .and_then(|tile_id| tileset.entry(tile_id))
            else {
                return false;
            };
            if entry.blocks(bit) {
                return false;
            }
            if entry.is_overlay() {
                return true;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupantVerdict {
    Blocks,
    Clears,
    Undecided,
}

/// How a single occupant's tile reference affects a passage query.
pub fn occupant_verdict<O: Occupant + ?Sized>(
    occupant: &O,
    tileset: &TilesetTable,
    bit: u8,
) -> OccupantVerdict {
    let Some(tile_id) = occupant.tile_reference() else {
        return OccupantVerdict::Undecided;
    };
    let Some(entry) = tileset.entry(tile_id) else {
        return OccupantVerdict::Blocks;
    };
    if entry.blocks(bit) {
        OccupantVerdict::Blocks
    } else if entry.is_overlay() {
        OccupantVerdict::Clears
    } else {
        OccupantVerdict::Undecided
    }
}

// The first occupant with a terminal verdict decides the query.
fn scan_occupants<'a, O: Occupant + 'a>(
    occupants: impl Iterator<Item = &'a O>,
    tileset: &TilesetTable,
    bit: u8,
    excluding: Option<MoverId>,
) -> Option<bool> {
    for occupant in occupants {
        if Some(occupant.occupant_id()) == excluding || occupant.passes_through() {
            continue;
        }
        match occupant_verdict(occupant, tileset, bit) {
            OccupantVerdict::Blocks => return Some(false),
            OccupantVerdict::Clears => return Some(true),
            OccupantVerdict::Undecided => {}
        }
    }
    None
}

/// Whether `mover` may step from `from` toward `direction`.
pub fn mover_passable(
    view: &WorldView<'_>,
    mover: &Mover,
    from: TileCoord,
    direction: Direction,
) -> bool {
    let dest = from.step(direction);
    if !view.map.contains(dest) {
        return false;
    }
    if mover.through() {
        return true;
    }

    let resolver = view.map.resolver();
    if !resolver.passable(view, from, direction, Some(mover.id())) {
        trace!(mover = mover.id().0, ?from, ?direction, "cannot_leave_tile");
        return false;
    }
    if !resolver.passable(view, dest, direction.opposite(), None) {
        trace!(mover = mover.id().0, ?dest, ?direction, "cannot_enter_tile");
        return false;
    }

    let mover_is_player = view.is_player(mover.id());
    for occupant in view.find_occupants(dest) {
        if occupant.passes_through() {
            continue;
        }
        if !mover_is_player || occupant.has_character_graphic() {
            trace!(mover = mover.id().0, occupant = occupant.id().0, ?dest, "tile_occupied");
            return false;
        }
    }

    let player = view.player();
    if player.coord() == dest && !player.through() && mover.graphic().has_character() {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{TileEntry, TileId};
    use crate::world::TriggerKind;

    struct Stub {
        id: u32,
        tile: Option<TileId>,
        through: bool,
    }

    impl Occupant for Stub {
        fn occupant_id(&self) -> MoverId {
            MoverId(self.id)
        }
        fn position(&self) -> TileCoord {
            TileCoord::new(0, 0)
        }
        fn passes_through(&self) -> bool {
            self.through
        }
        fn tile_reference(&self) -> Option<TileId> {
            self.tile
        }
        fn has_character_graphic(&self) -> bool {
            false
        }
        fn trigger_kind(&self) -> TriggerKind {
            TriggerKind::ActionButton
        }
        fn is_jumping(&self) -> bool {
            false
        }
        fn request_start(&mut self) {}
    }

    fn stub(id: u32, tile: u16) -> Stub {
        Stub {
            id,
            tile: Some(TileId(tile)),
            through: false,
        }
    }

    fn tileset() -> TilesetTable {
        TilesetTable::from_entries([
            TileEntry::new(0, 5),
            TileEntry::new(0x0f, 1),
            TileEntry::new(0, 0),
            TileEntry::new(0x02, 1),
        ])
    }

    #[test]
    fn verdicts_follow_bit_then_full_block_then_priority() {
        let tileset = tileset();
        assert_eq!(
            occupant_verdict(&stub(1, 0), &tileset, 0x01),
            OccupantVerdict::Undecided
        );
        assert_eq!(
            occupant_verdict(&stub(1, 1), &tileset, 0x00),
            OccupantVerdict::Blocks
        );
        assert_eq!(
            occupant_verdict(&stub(1, 2), &tileset, 0x08),
            OccupantVerdict::Clears
        );
        assert_eq!(
            occupant_verdict(&stub(1, 3), &tileset, 0x02),
            OccupantVerdict::Blocks
        );
        assert_eq!(
            occupant_verdict(&stub(1, 3), &tileset, 0x04),
            OccupantVerdict::Undecided
        );
        assert_eq!(
            occupant_verdict(&stub(1, 77), &tileset, 0x04),
            OccupantVerdict::Blocks
        );
        let untiled = Stub {
            id: 1,
            tile: None,
            through: false,
        };
        assert_eq!(
            occupant_verdict(&untiled, &tileset, 0x04),
            OccupantVerdict::Undecided
        );
    }

    #[test]
    fn first_terminal_occupant_wins() {
        let tileset = tileset();
        let decal_then_wall = [stub(1, 2), stub(2, 1)];
        assert_eq!(
            scan_occupants(decal_then_wall.iter(), &tileset, 0x01, None),
            Some(true)
        );
        let wall_then_decal = [stub(1, 1), stub(2, 2)];
        assert_eq!(
            scan_occupants(wall_then_decal.iter(), &tileset, 0x01, None),
            Some(false)
        );
    }

    #[test]
    fn excluded_and_through_occupants_are_skipped() {
        let tileset = tileset();
        let ghost = Stub {
            id: 2,
            tile: Some(TileId(1)),
            through: true,
        };
        let occupants = [stub(1, 1), ghost, stub(3, 0)];
        assert_eq!(
            scan_occupants(occupants.iter(), &tileset, 0x01, Some(MoverId(1))),
            None
        );
    }
}
