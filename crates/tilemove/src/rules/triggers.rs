use tracing::debug;

use crate::map::{Direction, TileCoord};
use crate::world::{Mover, MoverId, Occupant, TriggerKind, WorldView};

pub const TOUCH_TRIGGERS: [TriggerKind; 2] = [TriggerKind::PlayerTouch, TriggerKind::EventTouch];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationRule {
    /// Fires for a mover standing on the same tile.
    SteppedOnto,
    /// Fires for a mover facing it from an adjacent tile.
    Approached,
}

/// Finds which occupants an actor's position or facing would fire. The
/// caller starts the returned movers.
#[derive(Debug, Clone, Copy)]
pub struct TriggerDispatcher<'a> {
    view: WorldView<'a>,
    interpreter_running: bool,
}

impl<'a> TriggerDispatcher<'a> {
    pub fn new(view: WorldView<'a>, interpreter_running: bool) -> Self {
        Self {
            view,
            interpreter_running,
        }
    }

    pub fn here(&self, actor: &Mover, triggers: &[TriggerKind]) -> Vec<MoverId> {
        if self.interpreter_running {
            return Vec::new();
        }
        self.matching(actor.coord(), triggers, ActivationRule::SteppedOnto)
    }

    pub fn there(&self, actor: &Mover, triggers: &[TriggerKind]) -> Vec<MoverId> {
        if self.interpreter_running {
            return Vec::new();
        }
        let direction = actor.direction();
        let front = actor.coord().step(direction);
        let fired = self.matching(front, triggers, ActivationRule::Approached);
        if !fired.is_empty() || !self.view.map.is_counter(front) {
            return fired;
        }
        let beyond = front.step(direction);
        debug!(?front, ?beyond, "trigger_probe_across_counter");
        self.matching(beyond, triggers, ActivationRule::Approached)
    }

    pub fn touch(&self, coord: TileCoord) -> Vec<MoverId> {
        if self.interpreter_running {
            return Vec::new();
        }
        self.matching(coord, &TOUCH_TRIGGERS, ActivationRule::Approached)
    }

    /// An event-touch mover that bumps into the player fires itself.
    pub fn bumped_player(&self, mover: &Mover, dest: TileCoord) -> bool {
        if self.interpreter_running || mover.trigger() != TriggerKind::EventTouch {
            return false;
        }
        self.view.player().coord() == dest
            && !mover.jumping()
            && self.activation_rule(mover) == ActivationRule::Approached
    }

    /// Graphic-less or through occupants standing on an open tile are
    /// stepped onto; everything else must be approached.
    pub fn activation_rule<O: Occupant + ?Sized>(&self, occupant: &O) -> ActivationRule {
        if occupant.has_character_graphic() && !occupant.passes_through() {
            return ActivationRule::Approached;
        }
        let resolver = self.view.map.resolver();
        if !resolver.passable(&self.view, occupant.position(), Direction::None, None) {
            return ActivationRule::Approached;
        }
        ActivationRule::SteppedOnto
    }

    fn matching(
        &self,
        coord: TileCoord,
        triggers: &[TriggerKind],
        rule: ActivationRule,
    ) -> Vec<MoverId> {
        self.view
            .find_occupants(coord)
            .filter(|occupant| triggers.contains(&occupant.trigger_kind()))
            .filter(|occupant| !occupant.is_jumping() && self.activation_rule(*occupant) == rule)
            .map(|occupant| occupant.occupant_id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{GameMap, MapData, TileEntry, TileId, TilesetTable, COUNTER_FLAG};
    use crate::options::AntilagOptions;
    use crate::world::{CharacterGraphic, MoverRegistry};

    const FLOOR: TileId = TileId(1);
    const COUNTER: TileId = TileId(2);

    fn build(ground: Vec<TileId>, width: u32, movers: Vec<Mover>) -> (GameMap, MoverRegistry) {
        let tileset = TilesetTable::from_entries([
            TileEntry::new(0, 5),
            TileEntry::new(0, 1),
            TileEntry::new(COUNTER_FLAG | 0x0f, 1),
        ]);
        let height = ground.len() as u32 / width;
        let data = MapData::from_ground(width, height, ground).expect("map");
        let mut map = GameMap::setup(data, tileset, AntilagOptions::default());
        let mut movers = movers.into_iter();
        let player = movers.next().expect("player");
        map.tile_index_mut().insert(player.id(), player.coord());
        let mut registry = MoverRegistry::new(player);
        for mover in movers {
            map.tile_index_mut().insert(mover.id(), mover.coord());
            registry.insert(mover).expect("insert");
        }
        (map, registry)
    }

    fn hero(coord: TileCoord, facing: Direction) -> Mover {
        Mover::new(MoverId(0), coord)
            .with_graphic(CharacterGraphic::character("hero"))
            .with_direction(facing)
    }

    fn clerk(id: u32, coord: TileCoord) -> Mover {
        Mover::new(MoverId(id), coord).with_graphic(CharacterGraphic::character("clerk"))
    }

    fn floor_switch(id: u32, coord: TileCoord, trigger: TriggerKind) -> Mover {
        Mover::new(MoverId(id), coord).with_trigger(trigger)
    }

    #[test]
    fn here_fires_every_stepped_onto_match_in_index_order() {
        let at = TileCoord::new(1, 1);
        let (map, movers) = build(
            vec![FLOOR; 9],
            3,
            vec![
                hero(at, Direction::Down),
                floor_switch(4, at, TriggerKind::PlayerTouch),
                floor_switch(2, at, TriggerKind::PlayerTouch),
                floor_switch(3, at, TriggerKind::Autorun),
                clerk(5, at).with_trigger(TriggerKind::PlayerTouch),
            ],
        );
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), false);
        let fired = dispatcher.here(movers.player(), &TOUCH_TRIGGERS);
        assert_eq!(fired, vec![MoverId(4), MoverId(2)]);
    }

    #[test]
    fn running_interpreter_blocks_every_check() {
        let at = TileCoord::new(0, 0);
        let (map, movers) = build(
            vec![FLOOR; 4],
            2,
            vec![
                hero(at, Direction::Right),
                floor_switch(1, at, TriggerKind::ActionButton),
                clerk(2, TileCoord::new(1, 0)),
            ],
        );
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), true);
        assert!(dispatcher
            .here(movers.player(), &[TriggerKind::ActionButton])
            .is_empty());
        assert!(dispatcher
            .there(movers.player(), &[TriggerKind::ActionButton])
            .is_empty());
        assert!(dispatcher
            .touch(TileCoord::new(1, 0))
            .is_empty());
    }

    #[test]
    fn there_reaches_across_a_counter() {
        // Row: hero, counter, clerk.
        let (map, movers) = build(
            vec![FLOOR, COUNTER, FLOOR],
            3,
            vec![
                hero(TileCoord::new(0, 0), Direction::Right),
                clerk(7, TileCoord::new(2, 0)),
            ],
        );
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), false);
        assert_eq!(
            dispatcher.there(movers.player(), &[TriggerKind::ActionButton]),
            vec![MoverId(7)]
        );
        assert!(dispatcher
            .there(movers.player(), &[TriggerKind::PlayerTouch])
            .is_empty());
    }

    #[test]
    fn there_does_not_reach_past_plain_floor() {
        let (map, movers) = build(
            vec![FLOOR, FLOOR, FLOOR],
            3,
            vec![
                hero(TileCoord::new(0, 0), Direction::Right),
                clerk(7, TileCoord::new(2, 0)),
            ],
        );
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), false);
        assert!(dispatcher
            .there(movers.player(), &[TriggerKind::ActionButton])
            .is_empty());
    }

    #[test]
    fn touch_uses_touch_triggers_and_skips_jumpers() {
        let target = TileCoord::new(1, 0);
        let mut jumper = clerk(3, target).with_trigger(TriggerKind::EventTouch);
        jumper.begin_jump(0, 0);
        let (map, movers) = build(
            vec![FLOOR; 2],
            2,
            vec![
                hero(TileCoord::new(0, 0), Direction::Right),
                clerk(1, target).with_trigger(TriggerKind::ActionButton),
                clerk(2, target).with_trigger(TriggerKind::EventTouch),
                jumper,
            ],
        );
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), false);
        assert_eq!(dispatcher.touch(target), vec![MoverId(2)]);
    }

    #[test]
    fn event_touch_mover_fires_when_bumping_into_the_player() {
        let (map, movers) = build(
            vec![FLOOR; 2],
            2,
            vec![hero(TileCoord::new(1, 0), Direction::Down)],
        );
        let chaser = clerk(6, TileCoord::new(0, 0)).with_trigger(TriggerKind::EventTouch);
        let idle = clerk(7, TileCoord::new(0, 0));
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), false);
        assert!(dispatcher.bumped_player(&chaser, TileCoord::new(1, 0)));
        assert!(!dispatcher.bumped_player(&chaser, TileCoord::new(0, 1)));
        assert!(!dispatcher.bumped_player(&idle, TileCoord::new(1, 0)));

        let busy = TriggerDispatcher::new(WorldView::new(&map, &movers), true);
        assert!(!busy.bumped_player(&chaser, TileCoord::new(1, 0)));
    }

    #[test]
    fn activation_rule_depends_on_graphic_through_and_tile() {
        let (map, movers) = build(
            vec![FLOOR, COUNTER],
            2,
            vec![hero(TileCoord::new(0, 0), Direction::Down)],
        );
        let dispatcher = TriggerDispatcher::new(WorldView::new(&map, &movers), false);
        let on_floor = Mover::new(MoverId(1), TileCoord::new(0, 0));
        let on_counter = Mover::new(MoverId(2), TileCoord::new(1, 0));
        let visible = clerk(3, TileCoord::new(0, 0));
        let visible_ghost = clerk(4, TileCoord::new(0, 0)).with_through(true);
        assert_eq!(dispatcher.activation_rule(&on_floor), ActivationRule::SteppedOnto);
        assert_eq!(dispatcher.activation_rule(&on_counter), ActivationRule::Approached);
        assert_eq!(dispatcher.activation_rule(&visible), ActivationRule::Approached);
        assert_eq!(dispatcher.activation_rule(&visible_ghost), ActivationRule::SteppedOnto);
    }
}
