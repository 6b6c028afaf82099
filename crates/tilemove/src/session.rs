use thiserror::Error;
use tracing::{debug, info, warn};

use crate::map::{Direction, GameMap, IndexViolation, TileCoord};
use crate::rules::{mover_passable, TriggerDispatcher, TOUCH_TRIGGERS};
use crate::sprites::{CharacterSheets, SpriteSyncEngine, SyncConfig, SyncFrame};
use crate::world::{
    Mover, MoverId, MoverRegistry, Occupant, RegistryError, TileMove, TriggerKind, WorldView,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("mover {id:?} is not on this map")]
    UnknownMover { id: MoverId },
    #[error("{coord:?} is outside the {width}x{height} map")]
    OutOfBounds {
        coord: TileCoord,
        width: u32,
        height: u32,
    },
}

/// Owns the current map, its movers and their sprites, and runs the
/// per-frame order: mover updates, tile index maintenance, then sprite sync.
#[derive(Debug)]
pub struct MapSession {
    map: GameMap,
    movers: MoverRegistry,
    sprites: SpriteSyncEngine,
    interpreter_running: bool,
}

impl MapSession {
    pub fn new(map: GameMap, player: Mover, sync: SyncConfig) -> Result<Self, SessionError> {
        let movers = MoverRegistry::new(player);
        let (map, movers, sprites) = populate(map, movers, Vec::new(), sync)?;
        info!(
            player = movers.player_id().0,
            width = map.width(),
            height = map.height(),
            "session_started"
        );
        Ok(Self {
            map,
            movers,
            sprites,
            interpreter_running: false,
        })
    }

    /// Swaps in a freshly set up map. The new state is built in full before
    /// the old one is dropped, so a failed transfer leaves the session as is.
    pub fn transfer(
        &mut self,
        map: GameMap,
        player_coord: TileCoord,
        events: Vec<Mover>,
    ) -> Result<(), SessionError> {
        ensure_in_bounds(&map, player_coord)?;
        let mut player = self.movers.player().clone();
        player.moveto(player_coord);
        let event_count = events.len();
        let (map, movers, sprites) =
            populate(map, MoverRegistry::new(player), events, self.sprites.config())?;
        self.map = map;
        self.movers = movers;
        self.sprites = sprites;
        info!(
            width = self.map.width(),
            height = self.map.height(),
            player_x = player_coord.x,
            player_y = player_coord.y,
            events = event_count,
            "map_transferred"
        );
        Ok(())
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn movers(&self) -> &MoverRegistry {
        &self.movers
    }

    pub fn sprites(&self) -> &SpriteSyncEngine {
        &self.sprites
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(&self.map, &self.movers)
    }

    pub fn player(&self) -> &Mover {
        self.movers.player()
    }

    pub fn mover(&self, id: MoverId) -> Option<&Mover> {
        self.movers.get(id)
    }

    /// Coordinate changes made through this handle reach the tile index on
    /// the next `step_frame`.
    pub fn mover_mut(&mut self, id: MoverId) -> Option<&mut Mover> {
        self.movers.get_mut(id)
    }

    pub fn add_mover(&mut self, mut mover: Mover) -> Result<(), SessionError> {
        ensure_in_bounds(&self.map, mover.coord())?;
        let id = mover.id();
        let coord = mover.coord();
        mover.reset_tracker();
        self.movers.insert(mover)?;
        self.map.tile_index_mut().insert(id, coord);
        self.sprites.track(id);
        debug!(mover = id.0, x = coord.x, y = coord.y, "mover_added");
        Ok(())
    }

    pub fn remove_mover(&mut self, id: MoverId) -> Result<Mover, SessionError> {
        let mover = self.movers.remove(id)?;
        let indexed = mover.tracker().remembered();
        if !self.map.tile_index_mut().remove(id, indexed) {
            warn!(mover = id.0, x = indexed.x, y = indexed.y, "removed_mover_not_indexed");
        }
        self.sprites.forget(id);
        debug!(mover = id.0, "mover_removed");
        Ok(mover)
    }

    pub fn interpreter_running(&self) -> bool {
        self.interpreter_running
    }

    pub fn set_interpreter_running(&mut self, running: bool) {
        self.interpreter_running = running;
    }

    /// Scroll offset in real units.
    pub fn set_display(&mut self, x: i32, y: i32) {
        self.map.set_display(x, y);
    }

    pub fn query_passable(
        &self,
        coord: TileCoord,
        direction: Direction,
        excluding: Option<MoverId>,
    ) -> bool {
        let view = self.view();
        self.map.resolver().passable(&view, coord, direction, excluding)
    }

    /// Unknown movers cannot move anywhere.
    pub fn mover_passable(&self, id: MoverId, from: TileCoord, direction: Direction) -> bool {
        match self.movers.get(id) {
            Some(mover) => mover_passable(&self.view(), mover, from, direction),
            None => false,
        }
    }

    pub fn find_occupants(&self, coord: TileCoord) -> Vec<MoverId> {
        self.view()
            .find_occupants(coord)
            .map(Mover::id)
            .collect()
    }

    pub fn tile_occupants(&self, coord: TileCoord, include_player: bool) -> Vec<MoverId> {
        self.view().tile_occupants(coord, include_player)
    }

    pub fn is_bush(&self, coord: TileCoord) -> bool {
        self.map.is_bush(coord)
    }

    pub fn is_counter(&self, coord: TileCoord) -> bool {
        self.map.is_counter(coord)
    }

    pub fn has_any_bush(&self) -> bool {
        self.map.has_any_bush()
    }

    fn dispatcher(&self) -> TriggerDispatcher<'_> {
        TriggerDispatcher::new(self.view(), self.interpreter_running)
    }

    /// Fires matching occupants under the player.
    pub fn check_here(&mut self, triggers: &[TriggerKind]) -> bool {
        let fired = self.dispatcher().here(self.movers.player(), triggers);
        self.start_all("here", fired)
    }

    /// Fires matching occupants the player faces, reaching across a counter.
    pub fn check_there(&mut self, triggers: &[TriggerKind]) -> bool {
        let fired = self.dispatcher().there(self.movers.player(), triggers);
        self.start_all("there", fired)
    }

    pub fn check_touch(&mut self, coord: TileCoord) -> bool {
        let fired = self.dispatcher().touch(coord);
        self.start_all("touch", fired)
    }

    fn start_all(&mut self, check: &'static str, fired: Vec<MoverId>) -> bool {
        for id in &fired {
            if let Some(mover) = self.movers.get_mut(*id) {
                mover.request_start();
                debug!(mover = id.0, check, "trigger_fired");
            }
        }
        !fired.is_empty()
    }

    /// Drains pending start requests for the interpreter, in mover order.
    pub fn take_start_requests(&mut self) -> Vec<MoverId> {
        self.movers
            .iter_mut()
            .filter_map(|mover| mover.take_start_request().then(|| mover.id()))
            .collect()
    }

    /// Turns and steps one tile if passable. A blocked player probes the
    /// destination for touch triggers; a blocked event-touch mover fires
    /// itself when the player is in the way.
    pub fn move_straight(
        &mut self,
        id: MoverId,
        direction: Direction,
    ) -> Result<bool, SessionError> {
        let mover = self.movers.get(id).ok_or(SessionError::UnknownMover { id })?;
        let from = mover.coord();
        let dest = from.step(direction);
        let passable = mover_passable(&self.view(), mover, from, direction);
        let bumped = !passable && self.dispatcher().bumped_player(mover, dest);

        let mover = self.movers.get_mut(id).ok_or(SessionError::UnknownMover { id })?;
        mover.turn(direction);
        if passable {
            mover.begin_step(direction);
            return Ok(true);
        }
        if bumped {
            mover.request_start();
            debug!(mover = id.0, check = "event_touch", "trigger_fired");
        } else if self.movers.is_player(id) {
            self.check_touch(dest);
        }
        Ok(false)
    }

    /// Jumps by an offset; the landing tile must pass a stationary query
    /// unless the jump is in place.
    pub fn jump(&mut self, id: MoverId, dx: i32, dy: i32) -> Result<bool, SessionError> {
        let mover = self.movers.get(id).ok_or(SessionError::UnknownMover { id })?;
        let landing = mover.coord().offset(dx, dy);
        let in_place = dx == 0 && dy == 0;
        let lands = in_place || mover_passable(&self.view(), mover, landing, Direction::None);

        let mover = self.movers.get_mut(id).ok_or(SessionError::UnknownMover { id })?;
        mover.turn(jump_facing(dx, dy));
        if !lands {
            return Ok(false);
        }
        mover.begin_jump(dx, dy);
        Ok(true)
    }

    pub fn moveto(&mut self, id: MoverId, coord: TileCoord) -> Result<(), SessionError> {
        ensure_in_bounds(&self.map, coord)?;
        let mover = self.movers.get_mut(id).ok_or(SessionError::UnknownMover { id })?;
        mover.moveto(coord);
        Ok(())
    }

    pub fn turn(&mut self, id: MoverId, direction: Direction) -> Result<(), SessionError> {
        let mover = self.movers.get_mut(id).ok_or(SessionError::UnknownMover { id })?;
        mover.turn(direction);
        Ok(())
    }

    /// Updates every mover, then moves each one whose tile changed between
    /// index cells. A player that finishes a step checks touch triggers
    /// underfoot.
    pub fn step_frame(&mut self) -> Vec<(MoverId, TileMove)> {
        let player_was_moving = self.movers.player().moving();
        let mut tile_moves = Vec::new();
        for mover in self.movers.iter_mut() {
            mover.update();
            let Some(tile_move) = mover.observe_tile() else {
                continue;
            };
            self.map
                .tile_index_mut()
                .relocate(mover.id(), tile_move.from, tile_move.to);
            debug!(
                mover = mover.id().0,
                from_x = tile_move.from.x,
                from_y = tile_move.from.y,
                to_x = tile_move.to.x,
                to_y = tile_move.to.y,
                "mover_tile_changed"
            );
            tile_moves.push((mover.id(), tile_move));
        }

        if player_was_moving && !self.movers.player().moving() {
            self.check_here(&TOUCH_TRIGGERS);
        }
        tile_moves
    }

    pub fn sync_sprites(&mut self, sheets: &dyn CharacterSheets) -> SyncFrame {
        self.sprites.sync_frame(&self.map, &self.movers, sheets)
    }

    pub fn verify_index(&self) -> Result<(), IndexViolation> {
        self.map
            .tile_index()
            .verify(self.movers.positions())
            .inspect_err(|violation| warn!(%violation, "tile_index_violation"))
    }
}

fn populate(
    mut map: GameMap,
    mut movers: MoverRegistry,
    events: Vec<Mover>,
    sync: SyncConfig,
) -> Result<(GameMap, MoverRegistry, SpriteSyncEngine), SessionError> {
    ensure_in_bounds(&map, movers.player().coord())?;
    movers.player_mut().reset_tracker();
    for mut event in events {
        ensure_in_bounds(&map, event.coord())?;
        event.reset_tracker();
        movers.insert(event)?;
    }
    let mut sprites = SpriteSyncEngine::new(sync);
    let index = map.tile_index_mut();
    index.clear();
    for (id, coord) in movers.positions() {
        index.insert(id, coord);
        sprites.track(id);
    }
    Ok((map, movers, sprites))
}

fn ensure_in_bounds(map: &GameMap, coord: TileCoord) -> Result<(), SessionError> {
    if map.contains(coord) {
        return Ok(());
    }
    Err(SessionError::OutOfBounds {
        coord,
        width: map.width(),
        height: map.height(),
    })
}

fn jump_facing(dx: i32, dy: i32) -> Direction {
    if dx.unsigned_abs() > dy.unsigned_abs() {
        if dx < 0 {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if dy != 0 {
        if dy < 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    } else {
        Direction::None
    }
}
