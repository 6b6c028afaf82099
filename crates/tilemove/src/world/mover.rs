use serde::{Deserialize, Serialize};

use super::tracker::{MoverTracker, TileMove};
use crate::map::{Direction, GameMap, TileCoord, TileId};

pub const REAL_UNITS_PER_TILE: i32 = 128;
pub const TILE_SIZE_PX: i32 = 32;
pub const BUSH_DEPTH_PX: u8 = 12;
pub const ALWAYS_ON_TOP_Z: i32 = 999;
const DEFAULT_MOVE_SPEED: u8 = 4;
const MAX_MOVE_SPEED: u8 = 6;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoverId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    #[default]
    ActionButton,
    PlayerTouch,
    EventTouch,
    Autorun,
    Parallel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Subtract,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterGraphic {
    pub character_name: String,
    pub hue: u16,
    /// `None` marks a mover with no tile reference at all; such movers are
    /// ignored by passage checks.
    pub tile_id: Option<TileId>,
}

impl Default for CharacterGraphic {
    fn default() -> Self {
        Self {
            character_name: String::new(),
            hue: 0,
            tile_id: Some(TileId::EMPTY),
        }
    }
}

impl CharacterGraphic {
    pub fn character(name: impl Into<String>) -> Self {
        Self {
            character_name: name.into(),
            ..Self::default()
        }
    }

    pub fn tile(tile_id: TileId) -> Self {
        Self {
            tile_id: Some(tile_id),
            ..Self::default()
        }
    }

    pub fn has_character(&self) -> bool {
        !self.character_name.is_empty()
    }

    pub fn tile_graphic(&self) -> Option<TileId> {
        self.tile_id.filter(|tile_id| tile_id.is_tile_graphic())
    }
}

#[derive(Debug, Clone)]
pub struct Mover {
    id: MoverId,
    coord: TileCoord,
    real_x: i32,
    real_y: i32,
    direction: Direction,
    pattern: u8,
    original_pattern: u8,
    anime_half_steps: u32,
    move_speed: u8,
    walk_anime: bool,
    through: bool,
    always_on_top: bool,
    graphic: CharacterGraphic,
    opacity: u8,
    blend_mode: BlendMode,
    transparent: bool,
    trigger: TriggerKind,
    jump_count: i32,
    jump_peak: i32,
    start_requested: bool,
    tracker: MoverTracker,
}

impl Mover {
    pub fn new(id: MoverId, coord: TileCoord) -> Self {
        Self {
            id,
            coord,
            real_x: real_units(coord.x),
            real_y: real_units(coord.y),
            direction: Direction::Down,
            pattern: 0,
            original_pattern: 0,
            anime_half_steps: 0,
            move_speed: DEFAULT_MOVE_SPEED,
            walk_anime: true,
            through: false,
            always_on_top: false,
            graphic: CharacterGraphic::default(),
            opacity: 255,
            blend_mode: BlendMode::Normal,
            transparent: false,
            trigger: TriggerKind::ActionButton,
            jump_count: 0,
            jump_peak: 0,
            start_requested: false,
            tracker: MoverTracker::new(coord),
        }
    }

    pub fn with_graphic(mut self, graphic: CharacterGraphic) -> Self {
        self.graphic = graphic;
        self
    }

    pub fn with_through(mut self, through: bool) -> Self {
        self.through = through;
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerKind) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_always_on_top(mut self, always_on_top: bool) -> Self {
        self.always_on_top = always_on_top;
        self
    }

    pub fn with_move_speed(mut self, move_speed: u8) -> Self {
        self.move_speed = move_speed.clamp(1, MAX_MOVE_SPEED);
        self
    }

    pub fn with_pattern(mut self, pattern: u8) -> Self {
        self.pattern = pattern % 4;
        self.original_pattern = self.pattern;
        self
    }

    pub fn id(&self) -> MoverId {
        self.id
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn real_position(&self) -> (i32, i32) {
        (self.real_x, self.real_y)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pattern(&self) -> u8 {
        self.pattern
    }

    pub fn move_speed(&self) -> u8 {
        self.move_speed
    }

    pub fn through(&self) -> bool {
        self.through
    }

    pub fn always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn graphic(&self) -> &CharacterGraphic {
        &self.graphic
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn tracker(&self) -> &MoverTracker {
        &self.tracker
    }

    pub fn changed_tile(&self) -> bool {
        self.tracker.changed_tile()
    }

    pub fn jumping(&self) -> bool {
        self.jump_count > 0
    }

    pub fn moving(&self) -> bool {
        self.real_x != real_units(self.coord.x) || self.real_y != real_units(self.coord.y)
    }

    pub fn start_requested(&self) -> bool {
        self.start_requested
    }

    pub fn set_graphic(&mut self, graphic: CharacterGraphic) {
        self.graphic = graphic;
    }

    pub fn set_through(&mut self, through: bool) {
        self.through = through;
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn set_always_on_top(&mut self, always_on_top: bool) {
        self.always_on_top = always_on_top;
    }

    pub fn set_trigger(&mut self, trigger: TriggerKind) {
        self.trigger = trigger;
    }

    pub fn turn(&mut self, direction: Direction) {
        if direction != Direction::None {
            self.direction = direction;
        }
    }

    pub fn moveto(&mut self, coord: TileCoord) {
        self.coord = coord;
        self.real_x = real_units(coord.x);
        self.real_y = real_units(coord.y);
        self.jump_count = 0;
    }

    /// Advances the tile coordinate; the real position catches up in
    /// `update`. Passability is checked by the caller.
    pub(crate) fn begin_step(&mut self, direction: Direction) {
        self.coord = self.coord.step(direction);
    }

    pub(crate) fn begin_jump(&mut self, dx: i32, dy: i32) {
        self.pattern = 0;
        self.original_pattern = 0;
        self.coord = self.coord.offset(dx, dy);
        let distance = f64::from(dx).hypot(f64::from(dy)).round() as i32;
        self.jump_peak = distance
            .saturating_add(10)
            .saturating_sub(i32::from(self.move_speed))
            .max(1);
        self.jump_count = self.jump_peak.saturating_mul(2);
    }

    /// Fires the occupant's action; the interpreter drains the request.
    pub fn start(&mut self) {
        self.start_requested = true;
    }

    pub fn take_start_request(&mut self) -> bool {
        std::mem::take(&mut self.start_requested)
    }

    /// Per-frame motion and walk animation.
    pub fn update(&mut self) {
        if self.jumping() {
            self.update_jump();
        } else if self.moving() {
            self.update_move();
        } else if self.pattern != self.original_pattern {
            self.anime_half_steps += 3;
        }

        if self.anime_half_steps > 2 * (18 - u32::from(self.move_speed) * 2) {
            self.pattern = if self.moving() || self.jumping() {
                (self.pattern + 1) % 4
            } else {
                self.original_pattern
            };
            self.anime_half_steps = 0;
        }
    }

    pub(crate) fn observe_tile(&mut self) -> Option<TileMove> {
        self.tracker.observe(self.coord)
    }

    pub(crate) fn reset_tracker(&mut self) {
        self.tracker.reset(self.coord);
    }

    fn update_jump(&mut self) {
        self.jump_count -= 1;
        let target_x = real_units(self.coord.x);
        let target_y = real_units(self.coord.y);
        self.real_x = (self.real_x * self.jump_count + target_x) / (self.jump_count + 1);
        self.real_y = (self.real_y * self.jump_count + target_y) / (self.jump_count + 1);
    }

    fn update_move(&mut self) {
        let distance = 1i32 << self.move_speed;
        let target_x = real_units(self.coord.x);
        let target_y = real_units(self.coord.y);
        self.real_x = approach(self.real_x, target_x, distance);
        self.real_y = approach(self.real_y, target_y, distance);
        if self.walk_anime {
            self.anime_half_steps += 3;
        }
    }

    pub fn screen_x(&self, map: &GameMap) -> i32 {
        (self.real_x - map.display().0 + 3) / 4 + TILE_SIZE_PX / 2
    }

    pub fn screen_y(&self, map: &GameMap) -> i32 {
        let y = (self.real_y - map.display().1 + 3) / 4 + TILE_SIZE_PX;
        let n = (self.jump_count - self.jump_peak).abs();
        y - (self.jump_peak * self.jump_peak - n * n) / 2
    }

    pub fn screen_z(&self, map: &GameMap, height: i32) -> i32 {
        if self.always_on_top {
            return ALWAYS_ON_TOP_Z;
        }
        let z = (self.real_y - map.display().1 + 3) / 4 + TILE_SIZE_PX;
        match self.graphic.tile_graphic() {
            Some(tile_id) => {
                let priority = map.tileset().priority(tile_id).unwrap_or(0);
                z + i32::from(priority) * TILE_SIZE_PX
            }
            None if height > TILE_SIZE_PX => z + 31,
            None => z,
        }
    }

    pub fn bush_depth(&self, map: &GameMap) -> u8 {
        if self.graphic.tile_graphic().is_some() || self.always_on_top {
            return 0;
        }
        if !self.jumping() && map.is_bush(self.coord) {
            BUSH_DEPTH_PX
        } else {
            0
        }
    }
}

fn real_units(tile: i32) -> i32 {
    tile.saturating_mul(REAL_UNITS_PER_TILE)
}

fn approach(current: i32, target: i32, distance: i32) -> i32 {
    if current < target {
        (current + distance).min(target)
    } else {
        (current - distance).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_tile_first_and_real_position_over_frames() {
        let mut mover = Mover::new(MoverId(1), TileCoord::new(2, 2));
        mover.begin_step(Direction::Right);
        assert_eq!(mover.coord(), TileCoord::new(3, 2));
        assert!(mover.moving());

        let mut frames = 0;
        while mover.moving() {
            mover.update();
            frames += 1;
            assert!(frames <= 8, "speed 4 covers a tile in 8 frames");
        }
        assert_eq!(frames, 8);
        assert_eq!(mover.real_position(), (384, 256));
    }

    #[test]
    fn walking_cycles_pattern_and_resets_when_stopped() {
        let mut mover = Mover::new(MoverId(1), TileCoord::new(0, 0)).with_move_speed(6);
        for _ in 0..4 {
            mover.begin_step(Direction::Down);
            while mover.moving() {
                mover.update();
            }
        }
        let mut settle = 0;
        while mover.pattern() != 0 {
            mover.update();
            settle += 1;
            assert!(settle < 32);
        }
        assert_eq!(mover.coord(), TileCoord::new(0, 4));
    }

    #[test]
    fn jump_lands_after_counter_runs_out() {
        let mut mover = Mover::new(MoverId(1), TileCoord::new(1, 1));
        mover.begin_jump(2, 0);
        assert!(mover.jumping());
        assert_eq!(mover.coord(), TileCoord::new(3, 1));
        let mut frames = 0;
        while mover.jumping() {
            mover.update();
            frames += 1;
        }
        assert_eq!(frames, 16);
        assert_eq!(mover.real_position(), (384, 128));
        assert!(!mover.moving());
    }

    #[test]
    fn start_request_is_drained_once() {
        let mut mover = Mover::new(MoverId(3), TileCoord::new(0, 0));
        mover.start();
        assert!(mover.start_requested());
        assert!(mover.take_start_request());
        assert!(!mover.take_start_request());
    }

    #[test]
    fn graphic_kinds() {
        assert!(!CharacterGraphic::default().has_character());
        assert_eq!(CharacterGraphic::default().tile_graphic(), None);
        assert_eq!(
            CharacterGraphic::tile(TileId(400)).tile_graphic(),
            Some(TileId(400))
        );
        assert!(CharacterGraphic::character("hero").has_character());
    }
}
