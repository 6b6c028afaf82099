use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::sheets::{character_frame, tile_frame, CharacterSheets};
use super::snapshot::{FrameSize, SourceRect, SpriteBitmap, SpriteDelta, VisualSnapshot};
use crate::map::GameMap;
use crate::world::{Mover, MoverId, MoverRegistry};

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 640;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 480;
pub const DEFAULT_CULL_MARGIN_PX: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub viewport: Viewport,
    pub cull_margin: i32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            cull_margin: DEFAULT_CULL_MARGIN_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteUpdate {
    pub id: MoverId,
    pub delta: SpriteDelta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub synced: usize,
    pub clean: usize,
    pub culled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncFrame {
    pub updates: Vec<SpriteUpdate>,
    pub stats: SyncStats,
}

#[derive(Debug, Clone, Default)]
struct SpriteState {
    snapshot: VisualSnapshot,
    fresh: bool,
}

enum SyncOutcome {
    Culled,
    Clean,
    Synced(SpriteDelta),
}

/// Keeps one visual snapshot per tracked mover and turns live mover state
/// into per-attribute deltas for the renderer.
#[derive(Debug, Clone, Default)]
pub struct SpriteSyncEngine {
    config: SyncConfig,
    sprites: BTreeMap<MoverId, SpriteState>,
}

impl SpriteSyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            sprites: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> SyncConfig {
        self.config
    }

    /// Starts tracking a mover; its first sync pushes every attribute.
    pub fn track(&mut self, id: MoverId) {
        self.sprites.insert(
            id,
            SpriteState {
                snapshot: VisualSnapshot::default(),
                fresh: true,
            },
        );
    }

    pub fn forget(&mut self, id: MoverId) -> bool {
        self.sprites.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn tracked_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn snapshot(&self, id: MoverId) -> Option<&VisualSnapshot> {
        self.sprites.get(&id).map(|state| &state.snapshot)
    }

    pub fn sync_frame(
        &mut self,
        map: &GameMap,
        movers: &MoverRegistry,
        sheets: &dyn CharacterSheets,
    ) -> SyncFrame {
        let incremental = map.options().incremental_sprites;
        let mut frame = SyncFrame::default();
        for mover in movers.iter() {
            let Some(state) = self.sprites.get_mut(&mover.id()) else {
                continue;
            };
            let outcome = if incremental && !state.fresh {
                self.config.sync_incremental(&mut state.snapshot, mover, map, sheets)
            } else {
                SyncOutcome::Synced(sync_full(&mut state.snapshot, mover, map, sheets))
            };
            state.fresh = false;
            match outcome {
                SyncOutcome::Culled => {
                    trace!(mover = mover.id().0, "sprite_culled");
                    frame.stats.culled += 1;
                }
                SyncOutcome::Clean => frame.stats.clean += 1,
                SyncOutcome::Synced(delta) => {
                    frame.stats.synced += 1;
                    if !delta.is_empty() {
                        frame.updates.push(SpriteUpdate {
                            id: mover.id(),
                            delta,
                        });
                    }
                }
            }
        }
        debug!(
            synced = frame.stats.synced,
            clean = frame.stats.clean,
            culled = frame.stats.culled,
            updates = frame.updates.len(),
            "sprite_sync_frame"
        );
        frame
    }
}

impl SyncConfig {
    /// Bounds test against the synced frame size. Sprites without a bitmap
    /// are never culled.
    pub fn on_screen(&self, snapshot: &VisualSnapshot, mover: &Mover, map: &GameMap) -> bool {
        let Some(frame) = snapshot.frame() else {
            return true;
        };
        let margin = self.cull_margin;
        let width = self.viewport.width as i32;
        let height = self.viewport.height as i32;
        let x = mover.screen_x(map);
        let y = mover.screen_y(map);
        y >= -margin
            && y < height + frame.height + margin
            && x >= -frame.width / 2 - margin
            && x < width + frame.width / 2 + margin
    }

    fn sync_incremental(
        &self,
        snapshot: &mut VisualSnapshot,
        mover: &Mover,
        map: &GameMap,
        sheets: &dyn CharacterSheets,
    ) -> SyncOutcome {
        if map.options().cull_offscreen && !self.on_screen(snapshot, mover, map) {
            return SyncOutcome::Culled;
        }
        if !needs_update(snapshot, mover, map) {
            return SyncOutcome::Clean;
        }

        let mut delta = SpriteDelta::default();
        if graphic_changed(snapshot, mover) {
            let bitmap = resolve_bitmap(mover, sheets);
            snapshot.bitmap = Some(bitmap.clone());
            delta.bitmap = Some(bitmap);
        }
        let rect = source_rect(mover, snapshot.frame());
        if rect != snapshot.source_rect {
            snapshot.source_rect = rect;
            delta.source_rect = rect;
        }

        let x = mover.screen_x(map);
        if x != snapshot.x {
            snapshot.x = x;
            delta.x = Some(x);
        }
        let y = mover.screen_y(map);
        if y != snapshot.y {
            snapshot.y = y;
            delta.y = Some(y);
        }
        if snapshot.frame().is_some() {
            let z = mover.screen_z(map, frame_height(snapshot));
            if z != snapshot.z {
                snapshot.z = z;
                delta.z = Some(z);
            }
        }

        if mover.opacity() != snapshot.opacity {
            snapshot.opacity = mover.opacity();
            delta.opacity = Some(snapshot.opacity);
        }
        if mover.blend_mode() != snapshot.blend_mode {
            snapshot.blend_mode = mover.blend_mode();
            delta.blend_mode = Some(snapshot.blend_mode);
        }
        if bush_depth_changed(snapshot, mover, map) {
            snapshot.bush_depth = mover.bush_depth(map);
            delta.bush_depth = Some(snapshot.bush_depth);
        }
        let visible = !mover.transparent();
        if visible != snapshot.visible {
            snapshot.visible = visible;
            delta.visible = Some(visible);
        }
        SyncOutcome::Synced(delta)
    }
}

fn sync_full(
    snapshot: &mut VisualSnapshot,
    mover: &Mover,
    map: &GameMap,
    sheets: &dyn CharacterSheets,
) -> SpriteDelta {
    let bitmap = if graphic_changed(snapshot, mover) {
        resolve_bitmap(mover, sheets)
    } else {
        snapshot.bitmap.clone().unwrap_or_else(|| resolve_bitmap(mover, sheets))
    };
    let frame = bitmap.frame;
    *snapshot = VisualSnapshot {
        bitmap: Some(bitmap),
        source_rect: source_rect(mover, frame),
        x: mover.screen_x(map),
        y: mover.screen_y(map),
        z: mover.screen_z(map, frame.map_or(0, |frame| frame.height)),
        opacity: mover.opacity(),
        blend_mode: mover.blend_mode(),
        visible: !mover.transparent(),
        bush_depth: mover.bush_depth(map),
    };
    SpriteDelta {
        bitmap: snapshot.bitmap.clone(),
        source_rect: snapshot.source_rect,
        x: Some(snapshot.x),
        y: Some(snapshot.y),
        z: Some(snapshot.z),
        opacity: Some(snapshot.opacity),
        blend_mode: Some(snapshot.blend_mode),
        visible: Some(snapshot.visible),
        bush_depth: Some(snapshot.bush_depth),
    }
}

// Depth only tracks movers that have a bitmap to draw.
fn needs_update(snapshot: &VisualSnapshot, mover: &Mover, map: &GameMap) -> bool {
    let depth_changed = snapshot.frame().is_some()
        && mover.screen_z(map, frame_height(snapshot)) != snapshot.z;
    graphic_changed(snapshot, mover)
        || frame_changed(snapshot, mover)
        || mover.screen_x(map) != snapshot.x
        || mover.screen_y(map) != snapshot.y
        || depth_changed
        || mover.transparent() == snapshot.visible
        || mover.opacity() != snapshot.opacity
        || mover.blend_mode() != snapshot.blend_mode
        || bush_depth_changed(snapshot, mover, map)
}

fn graphic_changed(snapshot: &VisualSnapshot, mover: &Mover) -> bool {
    snapshot.graphic() != Some(mover.graphic())
}

fn frame_changed(snapshot: &VisualSnapshot, mover: &Mover) -> bool {
    if mover.graphic().tile_graphic().is_some() || snapshot.frame().is_none() {
        return false;
    }
    source_rect(mover, snapshot.frame()) != snapshot.source_rect
}

/// Without flat bush lookup the depth is resynced every frame. With it,
/// only a tile change onto or off a bush counts.
fn bush_depth_changed(snapshot: &VisualSnapshot, mover: &Mover, map: &GameMap) -> bool {
    if !map.options().flat_bushes {
        return true;
    }
    if !map.has_any_bush() || !mover.changed_tile() {
        return false;
    }
    let on_bush = map.is_bush(mover.coord());
    (on_bush && snapshot.bush_depth == 0) || (!on_bush && snapshot.bush_depth > 0)
}

fn resolve_bitmap(mover: &Mover, sheets: &dyn CharacterSheets) -> SpriteBitmap {
    let graphic = mover.graphic().clone();
    let frame = if graphic.tile_graphic().is_some() {
        Some(tile_frame())
    } else if graphic.has_character() {
        let sheet = sheets.sheet_size(&graphic.character_name);
        if sheet.is_none() {
            debug!(
                mover = mover.id().0,
                character = %graphic.character_name,
                "character_sheet_missing"
            );
        }
        sheet.map(character_frame)
    } else {
        None
    };
    SpriteBitmap { graphic, frame }
}

fn source_rect(mover: &Mover, frame: Option<FrameSize>) -> Option<SourceRect> {
    let frame = frame?;
    if mover.graphic().tile_graphic().is_some() {
        return Some(SourceRect {
            x: 0,
            y: 0,
            width: frame.width,
            height: frame.height,
        });
    }
    Some(SourceRect {
        x: i32::from(mover.pattern()) * frame.width,
        y: mover.direction().sheet_row() * frame.height,
        width: frame.width,
        height: frame.height,
    })
}

fn frame_height(snapshot: &VisualSnapshot) -> i32 {
    snapshot.frame().map_or(0, |frame| frame.height)
}
