mod sheets;
mod snapshot;
mod sync;

pub use sheets::{character_frame, tile_frame, CharacterSheets, SheetSizes, SHEET_FRAMES_PER_SIDE};
pub use snapshot::{FrameSize, SourceRect, SpriteBitmap, SpriteDelta, VisualSnapshot};
pub use sync::{
    SpriteSyncEngine, SpriteUpdate, SyncConfig, SyncFrame, SyncStats, Viewport,
    DEFAULT_CULL_MARGIN_PX, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};
