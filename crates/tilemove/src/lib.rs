pub mod content;
pub mod map;
pub mod options;
pub mod rules;
pub mod session;
pub mod sprites;
pub mod world;

pub use content::{
    load_map_json, load_tileset_xml, parse_map_json, parse_tileset_xml, ContentErrorCode,
    ContentLoadError, MapFile, SourceLocation,
};
pub use map::{
    Direction, GameMap, GridSize, IndexViolation, MapData, MapDataError, PassageTable,
    TerrainFlags, TileCoord, TileEntry, TileId, TileIndex, TilesetError, TilesetTable,
};
pub use options::AntilagOptions;
pub use rules::{
    mover_passable, ActivationRule, FlatResolver, LayeredResolver, PassabilityResolver,
    TriggerDispatcher, TOUCH_TRIGGERS,
};
pub use session::{MapSession, SessionError};
pub use sprites::{
    CharacterSheets, SheetSizes, SpriteDelta, SpriteSyncEngine, SpriteUpdate, SyncConfig,
    SyncFrame, SyncStats, Viewport, VisualSnapshot,
};
pub use world::{
    BlendMode, CharacterGraphic, Mover, MoverId, MoverRegistry, MoverTracker, Occupant,
    RegistryError, TileMove, TriggerKind, WorldView,
};
