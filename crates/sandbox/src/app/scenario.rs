use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tilemove::{
    load_map_json, load_tileset_xml, AntilagOptions, CharacterGraphic, ContentLoadError,
    Direction, GameMap, MapDataError, MapFile, MapSession, Mover, MoverId, SessionError,
    SheetSizes, SyncConfig, TileCoord, TileEntry, TilesetTable, TriggerKind,
};
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    #[error("read scenario '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("parse scenario json at {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Content(#[from] ContentLoadError),
    #[error("invalid inline map: {0}")]
    Map(#[from] MapDataError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Scenario file: a map, its tileset, the movers on it, and a frame script.
/// Relative content paths resolve against the scenario file's directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) map: MapSource,
    pub(crate) tileset: TilesetSource,
    pub(crate) player: MoverSpec,
    #[serde(default)]
    pub(crate) movers: Vec<MoverSpec>,
    #[serde(default)]
    pub(crate) sheets: SheetSizes,
    #[serde(default)]
    pub(crate) sync: SyncConfig,
    #[serde(default)]
    pub(crate) frames: Vec<FrameScript>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum MapSource {
    File(PathBuf),
    Inline(MapFile),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TilesetSource {
    File(PathBuf),
    Inline(Vec<TileSpec>),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TileSpec {
    #[serde(default)]
    pub(crate) passage: u8,
    #[serde(default)]
    pub(crate) priority: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MoverSpec {
    pub(crate) id: MoverId,
    pub(crate) x: i32,
    pub(crate) y: i32,
    #[serde(default)]
    pub(crate) direction: Direction,
    #[serde(default)]
    pub(crate) graphic: CharacterGraphic,
    #[serde(default)]
    pub(crate) through: bool,
    #[serde(default)]
    pub(crate) always_on_top: bool,
    #[serde(default)]
    pub(crate) trigger: TriggerKind,
    #[serde(default)]
    pub(crate) move_speed: Option<u8>,
}

impl MoverSpec {
    fn to_mover(&self) -> Mover {
        let mover = Mover::new(self.id, TileCoord::new(self.x, self.y))
            .with_direction(self.direction)
            .with_graphic(self.graphic.clone())
            .with_through(self.through)
            .with_always_on_top(self.always_on_top)
            .with_trigger(self.trigger);
        match self.move_speed {
            Some(speed) => mover.with_move_speed(speed),
            None => mover,
        }
    }
}

/// Actions queue once; the frame then runs `repeat` times.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FrameScript {
    #[serde(default)]
    pub(crate) actions: Vec<ScriptAction>,
    #[serde(default = "default_repeat")]
    pub(crate) repeat: u32,
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum ScriptAction {
    Move { mover: MoverId, direction: Direction },
    Jump { mover: MoverId, dx: i32, dy: i32 },
    Turn { mover: MoverId, direction: Direction },
    Moveto { mover: MoverId, x: i32, y: i32 },
    /// Player presses the action button toward the faced tile.
    ActionButton,
    Interpreter { running: bool },
    Display { x: i32, y: i32 },
}

impl ScriptAction {
    /// The mover that must be standing still before this action runs.
    pub(crate) fn waits_for(&self, player: MoverId) -> Option<MoverId> {
        match self {
            Self::Move { mover, .. } | Self::Jump { mover, .. } => Some(*mover),
            Self::ActionButton => Some(player),
            _ => None,
        }
    }
}

pub(crate) struct LoadedScenario {
    pub(crate) session: MapSession,
    pub(crate) sheets: SheetSizes,
    pub(crate) frames: Vec<FrameScript>,
}

pub(crate) fn load_scenario(
    path: &Path,
    options: AntilagOptions,
) -> Result<LoadedScenario, ScenarioError> {
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let scenario = parse_scenario(&raw)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let loaded = scenario.into_loaded(base_dir, options)?;
    info!(
        path = %path.display(),
        movers = loaded.session.movers().mover_count(),
        frames = loaded.frames.len(),
        "scenario_loaded"
    );
    Ok(loaded)
}

pub(crate) fn parse_scenario(raw: &str) -> Result<Scenario, ScenarioError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, Scenario>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        ScenarioError::Json {
            path,
            source: error.into_inner(),
        }
    })
}

impl Scenario {
    pub(crate) fn into_loaded(
        self,
        base_dir: &Path,
        options: AntilagOptions,
    ) -> Result<LoadedScenario, ScenarioError> {
        let data = match self.map {
            MapSource::File(path) => load_map_json(&base_dir.join(path))?,
            MapSource::Inline(file) => file.into_map_data()?,
        };
        let tileset = match self.tileset {
            TilesetSource::File(path) => load_tileset_xml(&base_dir.join(path))?,
            TilesetSource::Inline(tiles) => TilesetTable::from_entries(
                tiles
                    .iter()
                    .map(|tile| TileEntry::new(tile.passage, tile.priority)),
            ),
        };

        let map = GameMap::setup(data, tileset, options);
        let mut session = MapSession::new(map, self.player.to_mover(), self.sync)?;
        for spec in &self.movers {
            session.add_mover(spec.to_mover())?;
        }

        Ok(LoadedScenario {
            session,
            sheets: self.sheets,
            frames: self.frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn inline_scenario() -> serde_json::Value {
        json!({
            "map": {
                "width": 3,
                "height": 2,
                "layers": [[1, 1, 1, 1, 1, 2], [0, 0, 0, 0, 0, 0], [0, 0, 0, 0, 0, 0]]
            },
            "tileset": [
                { "priority": 5 },
                { "passage": 0, "priority": 0 },
                { "passage": 15, "priority": 0 }
            ],
            "player": { "id": 0, "x": 0, "y": 0, "graphic": { "character_name": "hero" } },
            "movers": [
                { "id": 7, "x": 2, "y": 0, "trigger": "player_touch", "through": true }
            ],
            "sheets": { "hero": { "width": 128, "height": 192 } },
            "frames": [
                { "actions": [{ "action": "move", "mover": 0, "direction": "right" }] },
                { "repeat": 4 }
            ]
        })
    }

    fn json_error_path(value: serde_json::Value) -> String {
        match parse_scenario(&value.to_string()) {
            Err(ScenarioError::Json { path, .. }) => path,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("scenario should not parse"),
        }
    }

    #[test]
    fn malformed_fields_report_their_path() {
        let mut value = inline_scenario();
        value["player"]["x"] = json!("left");
        assert_eq!(json_error_path(value), "player.x");

        let mut value = inline_scenario();
        value["frames"][1]["repeat"] = json!(-2);
        assert_eq!(json_error_path(value), "frames[1].repeat");

        let mut value = inline_scenario();
        value["tileset"][2]["passage"] = json!("0x0f");
        assert_eq!(json_error_path(value), "tileset");
    }

    #[test]
    fn inline_scenario_builds_session() {
        let scenario = parse_scenario(&inline_scenario().to_string()).expect("parse");
        assert_eq!(scenario.frames.len(), 2);
        assert_eq!(scenario.frames[0].repeat, 1);
        assert_eq!(scenario.frames[1].repeat, 4);
        assert_eq!(
            scenario.frames[0].actions,
            vec![ScriptAction::Move {
                mover: MoverId(0),
                direction: Direction::Right,
            }]
        );

        let loaded = scenario
            .into_loaded(Path::new("."), AntilagOptions::default())
            .expect("session");
        assert_eq!(loaded.session.movers().mover_count(), 2);
        assert_eq!(loaded.session.player().coord(), TileCoord::new(0, 0));
        assert!(!loaded
            .session
            .query_passable(TileCoord::new(2, 1), Direction::Left, None));
        assert_eq!(loaded.sheets.len(), 1);
    }

    #[test]
    fn file_backed_content_resolves_next_to_scenario() {
        let temp = TempDir::new().expect("temp");
        fs::write(
            temp.path().join("tiles.xml"),
            r#"<Tileset><Tile id="0" priority="5"/><Tile id="1"/></Tileset>"#,
        )
        .expect("write tileset");
        let map = json!({
            "width": 2,
            "height": 2,
            "layers": [[1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]
        });
        fs::write(temp.path().join("room.json"), map.to_string()).expect("write map");
        let path = temp.path().join("scenario.json");
        let scenario = json!({
            "map": "room.json",
            "tileset": "tiles.xml",
            "player": { "id": 0, "x": 1, "y": 1 }
        });
        fs::write(&path, scenario.to_string()).expect("write scenario");

        let loaded = load_scenario(&path, AntilagOptions::all(false)).expect("load");
        assert_eq!(loaded.session.map().width(), 2);
        assert!(loaded.frames.is_empty());
        assert!(loaded.sheets.is_empty());
    }

    #[test]
    fn missing_content_and_bad_movers_surface_errors() {
        let temp = TempDir::new().expect("temp");
        assert!(matches!(
            load_scenario(&temp.path().join("nope.json"), AntilagOptions::default()),
            Err(ScenarioError::Read { .. })
        ));

        let path = temp.path().join("scenario.json");
        let scenario = json!({
            "map": "absent.json",
            "tileset": [],
            "player": { "id": 0, "x": 0, "y": 0 }
        });
        fs::write(&path, scenario.to_string()).expect("write");
        assert!(matches!(
            load_scenario(&path, AntilagOptions::default()),
            Err(ScenarioError::Content(_))
        ));

        let mut value = inline_scenario();
        value["movers"][0]["x"] = json!(9);
        let scenario = parse_scenario(&value.to_string()).expect("parse");
        assert!(matches!(
            scenario.into_loaded(Path::new("."), AntilagOptions::default()),
            Err(ScenarioError::Session(SessionError::OutOfBounds { .. }))
        ));

        let mut value = inline_scenario();
        value["map"]["layers"] = json!([[1, 1, 1]]);
        let scenario = parse_scenario(&value.to_string()).expect("parse");
        assert!(matches!(
            scenario.into_loaded(Path::new("."), AntilagOptions::default()),
            Err(ScenarioError::Map(_))
        ));
    }
}
