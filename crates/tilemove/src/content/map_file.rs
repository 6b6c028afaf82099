use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ContentErrorCode, ContentLoadError};
use crate::map::{MapData, MapDataError, TileId};

/// On-disk map layout: row-major tile ids per layer, ground layer first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapFile {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Vec<TileId>>,
}

impl MapFile {
    pub fn into_map_data(self) -> Result<MapData, MapDataError> {
        MapData::new(self.width, self.height, self.layers)
    }
}

pub fn load_map_json(path: &Path) -> Result<MapData, ContentLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentLoadError::read(path, source))?;
    let data = parse_map_json(path, &raw)?;
    info!(
        path = %path.display(),
        width = data.width(),
        height = data.height(),
        "map_file_loaded"
    );
    Ok(data)
}

pub fn parse_map_json(file_path: &Path, raw: &str) -> Result<MapData, ContentLoadError> {
    let file: MapFile = serde_json::from_str(raw).map_err(|error| {
        ContentLoadError::new(
            ContentErrorCode::JsonMalformed,
            format!("malformed map JSON: {error}"),
            file_path,
        )
        .at(error.line(), error.column())
    })?;
    file.into_map_data().map_err(|error| {
        ContentLoadError::new(ContentErrorCode::InvalidMap, error.to_string(), file_path)
    })
}
