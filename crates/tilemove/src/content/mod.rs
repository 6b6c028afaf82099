mod error;
mod map_file;
mod tileset_xml;

pub use error::{ContentErrorCode, ContentLoadError, SourceLocation};
pub use map_file::{load_map_json, parse_map_json, MapFile};
pub use tileset_xml::{load_tileset_xml, parse_tileset_xml};
