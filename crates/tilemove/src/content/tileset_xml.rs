use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};
use tracing::info;

use super::error::{error_at_node, ContentErrorCode, ContentLoadError};
use crate::map::{TileEntry, TilesetTable};

const ATTRIBUTES: [&str; 3] = ["id", "passage", "priority"];

pub fn load_tileset_xml(path: &Path) -> Result<TilesetTable, ContentLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentLoadError::read(path, source))?;
    let tileset = parse_tileset_xml(path, &raw)?;
    info!(path = %path.display(), tiles = tileset.len(), "tileset_loaded");
    Ok(tileset)
}

/// Parses `<Tileset><Tile id=".." passage=".." priority=".."/></Tileset>`.
/// Ids must cover `0..n` without gaps; `passage` accepts decimal or `0x` hex.
pub fn parse_tileset_xml(file_path: &Path, raw: &str) -> Result<TilesetTable, ContentLoadError> {
    let doc = Document::parse(raw).map_err(|error| {
        ContentLoadError::new(
            ContentErrorCode::XmlMalformed,
            format!("malformed XML: {error}"),
            file_path,
        )
        .at(error.pos().row as usize, error.pos().col as usize)
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Tileset" {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <Tileset>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut entries = BTreeMap::<u16, TileEntry>::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "Tile" {
            return Err(error_at_node(
                ContentErrorCode::UnknownElement,
                format!("unsupported element <{}> in <Tileset>", child.tag_name().name()),
                file_path,
                &doc,
                child,
            ));
        }
        let (id, entry) = parse_tile(file_path, &doc, child)?;
        if entries.insert(id, entry).is_some() {
            return Err(error_at_node(
                ContentErrorCode::DuplicateTile,
                format!("duplicate tile id {id}"),
                file_path,
                &doc,
                child,
            ));
        }
    }

    for (expected, id) in (0u16..).zip(entries.keys()) {
        if expected != *id {
            return Err(ContentLoadError::new(
                ContentErrorCode::MissingTile,
                format!("tile ids must be contiguous from 0; id {expected} is missing"),
                file_path,
            ));
        }
    }

    Ok(TilesetTable::from_entries(entries.into_values()))
}

fn parse_tile(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<(u16, TileEntry), ContentLoadError> {
    for attribute in node.attributes() {
        if !ATTRIBUTES.contains(&attribute.name()) {
            return Err(error_at_node(
                ContentErrorCode::UnknownAttribute,
                format!("unknown attribute '{}' on <Tile>", attribute.name()),
                file_path,
                doc,
                node,
            ));
        }
    }

    let id = required_attribute(file_path, doc, node, "id")?;
    let id = id.parse::<u16>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("tile id '{id}' is not a valid number"),
            file_path,
            doc,
            node,
        )
    })?;

    let passage = match node.attribute("passage") {
        Some(value) => parse_byte(value).ok_or_else(|| {
            error_at_node(
                ContentErrorCode::InvalidValue,
                format!("passage '{value}' is not a valid byte"),
                file_path,
                doc,
                node,
            )
        })?,
        None => 0,
    };

    let priority = match node.attribute("priority") {
        Some(value) => value.trim().parse::<u8>().map_err(|_| {
            error_at_node(
                ContentErrorCode::InvalidValue,
                format!("priority '{value}' is not a valid number"),
                file_path,
                doc,
                node,
            )
        })?,
        None => 0,
    };

    Ok((id, TileEntry::new(passage, priority)))
}

fn required_attribute<'a>(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'a, '_>,
    name: &str,
) -> Result<&'a str, ContentLoadError> {
    node.attribute(name).ok_or_else(|| {
        error_at_node(
            ContentErrorCode::MissingAttribute,
            format!("missing required attribute '{name}' on <Tile>"),
            file_path,
            doc,
            node,
        )
    })
}

fn parse_byte(value: &str) -> Option<u8> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => value.parse::<u8>().ok(),
    }
}
