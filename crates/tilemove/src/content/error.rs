use std::fmt;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    JsonMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownAttribute,
    MissingAttribute,
    InvalidValue,
    DuplicateTile,
    MissingTile,
    InvalidMap,
}

#[derive(Debug, Clone)]
pub struct ContentLoadError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl ContentLoadError {
    pub(crate) fn new(code: ContentErrorCode, message: String, file_path: &Path) -> Self {
        Self {
            code,
            message,
            file_path: file_path.to_path_buf(),
            location: None,
        }
    }

    pub(crate) fn at(mut self, line: usize, column: usize) -> Self {
        self.location = Some(SourceLocation { line, column });
        self
    }

    pub(crate) fn read(file_path: &Path, source: std::io::Error) -> Self {
        Self::new(
            ContentErrorCode::ReadFile,
            format!("failed to read content file: {source}"),
            file_path,
        )
    }
}

impl fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentLoadError {}

pub(crate) fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentLoadError {
    let pos = doc.text_pos_at(node.range().start);
    ContentLoadError::new(code, message, file_path).at(pos.row as usize, pos.col as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location_when_known() {
        let path = Path::new("data/tileset.xml");
        let err = ContentLoadError::new(
            ContentErrorCode::DuplicateTile,
            "duplicate tile id 3".to_string(),
            path,
        );
        assert_eq!(
            err.to_string(),
            "DuplicateTile: duplicate tile id 3 (file=data/tileset.xml)"
        );
        let err = err.at(4, 9);
        assert_eq!(
            err.to_string(),
            "DuplicateTile: duplicate tile id 3 (file=data/tileset.xml, line=4, column=9)"
        );
    }
}
