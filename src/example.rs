//! Suite discovery: collections of example files on disk.
//!
//! Layout: `<suite_root>/<collection>/<name>.in.<ext>`, where the
//! collection directory name selects the scanner from the registry.

use std::path::{Path, PathBuf};

use crate::error::HarnessError;

/// One example source file, immutable once discovered.
#[derive(Debug, Clone)]
pub struct Example {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub extension: String,
}

/// A directory of examples sharing one scanner.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    pub dir: PathBuf,
}

pub fn discover_collections(root: &Path) -> Result<Vec<Collection>, HarnessError> {
    let entries = std::fs::read_dir(root).map_err(|e| HarnessError::artifact_io(root, e))?;
    let mut collections = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HarnessError::artifact_io(root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        collections.push(Collection { name: name.to_string(), dir: path });
    }
    collections.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(collections)
}

/// Examples named `*.in.<extension>` in `dir`, sorted by name.
pub fn discover_examples(dir: &Path, extension: &str) -> Result<Vec<Example>, HarnessError> {
    let suffix = format!(".in.{extension}");
    let entries = std::fs::read_dir(dir).map_err(|e| HarnessError::artifact_io(dir, e))?;
    let mut examples = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HarnessError::artifact_io(dir, e))?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(name) = file_name.strip_suffix(&suffix) else {
            continue;
        };
        if name.is_empty() || !path.is_file() {
            continue;
        }
        let size = entry
            .metadata()
            .map_err(|e| HarnessError::artifact_io(&path, e))?
            .len();
        examples.push(Example {
            name: name.to_string(),
            path,
            size,
            extension: extension.to_string(),
        });
    }
    examples.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(examples)
}
