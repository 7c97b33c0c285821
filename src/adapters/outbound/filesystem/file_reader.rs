use crate::resolution::domain::{Component, Finding};
use crate::resolution::policies::SuppressionMap;
use crate::shared::security::{read_regular_file, MAX_FILE_SIZE};
use crate::shared::Result;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Inventory files are either a bare list or an object with `components`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ComponentDocument {
    List(Vec<Component>),
    Wrapped { components: Vec<Component> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FindingDocument {
    List(Vec<Finding>),
    Wrapped { findings: Vec<Finding> },
}

/// FileSystemReader adapter for reading scan inputs from the file system
///
/// Reads the component inventory, externally produced findings and the
/// suppression document. Every read goes through the symlink, file type and
/// size checks.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }

    /// Reads a component inventory written by an external collector.
    pub fn read_components(&self, path: &Path) -> Result<Vec<Component>> {
        let content = read_regular_file(path, "component list", MAX_FILE_SIZE)?;
        let document: ComponentDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse component list {}", path.display()))?;
        Ok(match document {
            ComponentDocument::List(components) => components,
            ComponentDocument::Wrapped { components } => components,
        })
    }

    /// Reads findings produced by an external analyzer.
    pub fn read_findings(&self, path: &Path) -> Result<Vec<Finding>> {
        let content = read_regular_file(path, "findings file", MAX_FILE_SIZE)?;
        let document: FindingDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse findings file {}", path.display()))?;
        Ok(match document {
            FindingDocument::List(findings) => findings,
            FindingDocument::Wrapped { findings } => findings,
        })
    }

    /// Reads and parses an OpenVEX suppression document.
    pub fn read_suppression_document(&self, path: &Path) -> Result<SuppressionMap> {
        let content = read_regular_file(path, "VEX document", MAX_FILE_SIZE)?;
        let map = SuppressionMap::from_openvex(&content)
            .with_context(|| format!("Invalid VEX document {}", path.display()))?;
        Ok(map)
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}
