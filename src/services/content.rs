//! Static JSON documents served as-is from the content directory.

use std::path::PathBuf;

use serde_json::Value;

pub const PROJECTS_FILE: &str = "projects.json";
pub const DATACAMP_PROJECTS_FILE: &str = "datacamp-projects.json";

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ContentLibrary {
    dir: PathBuf,
}

impl ContentLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads and parses one document. The file is read on every call so
    /// edits show up without a restart.
    pub async fn load(&self, name: &str) -> Result<Value, ContentError> {
        let path = self.dir.join(name);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ContentError::Read {
                path: path.clone(),
                source,
            })?;

        serde_json::from_str(&raw).map_err(|source| ContentError::Parse { path, source })
    }
}
