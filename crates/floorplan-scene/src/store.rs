use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::item::Scene;

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "scene store I/O failed: {err}"),
            StoreError::Serde(err) => write!(f, "scene document is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Durable home of the scene document: one JSON array at a well-known path,
/// fully overwritten on every save.
#[derive(Debug, Clone)]
pub struct SceneStore {
    path: PathBuf,
}

impl SceneStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Scene, StoreError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Loads the document, treating a missing file as an empty scene so a
    /// fresh install starts clean.
    pub fn load_or_default(&self) -> Result<Scene, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Scene::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the scene as pretty-printed JSON so saved layouts stay
    /// readable in diffs and editors.
    pub fn save(&self, scene: &Scene) -> Result<(), StoreError> {
        let document = serde_json::to_string_pretty(scene)?;
        fs::write(&self.path, document)?;
        Ok(())
    }
}
