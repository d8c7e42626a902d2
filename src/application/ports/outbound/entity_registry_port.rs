//! Entity registry port - Source of the project's characters and settings
//!
//! The registry is an external collaborator: the detector only needs the
//! loaded entities (with their bindings merged in), not how they are found.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::entities::StoryEntity;

/// Failure loading a binding sidecar
///
/// A missing sidecar is not an error; a present but malformed one is.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("Failed to read binding file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid binding file {path}: {reason}")]
    Schema { path: PathBuf, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to scan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid entity definition {path}: {reason}")]
    InvalidEntity { path: PathBuf, reason: String },
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Port for loading every entity defined in a project
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRegistryPort: Send + Sync {
    /// Load all characters and settings under `project_root`
    ///
    /// A single malformed definition fails the whole load.
    async fn load_entities(&self, project_root: &Path) -> Result<Vec<StoryEntity>, RegistryError>;
}
