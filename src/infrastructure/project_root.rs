//! Project root discovery
//!
//! A directory is a project root when it holds a `.storyteller` marker or
//! either of the configured entity directories.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::outbound::ProjectRootPort;
use crate::infrastructure::entity_registry::{DEFAULT_CHARACTERS_DIR, DEFAULT_SETTINGS_DIR};

pub const PROJECT_MARKER: &str = ".storyteller";

#[derive(Debug, Clone)]
pub struct FileProjectRootResolver {
    characters_dir: PathBuf,
    settings_dir: PathBuf,
}

impl FileProjectRootResolver {
    pub fn new(characters_dir: impl Into<PathBuf>, settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            characters_dir: characters_dir.into(),
            settings_dir: settings_dir.into(),
        }
    }

    async fn is_project_root(&self, dir: &Path) -> bool {
        if exists(&dir.join(PROJECT_MARKER)).await {
            return true;
        }
        is_dir(&dir.join(&self.characters_dir)).await || is_dir(&dir.join(&self.settings_dir)).await
    }
}

impl Default for FileProjectRootResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CHARACTERS_DIR, DEFAULT_SETTINGS_DIR)
    }
}

#[async_trait]
impl ProjectRootPort for FileProjectRootResolver {
    async fn find_project_root(&self, start: &Path) -> Option<PathBuf> {
        for dir in start.ancestors() {
            if self.is_project_root(dir).await {
                debug!(root = %dir.display(), "Project root found");
                return Some(dir.to_path_buf());
            }
        }
        debug!(start = %start.display(), "No project root above start directory");
        None
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
