use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Port for locating the project a manuscript belongs to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRootPort: Send + Sync {
    /// Walk upward from `start` to the nearest project root, if any
    async fn find_project_root(&self, start: &Path) -> Option<PathBuf>;
}
