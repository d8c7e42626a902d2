//! Module emitter port - Writes generated chapter modules

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::dto::ChapterMeta;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The target exists but its marker regions cannot be located unambiguously
    #[error("Cannot update {path}: {reason}")]
    UpdateNotSupported { path: PathBuf, reason: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            EmitError::UpdateNotSupported { .. } => "update_not_supported",
            EmitError::Io { .. } => "io_error",
        }
    }
}

/// What `update_or_emit` did to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Port for writing chapter modules
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleEmitterPort: Send + Sync {
    /// Render and write a fresh module, replacing any existing file
    async fn emit(&self, meta: &ChapterMeta, output_path: &Path) -> Result<(), EmitError>;

    /// Rewrite only the marked regions of an existing module, or emit when absent
    async fn update_or_emit(
        &self,
        meta: &ChapterMeta,
        output_path: &Path,
    ) -> Result<EmitOutcome, EmitError>;

    /// Render the module that `emit` would write, without touching disk
    fn render(&self, meta: &ChapterMeta, output_path: &Path) -> String;
}
