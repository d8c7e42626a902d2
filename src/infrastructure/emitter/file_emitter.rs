use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::ChapterMeta;
use crate::application::ports::outbound::{ClockPort, EmitError, EmitOutcome, ModuleEmitterPort};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::emitter::markers::splice_regions;
use crate::infrastructure::emitter::renderer::{render_module, render_region};

/// Writes chapter modules to the local filesystem
pub struct FileModuleEmitter {
    clock: Arc<dyn ClockPort>,
}

impl FileModuleEmitter {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self { clock }
    }
}

impl Default for FileModuleEmitter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl ModuleEmitterPort for FileModuleEmitter {
    #[instrument(skip(self, meta), fields(chapter = %meta.id, output = %output_path.display()))]
    async fn emit(&self, meta: &ChapterMeta, output_path: &Path) -> Result<(), EmitError> {
        let module = self.render(meta, output_path);
        write_module(output_path, &module).await?;
        info!(bytes = module.len(), "Chapter module emitted");
        Ok(())
    }

    #[instrument(skip(self, meta), fields(chapter = %meta.id, output = %output_path.display()))]
    async fn update_or_emit(
        &self,
        meta: &ChapterMeta,
        output_path: &Path,
    ) -> Result<EmitOutcome, EmitError> {
        let existing = match tokio::fs::read_to_string(output_path).await {
            Ok(existing) => existing,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No existing module; emitting a fresh one");
                self.emit(meta, output_path).await?;
                return Ok(EmitOutcome::Created);
            }
            Err(source) => {
                return Err(EmitError::Io {
                    path: output_path.to_path_buf(),
                    source,
                })
            }
        };

        let updated = splice_regions(&existing, |region| render_region(region, meta, output_path))
            .map_err(|reason| EmitError::UpdateNotSupported {
                path: output_path.to_path_buf(),
                reason,
            })?;

        if updated == existing {
            debug!("Marker regions already current");
            return Ok(EmitOutcome::Unchanged);
        }

        write_module(output_path, &updated).await?;
        info!("Chapter module regions updated");
        Ok(EmitOutcome::Updated)
    }

    fn render(&self, meta: &ChapterMeta, output_path: &Path) -> String {
        render_module(meta, output_path, self.clock.now())
    }
}

async fn write_module(path: &Path, contents: &str) -> Result<(), EmitError> {
    let io_error = |source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, contents).await.map_err(io_error)
}
