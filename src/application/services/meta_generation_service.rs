//! Meta Generation Service - Manuscript to chapter module, end to end
//!
//! Sequences the pipeline: read the manuscript, parse its frontmatter,
//! resolve the project root, detect entity references, build validation
//! rules, and hand the resulting [`ChapterMeta`] to the module emitter.
//! Dry runs stop before anything touches the output path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::dto::{ChapterMeta, GenerateOptions};
use crate::application::ports::outbound::{
    EmitError, EmitOutcome, EntityRegistryPort, ModuleEmitterPort, ProjectRootPort,
};
use crate::application::services::frontmatter_parser::{parse_document, FrontmatterError};
use crate::application::services::reference_detector::{DetectionError, ReferenceDetector};
use crate::domain::services::generate_validation_rules;
use crate::domain::value_objects::splice_preset_rules;

const OUTPUT_EXTENSION: &str = "meta.ts";

#[derive(Debug, thiserror::Error)]
pub enum MetaGenerationError {
    #[error("Failed to read {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    #[error("Project root not found above {0}")]
    ProjectRootNotFound(PathBuf),
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error("Output file already exists: {0} (set force to overwrite or update to refresh generated regions)")]
    OutputExists(PathBuf),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl MetaGenerationError {
    /// Stable discriminant for callers that branch on the failure
    pub fn kind(&self) -> &'static str {
        match self {
            MetaGenerationError::ReadDocument { .. } => "io_error",
            MetaGenerationError::Frontmatter(err) => err.kind(),
            MetaGenerationError::ProjectRootNotFound(_) => "project_root_not_found",
            MetaGenerationError::Detection(err) => err.kind(),
            MetaGenerationError::OutputExists(_) => "output_exists",
            MetaGenerationError::Emit(err) => err.kind(),
        }
    }
}

pub struct MetaGenerationService {
    detector: ReferenceDetector,
    project_roots: Arc<dyn ProjectRootPort>,
    emitter: Arc<dyn ModuleEmitterPort>,
}

impl MetaGenerationService {
    pub fn new(
        registry: Arc<dyn EntityRegistryPort>,
        project_roots: Arc<dyn ProjectRootPort>,
        emitter: Arc<dyn ModuleEmitterPort>,
    ) -> Self {
        Self {
            detector: ReferenceDetector::new(registry),
            project_roots,
            emitter,
        }
    }

    /// Generate (or refresh) the chapter module for a manuscript
    #[instrument(skip(self, options), fields(document = %document.display(), dry_run = options.dry_run))]
    pub async fn generate_from_markdown(
        &self,
        document: &Path,
        options: &GenerateOptions,
    ) -> Result<ChapterMeta, MetaGenerationError> {
        let document = absolute(document).map_err(|source| MetaGenerationError::ReadDocument {
            path: document.to_path_buf(),
            source,
        })?;

        let text = tokio::fs::read_to_string(&document).await.map_err(|source| {
            MetaGenerationError::ReadDocument {
                path: document.clone(),
                source,
            }
        })?;

        let parsed = parse_document(&text)?;
        let mut frontmatter = parsed.frontmatter;
        debug!(chapter = %frontmatter.chapter_id, "Frontmatter parsed");

        let project_root = self.resolve_project_root(&document, options).await?;
        debug!(project_root = %project_root.display(), "Project root resolved");

        if let Some(characters) = &options.characters {
            frontmatter.characters = Some(characters.clone());
        }
        if let Some(settings) = &options.settings {
            frontmatter.settings = Some(settings.clone());
        }

        let detection = self
            .detector
            .detect(&parsed.body, &frontmatter, &project_root)
            .await?;

        let mut validations = generate_validation_rules(&detection);
        if let Some(preset) = options.preset {
            validations = splice_preset_rules(validations, preset);
        }

        let meta = ChapterMeta::new(frontmatter, detection, validations);

        if options.dry_run {
            info!(chapter = %meta.id, "Dry run; skipping write");
            return Ok(meta);
        }

        let output_path = resolve_output_path(&document, options).map_err(|source| {
            MetaGenerationError::Emit(EmitError::Io {
                path: options
                    .output
                    .clone()
                    .filter(|path| !path.as_os_str().is_empty())
                    .unwrap_or_else(|| document.clone()),
                source,
            })
        })?;
        self.write(&meta, &output_path, options).await?;

        Ok(meta)
    }

    async fn resolve_project_root(
        &self,
        document: &Path,
        options: &GenerateOptions,
    ) -> Result<PathBuf, MetaGenerationError> {
        if let Some(root) = &options.project_root {
            return absolute(root).map_err(|_| MetaGenerationError::ProjectRootNotFound(root.clone()));
        }

        let start = document.parent().unwrap_or(document);
        self.project_roots
            .find_project_root(start)
            .await
            .ok_or_else(|| MetaGenerationError::ProjectRootNotFound(start.to_path_buf()))
    }

    async fn write(
        &self,
        meta: &ChapterMeta,
        output_path: &Path,
        options: &GenerateOptions,
    ) -> Result<(), MetaGenerationError> {
        let exists = tokio::fs::try_exists(output_path)
            .await
            .map_err(|source| EmitError::Io {
                path: output_path.to_path_buf(),
                source,
            })?;

        if options.update {
            let outcome = self.emitter.update_or_emit(meta, output_path).await?;
            match outcome {
                EmitOutcome::Created => info!(output = %output_path.display(), "Chapter module created"),
                EmitOutcome::Updated => info!(output = %output_path.display(), "Chapter module updated"),
                EmitOutcome::Unchanged => info!(output = %output_path.display(), "Chapter module already up to date"),
            }
            return Ok(());
        }

        if exists && !options.force {
            return Err(MetaGenerationError::OutputExists(output_path.to_path_buf()));
        }

        self.emitter.emit(meta, output_path).await?;
        info!(output = %output_path.display(), overwritten = exists, "Chapter module written");
        Ok(())
    }
}

/// Where the module for `document` goes: the explicit output, or the
/// manuscript path with its extension replaced by `.meta.ts`
pub fn resolve_output_path(document: &Path, options: &GenerateOptions) -> std::io::Result<PathBuf> {
    match &options.output {
        Some(output) => absolute(output),
        None => Ok(absolute(document)?.with_extension(OUTPUT_EXTENSION)),
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(path)
}
