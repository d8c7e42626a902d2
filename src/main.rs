//! Storyteller Meta - Generates chapter `.meta.ts` modules
//!
//! Usage: `storyteller-meta <chapter.md>`. Options come from the environment
//! (see `AppConfig`); `.env` files are honoured.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyteller_meta::application::ports::outbound::{ClockPort, ModuleEmitterPort};
use storyteller_meta::application::services::{resolve_output_path, MetaGenerationService};
use storyteller_meta::infrastructure::config::AppConfig;
use storyteller_meta::infrastructure::emitter::FileModuleEmitter;
use storyteller_meta::infrastructure::entity_registry::FileEntityRegistry;
use storyteller_meta::infrastructure::project_root::FileProjectRootResolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so dry-run output stays clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyteller_meta=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let document = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: storyteller-meta <chapter.md>")?;

    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::debug!("  Characters: {}", config.characters_dir.display());
    tracing::debug!("  Settings: {}", config.settings_dir.display());
    if let Some(clock) = config.generated_at {
        tracing::debug!("  Pinned timestamp: {}", clock.now().to_rfc3339());
    }

    let registry = Arc::new(FileEntityRegistry::new(
        config.characters_dir.clone(),
        config.settings_dir.clone(),
    ));
    let project_roots = Arc::new(FileProjectRootResolver::new(
        config.characters_dir.clone(),
        config.settings_dir.clone(),
    ));
    let emitter = Arc::new(FileModuleEmitter::new(config.clock()));
    let service = MetaGenerationService::new(registry, project_roots, emitter.clone());

    let options = config.to_generate_options();
    let meta = service
        .generate_from_markdown(&document, &options)
        .await
        .map_err(|err| {
            tracing::error!(kind = err.kind(), "Generation failed");
            anyhow::Error::new(err)
        })?;

    tracing::info!(
        chapter = %meta.id,
        characters = meta.characters.len(),
        settings = meta.settings.len(),
        confidence = meta.confidence,
        "Chapter metadata generated"
    );

    if options.dry_run {
        let output = resolve_output_path(&document, &options)
            .with_context(|| format!("Cannot resolve output path for {}", document.display()))?;
        print!("{}", emitter.render(&meta, &output));
    }

    Ok(())
}
