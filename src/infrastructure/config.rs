//! Application configuration

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::dto::GenerateOptions;
use crate::application::ports::outbound::ClockPort;
use crate::domain::value_objects::Preset;
use crate::infrastructure::clock::{FixedClock, SystemClock};
use crate::infrastructure::entity_registry::{DEFAULT_CHARACTERS_DIR, DEFAULT_SETTINGS_DIR};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Project root; discovered from the manuscript when unset
    pub project_root: Option<PathBuf>,
    /// Output module path; `<manuscript>.meta.ts` when unset
    pub output: Option<PathBuf>,

    /// Character modules, relative to the project root
    pub characters_dir: PathBuf,
    /// Setting modules, relative to the project root
    pub settings_dir: PathBuf,

    pub dry_run: bool,
    pub force: bool,
    /// Rewrite only the marker regions of an existing module
    pub update: bool,

    /// Replaces the frontmatter character list
    pub characters: Option<Vec<String>>,
    /// Replaces the frontmatter setting list
    pub settings: Option<Vec<String>>,
    pub preset: Option<Preset>,

    /// Pins the header timestamp (`SOURCE_DATE_EPOCH`, unix seconds)
    pub generated_at: Option<FixedClock>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            project_root: env_path("STORYTELLER_PROJECT_ROOT"),
            output: env_path("STORYTELLER_OUTPUT"),

            characters_dir: env_path("STORYTELLER_CHARACTERS_DIR")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHARACTERS_DIR)),
            settings_dir: env_path("STORYTELLER_SETTINGS_DIR")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_DIR)),

            dry_run: env_flag("STORYTELLER_DRY_RUN")?,
            force: env_flag("STORYTELLER_FORCE")?,
            update: env_flag("STORYTELLER_UPDATE")?,

            characters: env::var("STORYTELLER_CHARACTERS").ok().map(|v| split_list(&v)),
            settings: env::var("STORYTELLER_SETTINGS").ok().map(|v| split_list(&v)),
            preset: env::var("STORYTELLER_PRESET")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim().parse::<Preset>())
                .transpose()
                .context("STORYTELLER_PRESET must name a known preset")?,

            generated_at: env::var("SOURCE_DATE_EPOCH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_epoch(&v))
                .transpose()?,
        })
    }

    /// Clock for generated headers; pinned when `SOURCE_DATE_EPOCH` is set
    pub fn clock(&self) -> Arc<dyn ClockPort> {
        match self.generated_at {
            Some(fixed) => Arc::new(fixed),
            None => Arc::new(SystemClock),
        }
    }

    pub fn to_generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            project_root: self.project_root.clone(),
            output: self.output.clone(),
            dry_run: self.dry_run,
            force: self.force,
            update: self.update,
            characters: self.characters.clone(),
            settings: self.settings.clone(),
            preset: self.preset,
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_flag(key: &str) -> Result<bool> {
    match env::var(key) {
        Ok(value) => parse_flag(&value).with_context(|| format!("{key} must be a boolean, got {value:?}")),
        Err(_) => Ok(false),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_epoch(value: &str) -> Result<FixedClock> {
    let seconds: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("SOURCE_DATE_EPOCH must be unix seconds, got {value:?}"))?;
    FixedClock::from_unix_seconds(seconds)
        .with_context(|| format!("SOURCE_DATE_EPOCH {seconds} is out of range"))
}

/// Comma-separated IDs; blanks are dropped
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_flag(value), Some(true), "{value}");
        }
        for value in ["", "0", "false", "No", "off"] {
            assert_eq!(parse_flag(value), Some(false), "{value}");
        }
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_parse_epoch() {
        let clock = parse_epoch(" 1700000000 ").expect("valid epoch");
        assert_eq!(clock.now().to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert!(parse_epoch("yesterday").is_err());
        assert!(parse_epoch(&i64::MAX.to_string()).is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("hero, mage,,  "), vec!["hero", "mage"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_to_generate_options() {
        let config = AppConfig {
            project_root: Some(PathBuf::from("/novel")),
            output: None,
            characters_dir: PathBuf::from(DEFAULT_CHARACTERS_DIR),
            settings_dir: PathBuf::from(DEFAULT_SETTINGS_DIR),
            dry_run: true,
            force: false,
            update: true,
            characters: Some(vec!["hero".to_string()]),
            settings: None,
            preset: Some(Preset::Dialogue),
            generated_at: None,
        };

        let options = config.to_generate_options();
        assert_eq!(options.project_root, Some(PathBuf::from("/novel")));
        assert!(options.dry_run);
        assert!(options.update);
        assert_eq!(options.characters, Some(vec!["hero".to_string()]));
        assert_eq!(options.preset, Some(Preset::Dialogue));
    }
}
