//! Filesystem entity registry
//!
//! Characters and settings are TypeScript modules, one entity per file:
//!
//! ```ts
//! import type { Character } from "@storyteller/types/v2/character.ts";
//!
//! export const hero: Character = {
//!   "id": "hero",
//!   "name": "アレクス",
//!   "displayNames": ["勇者"]
//! };
//! ```
//!
//! The object literal is JSON, as written by the element-creation tooling.
//! A sibling `hero.bindings.yaml` is merged in when present.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use futures_util::future::try_join;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::application::ports::outbound::{EntityRegistryPort, RegistryError};
use crate::domain::entities::{DetectionHints, EntityKind, StoryEntity};
use crate::infrastructure::bindings::{binding_path_for, load_binding_file};

pub const DEFAULT_CHARACTERS_DIR: &str = "src/characters";
pub const DEFAULT_SETTINGS_DIR: &str = "src/settings";

/// Shape of the exported object; unknown keys are ignored
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityDefinition {
    id: String,
    name: String,
    #[serde(default)]
    display_names: Vec<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    pronouns: Vec<String>,
    #[serde(default)]
    detection_hints: Option<DetectionHints>,
}

/// Registry that scans the project's character and setting directories
#[derive(Debug, Clone)]
pub struct FileEntityRegistry {
    characters_dir: PathBuf,
    settings_dir: PathBuf,
}

impl FileEntityRegistry {
    /// Directories are relative to the project root
    pub fn new(characters_dir: impl Into<PathBuf>, settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            characters_dir: characters_dir.into(),
            settings_dir: settings_dir.into(),
        }
    }
}

impl Default for FileEntityRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHARACTERS_DIR, DEFAULT_SETTINGS_DIR)
    }
}

#[async_trait]
impl EntityRegistryPort for FileEntityRegistry {
    #[instrument(skip(self), fields(project_root = %project_root.display()))]
    async fn load_entities(&self, project_root: &Path) -> Result<Vec<StoryEntity>, RegistryError> {
        let characters_dir = project_root.join(&self.characters_dir);
        let settings_dir = project_root.join(&self.settings_dir);

        let (mut entities, settings) = try_join(
            scan_directory(&characters_dir, EntityKind::Character),
            scan_directory(&settings_dir, EntityKind::Setting),
        )
        .await?;

        info!(
            characters = entities.len(),
            settings = settings.len(),
            "Entity registry loaded"
        );

        entities.extend(settings);
        entities.sort_by(|a, b| (a.kind, &a.id).cmp(&(b.kind, &b.id)));
        Ok(entities)
    }
}

/// Load every entity module in one directory; a missing directory is empty
async fn scan_directory(dir: &Path, kind: EntityKind) -> Result<Vec<StoryEntity>, RegistryError> {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Entity directory absent");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(RegistryError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let io_error = |source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(io_error)? {
        let file_type = entry.file_type().await.map_err(io_error)?;
        let path = entry.path();
        if file_type.is_file() && is_entity_module(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut entities = Vec::with_capacity(files.len());
    for path in files {
        if let Some(entity) = load_entity_file(&path, kind).await? {
            entities.push(entity);
        }
    }
    Ok(entities)
}

fn is_entity_module(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    file_name.ends_with(".ts")
        && !file_name.ends_with(".d.ts")
        && !file_name.ends_with(".test.ts")
        && file_name != "index.ts"
}

async fn load_entity_file(path: &Path, kind: EntityKind) -> Result<Option<StoryEntity>, RegistryError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let Some((export_name, definition)) =
        parse_entity_module(&text).map_err(|reason| RegistryError::InvalidEntity {
            path: path.to_path_buf(),
            reason,
        })?
    else {
        warn!(path = %path.display(), "No exported entity object found; skipping");
        return Ok(None);
    };

    let mut entity = StoryEntity::new(kind, definition.id, definition.name, export_name, path)
        .with_display_names(definition.display_names)
        .with_aliases(definition.aliases)
        .with_pronouns(definition.pronouns);
    if let Some(hints) = definition.detection_hints {
        entity = entity.with_detection_hints(hints);
    }
    if let Some(binding) = load_binding_file(&binding_path_for(path)).await? {
        entity = entity.with_binding(binding);
    }

    debug!(kind = %entity.kind, id = %entity.id, path = %path.display(), "Entity loaded");
    Ok(Some(entity))
}

fn export_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*export\s+const\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?::[^=\n]*)?=\s*\{")
            .expect("export pattern is valid")
    })
}

/// Find `export const <name> = { ... }` and decode the object literal
fn parse_entity_module(text: &str) -> Result<Option<(String, EntityDefinition)>, String> {
    let Some(captures) = export_pattern().captures(text) else {
        return Ok(None);
    };
    let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
        return Ok(None);
    };

    // The match ends on the opening brace of the literal
    let literal = &text[whole.end() - 1..];
    let definition = serde_json::Deserializer::from_str(literal)
        .into_iter::<EntityDefinition>()
        .next()
        .ok_or_else(|| "empty object literal".to_string())?
        .map_err(|e| format!("object literal is not valid JSON: {e}"))?;

    if definition.id.trim().is_empty() {
        return Err("`id` must be a non-empty string".to_string());
    }
    if definition.name.trim().is_empty() {
        return Err("`name` must be a non-empty string".to_string());
    }

    Ok(Some((name.as_str().to_string(), definition)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERO: &str = r#"import type { Character } from "@storyteller/types/v2/character.ts";

export const hero: Character = {
  "id": "hero",
  "name": "アレクス",
  "role": "protagonist",
  "displayNames": ["勇者"],
  "aliases": ["若者"],
  "pronouns": ["彼"],
  "detectionHints": {
    "commonPatterns": ["勇者アレクス"],
    "excludePatterns": ["伝説の勇者"],
    "confidence": 0.85
  }
};
"#;

    const CAPITAL: &str = r#"export const royalCapital = {"id": "royal_capital", "name": "王都"} as const;
"#;

    fn write(path: &Path, text: &str) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
        std::fs::write(path, text).expect("write file");
    }

    #[test]
    fn test_parse_entity_module() {
        let (export_name, definition) = parse_entity_module(HERO)
            .expect("valid module")
            .expect("export present");

        assert_eq!(export_name, "hero");
        assert_eq!(definition.id, "hero");
        assert_eq!(definition.display_names, vec!["勇者"]);
        let hints = definition.detection_hints.expect("hints present");
        assert_eq!(hints.confidence, Some(0.85));
        assert_eq!(hints.exclude_patterns, vec!["伝説の勇者"]);
    }

    #[test]
    fn test_parse_entity_module_without_export() {
        assert!(parse_entity_module("export type Foo = { id: string };")
            .expect("no error")
            .is_none());
    }

    #[test]
    fn test_parse_entity_module_rejects_non_json() {
        let err = parse_entity_module("export const hero = { id: \"hero\", name: \"x\" };")
            .unwrap_err();
        assert!(err.contains("not valid JSON"));

        let err = parse_entity_module("export const hero = {\"name\": \"x\"};").unwrap_err();
        assert!(err.contains("id"));
    }

    #[test]
    fn test_is_entity_module() {
        assert!(is_entity_module(Path::new("/p/hero.ts")));
        assert!(!is_entity_module(Path::new("/p/hero.d.ts")));
        assert!(!is_entity_module(Path::new("/p/hero.test.ts")));
        assert!(!is_entity_module(Path::new("/p/index.ts")));
        assert!(!is_entity_module(Path::new("/p/hero.bindings.yaml")));
    }

    #[tokio::test]
    async fn test_load_entities_merges_bindings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("src/characters/hero.ts"), HERO);
        write(
            &root.join("src/characters/hero.bindings.yaml"),
            "version: 1\npatterns:\n  - text: 光の剣士\n",
        );
        write(&root.join("src/characters/index.ts"), "export * from \"./hero.ts\";\n");
        write(&root.join("src/settings/royal_capital.ts"), CAPITAL);

        let entities = FileEntityRegistry::default()
            .load_entities(root)
            .await
            .expect("registry should load");

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].kind, EntityKind::Character);
        assert_eq!(entities[0].export_name, "hero");
        assert_eq!(entities[0].file_path, root.join("src/characters/hero.ts"));
        let binding = entities[0].binding.as_ref().expect("binding merged");
        assert_eq!(binding.patterns[0].text, "光の剣士");

        assert_eq!(entities[1].kind, EntityKind::Setting);
        assert_eq!(entities[1].id.as_str(), "royal_capital");
        assert_eq!(entities[1].export_name, "royalCapital");
        assert!(entities[1].binding.is_none());
    }

    #[tokio::test]
    async fn test_missing_directories_yield_no_entities() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entities = FileEntityRegistry::default()
            .load_entities(dir.path())
            .await
            .expect("empty project loads");
        assert!(entities.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entity_aborts_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("src/characters/hero.ts"), HERO);
        write(&root.join("src/settings/broken.ts"), "export const broken = { \"id\": ");

        let err = FileEntityRegistry::default()
            .load_entities(root)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEntity { .. }));
    }

    #[tokio::test]
    async fn test_malformed_binding_aborts_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("src/characters/hero.ts"), HERO);
        write(&root.join("src/characters/hero.bindings.yaml"), "version: 3\npatterns: []\n");

        let err = FileEntityRegistry::default()
            .load_entities(root)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Binding(_)));
    }
}
