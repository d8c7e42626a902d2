//! Binding loader - Reads per-entity `.bindings.yaml` sidecars
//!
//! Two schemas are accepted:
//!
//! ```yaml
//! version: 1
//! patterns:
//!   - text: 勇者
//!     confidence: 0.95
//! excludePatterns: [伝説の勇者]
//! ```
//!
//! and the older `references: [{pattern, confidence}]` form, where malformed
//! entries are skipped instead of rejected.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::application::ports::outbound::BindingError;
use crate::domain::entities::{BindingDefinition, BindingPattern, DEFAULT_BINDING_CONFIDENCE};

const BINDING_SUFFIX: &str = "bindings.yaml";
const SUPPORTED_VERSION: u64 = 1;

/// Sidecar location for an entity file: `hero.ts` -> `hero.bindings.yaml`
pub fn binding_path_for(entity_file: &Path) -> PathBuf {
    entity_file.with_extension(BINDING_SUFFIX)
}

/// Load a binding file; `Ok(None)` when it does not exist
pub async fn load_binding_file(path: &Path) -> Result<Option<BindingDefinition>, BindingError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BindingError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let binding = parse_binding(&text).map_err(|reason| BindingError::Schema {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(
        path = %path.display(),
        patterns = binding.patterns.len(),
        excludes = binding.exclude_patterns.len(),
        "Binding loaded"
    );
    Ok(Some(binding))
}

fn parse_binding(text: &str) -> Result<BindingDefinition, String> {
    let root: Value = serde_yaml::from_str(text).map_err(|e| format!("YAML error: {e}"))?;
    let root = root
        .as_mapping()
        .ok_or_else(|| "binding file must be a mapping".to_string())?;

    if let Some(version) = root.get("version") {
        if version.as_u64() != Some(SUPPORTED_VERSION) {
            return Err(format!("unsupported version {version:?}, expected {SUPPORTED_VERSION}"));
        }
    }

    let patterns = if let Some(patterns) = root.get("patterns") {
        parse_patterns(patterns)?
    } else if let Some(references) = root.get("references") {
        parse_legacy_references(references)
    } else {
        return Err("binding file must declare `patterns` or `references`".to_string());
    };

    Ok(BindingDefinition {
        patterns,
        exclude_patterns: parse_excludes(root),
    })
}

fn parse_patterns(patterns: &Value) -> Result<Vec<BindingPattern>, String> {
    let entries = patterns
        .as_sequence()
        .ok_or_else(|| "`patterns` must be a list".to_string())?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| -> Result<BindingPattern, String> {
            let entry = entry
                .as_mapping()
                .ok_or_else(|| format!("patterns[{index}] must be a mapping"))?;
            let text = entry
                .get("text")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| format!("patterns[{index}].text must be a non-empty string"))?;
            let confidence = match entry.get("confidence") {
                None | Some(Value::Null) => DEFAULT_BINDING_CONFIDENCE,
                Some(value) => value
                    .as_f64()
                    .ok_or_else(|| format!("patterns[{index}].confidence must be a number"))?,
            };
            Ok(BindingPattern::new(text, confidence))
        })
        .collect()
}

fn parse_legacy_references(references: &Value) -> Vec<BindingPattern> {
    let Some(entries) = references.as_sequence() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let text = entry.get("pattern")?.as_str().filter(|text| !text.is_empty())?;
            let confidence = match entry.get("confidence") {
                None | Some(Value::Null) => DEFAULT_BINDING_CONFIDENCE,
                Some(value) => value.as_f64()?,
            };
            Some(BindingPattern::new(text, confidence))
        })
        .collect()
}

fn parse_excludes(root: &Mapping) -> Vec<String> {
    root.get("excludePatterns")
        .and_then(Value::as_sequence)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
