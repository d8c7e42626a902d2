//! Story entity - characters and settings known to a project
//!
//! Both kinds share the same detection surface, so they are modelled as a
//! single struct tagged with an [`EntityKind`] rather than two near-identical
//! types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::entities::BindingDefinition;
use crate::domain::value_objects::EntityId;

/// Which registry an entity belongs to. IDs are unique per kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Character,
    Setting,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Setting => "setting",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author-supplied hints that tune body detection for one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionHints {
    #[serde(default)]
    pub common_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Confidence applied to `common_patterns`; 0.9 when absent
    pub confidence: Option<f64>,
}

/// A character or setting loaded from the project, with its binding merged in
#[derive(Debug, Clone, PartialEq)]
pub struct StoryEntity {
    pub kind: EntityKind,
    pub id: EntityId,
    pub name: String,
    /// Identifier the defining module exports the entity under
    pub export_name: String,
    /// Absolute path of the defining module
    pub file_path: PathBuf,
    pub display_names: Vec<String>,
    pub aliases: Vec<String>,
    pub pronouns: Vec<String>,
    pub detection_hints: Option<DetectionHints>,
    pub binding: Option<BindingDefinition>,
}

impl StoryEntity {
    pub fn new(
        kind: EntityKind,
        id: impl Into<EntityId>,
        name: impl Into<String>,
        export_name: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            export_name: export_name.into(),
            file_path: file_path.into(),
            display_names: Vec::new(),
            aliases: Vec::new(),
            pronouns: Vec::new(),
            detection_hints: None,
            binding: None,
        }
    }

    pub fn with_display_names(mut self, names: Vec<String>) -> Self {
        self.display_names = names;
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_pronouns(mut self, pronouns: Vec<String>) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn with_detection_hints(mut self, hints: DetectionHints) -> Self {
        self.detection_hints = Some(hints);
        self
    }

    pub fn with_binding(mut self, binding: BindingDefinition) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Exclude patterns from both the detection hints and the binding file
    pub fn exclude_patterns(&self) -> Vec<&str> {
        let from_hints = self
            .detection_hints
            .iter()
            .flat_map(|hints| hints.exclude_patterns.iter());
        let from_binding = self
            .binding
            .iter()
            .flat_map(|binding| binding.exclude_patterns.iter());

        let mut patterns: Vec<&str> = Vec::new();
        for pattern in from_hints.chain(from_binding) {
            let pattern = pattern.as_str();
            if !pattern.is_empty() && !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
        patterns
    }
}
