use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{EntityKind, FrontmatterData};
use crate::domain::value_objects::{
    ChapterId, DetectedEntity, DetectionResult, EntityId, Preset, ValidationRule,
};

/// Entity a reference-map pattern resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
    pub export_name: String,
}

impl From<&DetectedEntity> for EntityRef {
    fn from(entity: &DetectedEntity) -> Self {
        Self {
            kind: entity.kind,
            id: entity.id.clone(),
            export_name: entity.export_name.clone(),
        }
    }
}

/// Pipeline output: everything the emitter needs to write a chapter module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMeta {
    pub id: ChapterId,
    pub title: String,
    pub order: serde_yaml::Number,
    pub characters: Vec<DetectedEntity>,
    pub settings: Vec<DetectedEntity>,
    pub validations: Vec<ValidationRule>,
    /// Pattern text to entity, keyed in sorted order
    pub references: BTreeMap<String, EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plot_points: Vec<String>,
    /// Mean detection confidence, for reporting
    pub confidence: f64,
}

impl ChapterMeta {
    pub fn new(
        frontmatter: FrontmatterData,
        detection: DetectionResult,
        validations: Vec<ValidationRule>,
    ) -> Self {
        let references = build_reference_map(&detection);
        Self {
            id: frontmatter.chapter_id,
            title: frontmatter.title,
            order: frontmatter.order,
            characters: detection.characters,
            settings: detection.settings,
            validations,
            references,
            summary: frontmatter.summary,
            plot_points: frontmatter.plot_points.unwrap_or_default(),
            confidence: detection.confidence,
        }
    }
}

/// Map each matched pattern to its entity; characters win over settings on a clash
pub fn build_reference_map(detection: &DetectionResult) -> BTreeMap<String, EntityRef> {
    let mut references = BTreeMap::new();
    for entity in detection.all() {
        for pattern in &entity.matched_patterns {
            references
                .entry(pattern.clone())
                .or_insert_with(|| EntityRef::from(entity));
        }
    }
    references
}

/// Options for a single generate call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub project_root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub force: bool,
    /// Refresh only the marked regions of an existing output
    pub update: bool,
    /// Replaces the frontmatter `characters` list when set
    pub characters: Option<Vec<String>>,
    /// Replaces the frontmatter `settings` list when set
    pub settings: Option<Vec<String>>,
    pub preset: Option<Preset>,
}
