//! Reference Detector - Decides which entities a chapter references
//!
//! Two strategies are merged:
//! - IDs declared in the frontmatter are trusted outright (confidence 1.0)
//! - the body is scanned for each known entity's patterns
//!
//! A declared ID that the registry does not know aborts detection.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{EntityRegistryPort, RegistryError};
use crate::domain::entities::{EntityKind, FrontmatterData, StoryEntity};
use crate::domain::services::scan_entity;
use crate::domain::value_objects::{DetectedEntity, DetectionResult};

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("{}", describe_unknown(.characters, .settings))]
    UnknownEntities {
        characters: Vec<String>,
        settings: Vec<String>,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl DetectionError {
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionError::UnknownEntities { .. } => "unknown_entity_reference",
            DetectionError::Registry(_) => "registry_error",
        }
    }
}

fn describe_unknown(characters: &[String], settings: &[String]) -> String {
    let mut parts = Vec::new();
    if !characters.is_empty() {
        parts.push(format!("Unknown characters: {}", characters.join(", ")));
    }
    if !settings.is_empty() {
        parts.push(format!("Unknown settings: {}", settings.join(", ")));
    }
    format!("Frontmatter references entities missing from the project: {}", parts.join("; "))
}

pub struct ReferenceDetector {
    registry: Arc<dyn EntityRegistryPort>,
}

impl ReferenceDetector {
    pub fn new(registry: Arc<dyn EntityRegistryPort>) -> Self {
        Self { registry }
    }

    /// Load the project's entities and detect references in `body`
    #[instrument(skip(self, body, frontmatter), fields(chapter = %frontmatter.chapter_id))]
    pub async fn detect(
        &self,
        body: &str,
        frontmatter: &FrontmatterData,
        project_root: &Path,
    ) -> Result<DetectionResult, DetectionError> {
        let entities = self.registry.load_entities(project_root).await?;
        debug!(entities = entities.len(), "Entity registry loaded");

        let result = detect_with_entities(body, frontmatter, &entities)?;
        info!(
            characters = result.characters.len(),
            settings = result.settings.len(),
            confidence = result.confidence,
            "Detection complete"
        );
        Ok(result)
    }
}

/// Detection against an already-loaded entity list
pub fn detect_with_entities(
    body: &str,
    frontmatter: &FrontmatterData,
    entities: &[StoryEntity],
) -> Result<DetectionResult, DetectionError> {
    let characters = index_by_id(entities, EntityKind::Character);
    let settings = index_by_id(entities, EntityKind::Setting);

    let missing_characters = missing_ids(frontmatter.declared_characters(), &characters);
    let missing_settings = missing_ids(frontmatter.declared_settings(), &settings);
    if !missing_characters.is_empty() || !missing_settings.is_empty() {
        return Err(DetectionError::UnknownEntities {
            characters: missing_characters,
            settings: missing_settings,
        });
    }

    let mut detected_characters = DetectionMap::default();
    let mut detected_settings = DetectionMap::default();

    for id in frontmatter.declared_characters() {
        if let Some(entity) = characters.get(id.as_str()) {
            detected_characters.insert(DetectedEntity::declared(entity));
        }
    }
    for id in frontmatter.declared_settings() {
        if let Some(entity) = settings.get(id.as_str()) {
            detected_settings.insert(DetectedEntity::declared(entity));
        }
    }

    for entity in entities {
        let Some(detection) = scan_entity(body, entity) else {
            continue;
        };
        match entity.kind {
            EntityKind::Character => detected_characters.insert(detection),
            EntityKind::Setting => detected_settings.insert(detection),
        }
    }

    Ok(DetectionResult::new(
        detected_characters.into_vec(),
        detected_settings.into_vec(),
    ))
}

/// Later entities shadow earlier ones with the same ID
fn index_by_id(entities: &[StoryEntity], kind: EntityKind) -> HashMap<&str, &StoryEntity> {
    entities
        .iter()
        .filter(|entity| entity.kind == kind)
        .map(|entity| (entity.id.as_str(), entity))
        .collect()
}

fn missing_ids(declared: &[String], known: &HashMap<&str, &StoryEntity>) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for id in declared {
        if !known.contains_key(id.as_str()) && !missing.contains(id) {
            missing.push(id.clone());
        }
    }
    missing
}

/// Detections keyed by entity ID, in first-seen order
#[derive(Default)]
struct DetectionMap {
    detections: Vec<DetectedEntity>,
    positions: HashMap<String, usize>,
}

impl DetectionMap {
    fn insert(&mut self, detection: DetectedEntity) {
        match self.positions.get(detection.id.as_str()) {
            Some(&position) => self.detections[position].merge(detection),
            None => {
                self.positions
                    .insert(detection.id.to_string(), self.detections.len());
                self.detections.push(detection);
            }
        }
    }

    fn into_vec(self) -> Vec<DetectedEntity> {
        self.detections
    }
}
