//! Detection results - which entities a chapter references, and how surely
//!
//! These are computed fresh on every run and never persisted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{EntityKind, StoryEntity};
use crate::domain::value_objects::EntityId;

/// Per-pattern evidence for a detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub occurrences: usize,
    pub confidence: f64,
}

/// An entity confirmed as referenced by a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEntity {
    pub kind: EntityKind,
    pub id: EntityId,
    pub export_name: String,
    pub file_path: PathBuf,
    pub matched_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pattern_matches: BTreeMap<String, PatternMatch>,
    pub occurrences: usize,
    pub confidence: f64,
}

impl DetectedEntity {
    /// A detection backed only by an explicit frontmatter declaration
    pub fn declared(entity: &StoryEntity) -> Self {
        Self {
            kind: entity.kind,
            id: entity.id.clone(),
            export_name: entity.export_name.clone(),
            file_path: entity.file_path.clone(),
            matched_patterns: Vec::new(),
            pattern_matches: BTreeMap::new(),
            occurrences: 0,
            confidence: 1.0,
        }
    }

    /// Fold another detection of the same entity into this one
    ///
    /// Matched patterns are unioned, occurrences summed, and the higher
    /// confidence kept, so the result does not depend on merge order.
    pub fn merge(&mut self, other: DetectedEntity) {
        debug_assert_eq!(self.id, other.id);

        for pattern in other.matched_patterns {
            if !self.matched_patterns.contains(&pattern) {
                self.matched_patterns.push(pattern);
            }
        }
        for (pattern, evidence) in other.pattern_matches {
            self.pattern_matches
                .entry(pattern)
                .and_modify(|existing| {
                    existing.occurrences = existing.occurrences.max(evidence.occurrences);
                    existing.confidence = existing.confidence.max(evidence.confidence);
                })
                .or_insert(evidence);
        }
        self.occurrences += other.occurrences;
        self.confidence = self.confidence.max(other.confidence);
    }
}

/// Every entity detected in one chapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub characters: Vec<DetectedEntity>,
    pub settings: Vec<DetectedEntity>,
    /// Mean confidence across all detections, 0 when nothing was detected
    pub confidence: f64,
}

impl DetectionResult {
    pub fn new(characters: Vec<DetectedEntity>, settings: Vec<DetectedEntity>) -> Self {
        let confidence = mean_confidence(characters.iter().chain(settings.iter()));
        Self {
            characters,
            settings,
            confidence,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &DetectedEntity> {
        self.characters.iter().chain(self.settings.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.settings.is_empty()
    }
}

fn mean_confidence<'a>(detections: impl Iterator<Item = &'a DetectedEntity>) -> f64 {
    let (sum, count) = detections.fold((0.0, 0usize), |(sum, count), detection| {
        (sum + detection.confidence, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
