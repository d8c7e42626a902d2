//! Body scanning - literal pattern detection for a single entity
//!
//! Candidate patterns come from the entity's name, display names, aliases,
//! pronouns, detection hints and binding file. Matching is plain substring
//! counting; no regular expressions are involved.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::domain::entities::{clamp_confidence, StoryEntity};
use crate::domain::value_objects::{DetectedEntity, PatternMatch};

pub const NAME_CONFIDENCE: f64 = 1.0;
pub const DISPLAY_NAME_CONFIDENCE: f64 = 0.9;
pub const ALIAS_CONFIDENCE: f64 = 0.8;
pub const PRONOUN_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_HINT_CONFIDENCE: f64 = 0.9;

/// A pattern to look for, with the confidence a match carries
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePattern {
    pub text: String,
    pub confidence: f64,
}

/// Ordered candidate set that keeps the highest confidence per text
#[derive(Debug, Default)]
struct CandidateSet {
    patterns: Vec<CandidatePattern>,
    index: HashMap<String, usize>,
}

impl CandidateSet {
    fn add(&mut self, text: &str, confidence: f64) {
        if text.is_empty() {
            return;
        }
        match self.index.get(text) {
            Some(&position) => {
                let existing = &mut self.patterns[position];
                existing.confidence = existing.confidence.max(confidence);
            }
            None => {
                self.index.insert(text.to_string(), self.patterns.len());
                self.patterns.push(CandidatePattern {
                    text: text.to_string(),
                    confidence,
                });
            }
        }
    }

    fn extend<'a>(&mut self, texts: impl IntoIterator<Item = &'a String>, confidence: f64) {
        for text in texts {
            self.add(text, confidence);
        }
    }
}

/// Collect every candidate pattern for an entity, deduplicated by text
pub fn collect_candidate_patterns(entity: &StoryEntity) -> Vec<CandidatePattern> {
    let mut candidates = CandidateSet::default();

    candidates.add(&entity.name, NAME_CONFIDENCE);
    candidates.extend(&entity.display_names, DISPLAY_NAME_CONFIDENCE);
    candidates.extend(&entity.aliases, ALIAS_CONFIDENCE);
    candidates.extend(&entity.pronouns, PRONOUN_CONFIDENCE);

    if let Some(hints) = &entity.detection_hints {
        let confidence = hints
            .confidence
            .map_or(DEFAULT_HINT_CONFIDENCE, clamp_confidence);
        candidates.extend(&hints.common_patterns, confidence);
    }

    if let Some(binding) = &entity.binding {
        for pattern in &binding.patterns {
            candidates.add(&pattern.text, pattern.confidence);
        }
    }

    candidates.patterns
}

/// Count non-overlapping literal occurrences of `needle` in `haystack`
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Occurrences of `pattern` left after discounting exclude patterns that contain it
///
/// Returns the raw count, the total excluded, and the net count.
fn net_occurrences(body: &str, pattern: &str, excludes: &[&str]) -> (usize, usize, usize) {
    let raw = count_occurrences(body, pattern);
    let excluded: usize = excludes
        .iter()
        .filter(|exclude| exclude.contains(pattern))
        .map(|exclude| count_occurrences(body, exclude))
        .sum();
    (raw, excluded, raw.saturating_sub(excluded))
}

/// Scan a chapter body for one entity
///
/// Returns `None` when no pattern survives exclusion; an entity is never
/// reported with zero evidence.
pub fn scan_entity(body: &str, entity: &StoryEntity) -> Option<DetectedEntity> {
    let excludes = entity.exclude_patterns();

    let mut matched_patterns = Vec::new();
    let mut pattern_matches = BTreeMap::new();
    let mut occurrences = 0usize;
    let mut confidence: f64 = 0.0;

    for candidate in collect_candidate_patterns(entity) {
        let (raw, excluded, net) = net_occurrences(body, &candidate.text, &excludes);
        if excluded > raw {
            warn!(
                entity = %entity.id,
                pattern = %candidate.text,
                raw,
                excluded,
                "Exclude patterns outnumber pattern occurrences; dropping pattern"
            );
        }
        if net == 0 {
            continue;
        }

        matched_patterns.push(candidate.text.clone());
        pattern_matches.insert(
            candidate.text,
            PatternMatch {
                occurrences: net,
                confidence: candidate.confidence,
            },
        );
        occurrences += net;
        confidence = confidence.max(candidate.confidence);
    }

    if matched_patterns.is_empty() {
        return None;
    }

    Some(DetectedEntity {
        kind: entity.kind,
        id: entity.id.clone(),
        export_name: entity.export_name.clone(),
        file_path: entity.file_path.clone(),
        matched_patterns,
        pattern_matches,
        occurrences,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        BindingDefinition, BindingPattern, DetectionHints, EntityKind,
    };

    fn hero() -> StoryEntity {
        StoryEntity::new(
            EntityKind::Character,
            "hero",
            "アレクス",
            "hero",
            "/project/src/characters/hero.ts",
        )
        .with_display_names(vec!["勇者".to_string()])
        .with_aliases(vec!["勇者".to_string(), "若者".to_string()])
        .with_pronouns(vec!["彼".to_string()])
    }

    #[test]
    fn test_duplicate_candidates_keep_max_confidence() {
        let candidates = collect_candidate_patterns(&hero());

        let yuusha: Vec<_> = candidates.iter().filter(|c| c.text == "勇者").collect();
        assert_eq!(yuusha.len(), 1);
        assert_eq!(yuusha[0].confidence, DISPLAY_NAME_CONFIDENCE);

        let texts: Vec<_> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["アレクス", "勇者", "若者", "彼"]);
    }

    #[test]
    fn test_hint_and_binding_confidence() {
        let entity = hero()
            .with_detection_hints(DetectionHints {
                common_patterns: vec!["アレクス殿".to_string()],
                exclude_patterns: vec![],
                confidence: None,
            })
            .with_binding(BindingDefinition {
                patterns: vec![BindingPattern::new("彼", 0.75), BindingPattern::new("勇者様", 0.3)],
                exclude_patterns: vec![],
            });

        let candidates = collect_candidate_patterns(&entity);
        let confidence_of = |text: &str| {
            candidates
                .iter()
                .find(|c| c.text == text)
                .map(|c| c.confidence)
        };

        assert_eq!(confidence_of("アレクス殿"), Some(DEFAULT_HINT_CONFIDENCE));
        assert_eq!(confidence_of("彼"), Some(0.75));
        assert_eq!(confidence_of("勇者様"), Some(0.3));
    }

    #[test]
    fn test_custom_hint_confidence_reaches_detection() {
        let entity = StoryEntity::new(
            EntityKind::Character,
            "hero",
            "アレクス",
            "hero",
            "/project/src/characters/hero.ts",
        )
        .with_detection_hints(DetectionHints {
            common_patterns: vec!["勇者".to_string()],
            exclude_patterns: vec![],
            confidence: Some(0.85),
        });

        let detection = scan_entity("勇者は王都へ向かった。", &entity).expect("hint matches");
        assert_eq!(detection.confidence, 0.85);
        assert_eq!(detection.pattern_matches["勇者"].confidence, 0.85);
    }

    #[test]
    fn test_hint_confidence_is_clamped() {
        let hinted = |confidence: f64| {
            StoryEntity::new(EntityKind::Character, "hero", "アレクス", "hero", "/p/hero.ts")
                .with_detection_hints(DetectionHints {
                    common_patterns: vec!["勇者".to_string()],
                    exclude_patterns: vec![],
                    confidence: Some(confidence),
                })
        };

        let high = scan_entity("勇者", &hinted(1.7)).expect("hint matches");
        assert_eq!(high.confidence, 1.0);
        let low = scan_entity("勇者", &hinted(-0.4)).expect("hint matches");
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn test_count_occurrences() {
        assert_eq!(count_occurrences("勇者と勇者", "勇者"), 2);
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("abc", ""), 0);
    }

    #[test]
    fn test_scan_entity_reports_matches() {
        let detection = scan_entity("勇者は王都へ向かった。彼は剣を握った。", &hero())
            .expect("hero should be detected");

        assert_eq!(detection.matched_patterns, vec!["勇者", "彼"]);
        assert_eq!(detection.occurrences, 2);
        assert_eq!(detection.confidence, DISPLAY_NAME_CONFIDENCE);
        assert_eq!(detection.pattern_matches["彼"].confidence, PRONOUN_CONFIDENCE);
    }

    #[test]
    fn test_exclude_superstring_cancels_pattern() {
        let entity = StoryEntity::new(
            EntityKind::Character,
            "hero",
            "hero",
            "hero",
            "/project/src/characters/hero.ts",
        )
        .with_detection_hints(DetectionHints {
            common_patterns: vec![],
            exclude_patterns: vec!["legendary hero".to_string()],
            confidence: None,
        });

        assert!(scan_entity("The legendary hero was only a story.", &entity).is_none());

        let detection = scan_entity("The legendary hero inspired the hero.", &entity)
            .expect("one plain occurrence remains");
        assert_eq!(detection.occurrences, 1);
    }

    #[test]
    fn test_overlapping_excludes_do_not_underflow() {
        let entity = StoryEntity::new(
            EntityKind::Character,
            "hero",
            "hero",
            "hero",
            "/project/src/characters/hero.ts",
        )
        .with_binding(BindingDefinition {
            patterns: vec![],
            exclude_patterns: vec!["legendary hero".to_string(), "hero's".to_string()],
        });

        assert!(scan_entity("The legendary hero's sword.", &entity).is_none());
    }

    #[test]
    fn test_unrelated_exclude_is_ignored() {
        let entity = hero().with_binding(BindingDefinition {
            patterns: vec![],
            exclude_patterns: vec!["魔王".to_string()],
        });

        let detection = scan_entity("魔王と勇者", &entity).expect("exclude does not contain 勇者");
        assert_eq!(detection.occurrences, 1);
    }
}
