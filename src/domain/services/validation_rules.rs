//! Validation rule generation from detection results

use crate::domain::value_objects::{
    DetectedEntity, DetectionResult, Predicate, RuleType, ValidationRule,
};

/// Build the rule set for a chapter
///
/// One presence rule per detected character, one consistency rule per
/// detected setting, then a plot-advancement and a custom placeholder so
/// the set is never empty.
pub fn generate_validation_rules(detection: &DetectionResult) -> Vec<ValidationRule> {
    let mut rules = Vec::with_capacity(detection.characters.len() + detection.settings.len() + 2);

    for character in &detection.characters {
        rules.push(
            ValidationRule::new(RuleType::CharacterPresence, presence_predicate(character))
                .with_message(format!("Character \"{}\" should appear in the chapter", character.id)),
        );
    }

    for setting in &detection.settings {
        rules.push(
            ValidationRule::new(RuleType::SettingConsistency, presence_predicate(setting))
                .with_message(format!("Setting \"{}\" should be described consistently", setting.id)),
        );
    }

    rules.push(
        ValidationRule::new(
            RuleType::PlotAdvancement,
            Predicate::placeholder("Describe how this chapter advances the plot"),
        )
        .with_message("Chapter should advance the plot"),
    );
    rules.push(
        ValidationRule::new(
            RuleType::Custom,
            Predicate::placeholder("Add chapter-specific checks"),
        )
        .with_message("Custom validation"),
    );

    rules
}

/// Contains-any over the entity's matched patterns, or its bare ID
fn presence_predicate(entity: &DetectedEntity) -> Predicate {
    let mut patterns: Vec<&str> = Vec::new();
    for pattern in &entity.matched_patterns {
        if !patterns.contains(&pattern.as_str()) {
            patterns.push(pattern);
        }
    }
    if patterns.is_empty() {
        patterns.push(entity.id.as_str());
    }
    Predicate::contains_any(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityKind;
    use crate::domain::value_objects::EntityId;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn detected(kind: EntityKind, id: &str, patterns: &[&str]) -> DetectedEntity {
        DetectedEntity {
            kind,
            id: EntityId::new(id),
            export_name: id.to_string(),
            file_path: PathBuf::from(format!("/project/{id}.ts")),
            matched_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            pattern_matches: BTreeMap::new(),
            occurrences: patterns.len(),
            confidence: 1.0,
        }
    }

    #[test]
    fn test_empty_detection_still_yields_placeholders() {
        let rules = generate_validation_rules(&DetectionResult::default());

        let types: Vec<_> = rules.iter().map(|rule| rule.rule_type).collect();
        assert_eq!(types, vec![RuleType::PlotAdvancement, RuleType::Custom]);
    }

    #[test]
    fn test_rules_per_entity() {
        let detection = DetectionResult::new(
            vec![detected(EntityKind::Character, "hero", &["勇者", "勇者", "彼"])],
            vec![detected(EntityKind::Setting, "royal_capital", &[])],
        );

        let rules = generate_validation_rules(&detection);

        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].rule_type, RuleType::CharacterPresence);
        assert_eq!(rules[0].validate, Predicate::contains_any(["勇者", "彼"]));
        assert_eq!(rules[1].rule_type, RuleType::SettingConsistency);
        assert_eq!(rules[1].validate, Predicate::contains_any(["royal_capital"]));
    }
}
