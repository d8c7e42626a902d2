//! Validation rules embedded in generated chapter modules
//!
//! Predicates are kept as a small expression tree; the emitter prints them
//! as executable source for the target module.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    CharacterPresence,
    SettingConsistency,
    PlotAdvancement,
    Custom,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::CharacterPresence => "character_presence",
            RuleType::SettingConsistency => "setting_consistency",
            RuleType::PlotAdvancement => "plot_advancement",
            RuleType::Custom => "custom",
        }
    }
}

/// Single-argument boolean check over the chapter content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// True when the content contains at least one of the literals
    ContainsAny { patterns: Vec<String> },
    /// Always true; left for the author to fill in
    Placeholder { todo: String },
}

impl Predicate {
    pub fn contains_any<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::ContainsAny {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn placeholder(todo: impl Into<String>) -> Self {
        Predicate::Placeholder { todo: todo.into() }
    }

    /// Evaluate against content; mirrors what the emitted source does
    pub fn evaluate(&self, content: &str) -> bool {
        match self {
            Predicate::ContainsAny { patterns } => {
                patterns.iter().any(|pattern| content.contains(pattern.as_str()))
            }
            Predicate::Placeholder { .. } => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub validate: Predicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(rule_type: RuleType, validate: Predicate) -> Self {
        Self {
            rule_type,
            validate,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any_evaluation() {
        let predicate = Predicate::contains_any(["勇者", "hero"]);
        assert!(predicate.evaluate("勇者は王都へ向かった。"));
        assert!(!predicate.evaluate("魔王は城で待っていた。"));
        assert!(Predicate::placeholder("check pacing").evaluate(""));
    }

    #[test]
    fn test_rule_serialization_uses_type_key() {
        let rule = ValidationRule::new(
            RuleType::CharacterPresence,
            Predicate::contains_any(["勇者"]),
        )
        .with_message("hero appears");

        let json = serde_json::to_string(&rule).expect("serialization should succeed");
        assert!(json.contains("\"type\":\"character_presence\""));
        assert!(json.contains("\"op\":\"contains_any\""));
    }
}
