//! Binding definition - per-entity detection overrides from a sidecar file

use serde::{Deserialize, Serialize};

/// Confidence given to a binding pattern that does not state its own
pub const DEFAULT_BINDING_CONFIDENCE: f64 = 0.95;

/// A literal pattern the entity may be referred to by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPattern {
    pub text: String,
    /// Always within `[0, 1]`
    pub confidence: f64,
}

impl BindingPattern {
    /// Create a pattern, clamping the confidence into `[0, 1]`
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Detection overrides loaded for a single entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingDefinition {
    pub patterns: Vec<BindingPattern>,
    pub exclude_patterns: Vec<String>,
}

pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_pattern_clamps_confidence() {
        assert_eq!(BindingPattern::new("勇者", 1.7).confidence, 1.0);
        assert_eq!(BindingPattern::new("勇者", -0.2).confidence, 0.0);
        assert_eq!(BindingPattern::new("勇者", 0.4).confidence, 0.4);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
    }
}
