//! Value objects - Immutable objects defined by their attributes

mod detection;
mod ids;
mod preset;
mod validation;

pub use detection::{DetectedEntity, DetectionResult, PatternMatch};
pub use ids::*;
pub use preset::{splice_preset_rules, Preset, UnknownPresetError};
pub use validation::{Predicate, RuleType, ValidationRule};
