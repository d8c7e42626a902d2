//! Domain entities - Core story objects with identity

mod binding;
mod chapter;
mod story_entity;

pub use binding::{clamp_confidence, BindingDefinition, BindingPattern, DEFAULT_BINDING_CONFIDENCE};
pub use chapter::FrontmatterData;
pub use story_entity::{DetectionHints, EntityKind, StoryEntity};
