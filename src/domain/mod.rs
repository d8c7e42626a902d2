//! Domain layer - Core story logic with no I/O
//!
//! This layer contains:
//! - Entities: story entities (characters, settings), bindings, chapter frontmatter
//! - Value Objects: identifiers, detections, validation rules, presets
//! - Domain Services: body scanning and validation rule generation

pub mod entities;
pub mod services;
pub mod value_objects;
