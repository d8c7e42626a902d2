//! Application services - Use case implementations
//!
//! The pipeline runs frontmatter parsing, reference detection and module
//! generation; each service accepts its collaborators as ports.

pub mod frontmatter_parser;
pub mod meta_generation_service;
pub mod reference_detector;

pub use frontmatter_parser::{parse, parse_document, FrontmatterError, ParsedDocument};
pub use meta_generation_service::{resolve_output_path, MetaGenerationError, MetaGenerationService};
pub use reference_detector::{detect_with_entities, DetectionError, ReferenceDetector};
