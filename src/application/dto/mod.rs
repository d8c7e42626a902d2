//! Data Transfer Objects - Values crossing the pipeline boundary

pub mod chapter_meta;

pub use chapter_meta::{build_reference_map, ChapterMeta, EntityRef, GenerateOptions};
