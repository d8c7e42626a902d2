//! Storyteller Meta - Chapter metadata generation for Storyteller projects
//!
//! Reads a manuscript chapter with a `storyteller` frontmatter block, works
//! out which characters and settings it references, derives validation rules,
//! and writes a TypeScript `.meta.ts` module whose marker regions can be
//! regenerated without disturbing hand-written content.

pub mod application;
pub mod domain;
pub mod infrastructure;
