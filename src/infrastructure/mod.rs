//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Bindings: `.bindings.yaml` sidecar loading
//! - Entity registry: character and setting modules on disk
//! - Project root: upward search for the project directory
//! - Emitter: chapter module rendering and marker-region updates
//! - Clock: wall-clock source for generated headers
//! - Config: Application configuration

pub mod bindings;
pub mod clock;
pub mod config;
pub mod emitter;
pub mod entity_registry;
pub mod project_root;
