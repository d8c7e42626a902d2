//! Module emitter - Renders chapter modules and refreshes their marker regions

mod file_emitter;
pub mod markers;
pub mod renderer;

pub use file_emitter::FileModuleEmitter;
pub use markers::Region;
pub use renderer::{render_module, render_region};
