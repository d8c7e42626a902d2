//! Outbound ports - Interfaces that the application requires from external systems

mod clock_port;
mod entity_registry_port;
mod module_emitter_port;
mod project_root_port;

pub use clock_port::ClockPort;
pub use entity_registry_port::{BindingError, EntityRegistryPort, RegistryError};
pub use module_emitter_port::{EmitError, EmitOutcome, ModuleEmitterPort};
pub use project_root_port::ProjectRootPort;

#[cfg(test)]
pub use entity_registry_port::MockEntityRegistryPort;
#[cfg(test)]
pub use module_emitter_port::MockModuleEmitterPort;
#[cfg(test)]
pub use project_root_port::MockProjectRootPort;
