// vmkit-core: Value types, instance specs, VM states
// No internal vmkit dependencies — this is the foundation crate.

pub mod instance;
pub mod memory_size;

pub use instance::{VmSpecs, VmState};
pub use memory_size::{InvalidMemorySize, MemorySize};
