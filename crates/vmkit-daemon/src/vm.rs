use anyhow::Result;
use vmkit_core::instance::{VmSpecs, VmState};
use vmkit_core::memory_size::MemorySize;

/// Handle to a live (or potentially live) VM, implemented per hypervisor.
///
/// The daemon is the long-lived owner of these handles, via the
/// [`crate::registry::InstanceRegistry`]. Resource-change operations
/// (`update_cpus`, `resize_memory`, `resize_disk`) apply synchronously or
/// report failure through their `Result`; callers must only invoke them
/// while the machine is down (see [`VmState::allows_modification`]).
pub trait VirtualMachine: Send {
    /// Stable instance identity; matches the registry/spec-store key.
    fn name(&self) -> &str;

    fn current_state(&self) -> VmState;

    fn start(&mut self) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
    fn suspend(&mut self) -> Result<()>;

    fn update_cpus(&mut self, cpus: u32) -> Result<()>;
    fn resize_memory(&mut self, size: MemorySize) -> Result<()>;
    fn resize_disk(&mut self, size: MemorySize) -> Result<()>;
}

/// Hypervisor factory seam: turns a name and declared specs into a
/// concrete [`VirtualMachine`]. Process-spawning mechanics live entirely
/// behind this trait.
pub trait VmBackend: Send {
    fn create_vm(&self, name: &str, specs: &VmSpecs) -> Result<Box<dyn VirtualMachine>>;
}
