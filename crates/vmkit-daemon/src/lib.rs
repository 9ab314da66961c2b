//! vmkit-daemon: daemon-side instance management.
//!
//! Owns the instance registry (active/deleted/preparing partitions), the
//! settings subsystem that mediates get/set access to per-instance
//! configuration, and durable persistence of instance specs. Hypervisor
//! backends plug in through the [`vm::VirtualMachine`] and
//! [`vm::VmBackend`] traits.

pub mod config;
pub mod daemon;
pub mod logging;
pub mod persist;
pub mod registry;
pub mod settings;
pub mod vm;

#[cfg(test)]
pub(crate) mod testutil;

pub use daemon::Daemon;
pub use registry::InstanceRegistry;
pub use settings::error::SettingsError;
