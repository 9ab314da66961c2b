use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::memory_size::MemorySize;

/// Discrete runtime state of a VM, as reported by its hypervisor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VmState {
    Off,
    Stopped,
    Starting,
    Running,
    Suspending,
    Suspended,
    Restarting,
    DelayedShutdown,
    Unknown,
}

impl VmState {
    /// Whether instance settings may be mutated in this state.
    /// Resizing cores/memory/disk requires the machine to be down.
    pub fn allows_modification(&self) -> bool {
        matches!(self, Self::Off | Self::Stopped)
    }
}

impl std::fmt::Display for VmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Suspending => write!(f, "suspending"),
            Self::Suspended => write!(f, "suspended"),
            Self::Restarting => write!(f, "restarting"),
            Self::DelayedShutdown => write!(f, "delayed shutdown"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Declared (target) resource configuration for an instance, persisted at
/// `<data_dir>/instance_specs.json`. Distinct from the live VM's runtime
/// state: the daemon reconciles backends toward these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmSpecs {
    /// Virtual core count, always >= 1.
    pub num_cores: u32,
    pub mem_size: MemorySize,
    pub disk_space: MemorySize,
    /// Host directory mounts: target path in the guest -> source on the host.
    #[serde(default)]
    pub mounts: BTreeMap<String, String>,
    /// Free-form backend/client annotations.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl VmSpecs {
    pub fn new(num_cores: u32, mem_size: MemorySize, disk_space: MemorySize) -> Self {
        Self {
            num_cores,
            mem_size,
            disk_space,
            mounts: BTreeMap::new(),
            metadata: serde_json::Value::Null,
        }
    }
}
