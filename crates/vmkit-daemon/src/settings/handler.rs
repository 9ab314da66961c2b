//! Instance settings: mediates get/set access to per-instance cores,
//! memory, and disk, enforcing state-dependent mutation rules.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vmkit_core::instance::VmSpecs;
use vmkit_core::memory_size::{InvalidMemorySize, MemorySize};

use super::SettingsHandler;
use super::error::{InstanceFailure, Operation, SettingsError};
use super::keys::{self, Property};
use crate::registry::InstanceRegistry;
use crate::vm::VirtualMachine;

/// Zero-argument durability hook, invoked after every successful set(),
/// no-ops included. Its own failure handling is the owner's concern.
pub type Persister = Box<dyn Fn() + Send + Sync>;

/// Handler for the `local.<instance>.<property>` namespace.
///
/// Shares the daemon's registry; the daemon serializes settings mutations,
/// the mutex makes the sharing explicit. All validation runs before any
/// mutation, so a rejected request leaves VM and spec untouched.
pub struct InstanceSettingsHandler {
    registry: Arc<Mutex<InstanceRegistry>>,
    persister: Persister,
}

impl InstanceSettingsHandler {
    pub fn new(registry: Arc<Mutex<InstanceRegistry>>, persister: Persister) -> Self {
        Self {
            registry,
            persister,
        }
    }

    fn lock(&self) -> MutexGuard<'_, InstanceRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsHandler for InstanceSettingsHandler {
    fn keys(&self) -> Vec<String> {
        keys::template_keys()
    }

    fn get(&self, key: &str) -> Result<String, SettingsError> {
        let (instance, property) = keys::parse_key(key)?;

        let registry = self.lock();
        let spec = registry.spec(&instance).ok_or_else(|| {
            SettingsError::instance(Operation::Obtain, &instance, InstanceFailure::NotFound)
        })?;

        Ok(match property {
            Property::Cpus => spec.num_cores.to_string(),
            Property::Memory => format!("{} bytes", spec.mem_size.in_bytes()),
            Property::Disk => format!("{} bytes", spec.disk_space.in_bytes()),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let (instance, property) = keys::parse_key(key)?;

        {
            let mut registry = self.lock();

            if registry.is_preparing(&instance) {
                return Err(SettingsError::instance(
                    Operation::Modify,
                    &instance,
                    InstanceFailure::Preparing,
                ));
            }
            if !registry.has_active(&instance) {
                let failure = if registry.is_deleted(&instance) {
                    InstanceFailure::Deleted
                } else {
                    InstanceFailure::NotFound
                };
                return Err(SettingsError::instance(Operation::Modify, &instance, failure));
            }

            let (vm, spec) = registry.vm_and_spec_mut(&instance).ok_or_else(|| {
                SettingsError::instance(Operation::Modify, &instance, InstanceFailure::NotFound)
            })?;
            if !vm.current_state().allows_modification() {
                return Err(SettingsError::instance(
                    Operation::Modify,
                    &instance,
                    InstanceFailure::WrongState,
                ));
            }

            match property {
                Property::Cpus => update_cpus(key, value, vm, spec)?,
                Property::Memory | Property::Disk => {
                    let size = parse_size(key, value)?;
                    if property == Property::Memory {
                        update_mem(key, value, vm, spec, size)?;
                    } else {
                        update_disk(key, value, vm, spec, size)?;
                    }
                }
            }
        } // lock released: the persister re-enters the registry to snapshot specs

        (self.persister)();
        Ok(())
    }
}

fn parse_size(key: &str, value: &str) -> Result<MemorySize, SettingsError> {
    value
        .parse()
        .map_err(|e: InvalidMemorySize| SettingsError::invalid(key, value, e.to_string()))
}

fn update_cpus(
    key: &str,
    value: &str,
    vm: &mut dyn VirtualMachine,
    spec: &mut VmSpecs,
) -> Result<(), SettingsError> {
    let cpus = value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&cpus| cpus >= 1)
        .ok_or_else(|| SettingsError::invalid(key, value, "Need a positive decimal integer"))?;

    if cpus < spec.num_cores {
        return Err(SettingsError::invalid(
            key,
            value,
            "The number of cores can only be increased",
        ));
    }
    if cpus > spec.num_cores {
        vm.update_cpus(cpus)?;
        spec.num_cores = cpus;
    }
    // equal requested count falls through as a no-op
    Ok(())
}

fn update_mem(
    key: &str,
    value: &str,
    vm: &mut dyn VirtualMachine,
    spec: &mut VmSpecs,
    size: MemorySize,
) -> Result<(), SettingsError> {
    if size < spec.mem_size {
        return Err(SettingsError::invalid(key, value, "Memory can only be expanded"));
    }
    if size > spec.mem_size {
        vm.resize_memory(size)?;
        spec.mem_size = size;
    }
    Ok(())
}

fn update_disk(
    key: &str,
    value: &str,
    vm: &mut dyn VirtualMachine,
    spec: &mut VmSpecs,
    size: MemorySize,
) -> Result<(), SettingsError> {
    if size < spec.disk_space {
        return Err(SettingsError::invalid(key, value, "Disk can only be expanded"));
    }
    if size > spec.disk_space {
        vm.resize_disk(size)?;
        spec.disk_space = size;
    }
    Ok(())
}
