use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};
use vmkit_core::instance::VmSpecs;

use crate::vm::VirtualMachine;

/// Daemon-owned instance collections.
///
/// Partition invariants, enforced by the mutating methods:
/// - a name is in at most one of {active, deleted};
/// - preparing names have no entry in active or deleted;
/// - `specs` keeps an entry for every active or deleted instance (specs
///   survive soft deletion and are only dropped on purge).
#[derive(Default)]
pub struct InstanceRegistry {
    specs: HashMap<String, VmSpecs>,
    active: HashMap<String, Box<dyn VirtualMachine>>,
    deleted: HashMap<String, Box<dyn VirtualMachine>>,
    preparing: HashSet<String>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name while the backend provisions it. The name must not
    /// be known to the registry in any form.
    pub fn begin_preparing(&mut self, name: &str) -> Result<()> {
        if self.active.contains_key(name) || self.deleted.contains_key(name) {
            bail!("instance already exists: {name}");
        }
        if !self.preparing.insert(name.to_string()) {
            bail!("instance is already being prepared: {name}");
        }
        Ok(())
    }

    /// Drop a reservation after a failed provisioning attempt.
    pub fn abort_preparing(&mut self, name: &str) {
        self.preparing.remove(name);
    }

    /// Promote a prepared name to active, recording its handle and specs.
    pub fn finish_preparing(
        &mut self,
        name: &str,
        vm: Box<dyn VirtualMachine>,
        specs: VmSpecs,
    ) -> Result<()> {
        if !self.preparing.remove(name) {
            bail!("instance was not being prepared: {name}");
        }
        self.specs.insert(name.to_string(), specs);
        self.active.insert(name.to_string(), vm);
        Ok(())
    }

    /// Soft-delete: active -> deleted. The spec entry is retained so the
    /// instance can be recovered with its configuration intact.
    pub fn mark_deleted(&mut self, name: &str) -> Result<()> {
        let Some(vm) = self.active.remove(name) else {
            bail!("no such instance: {name}");
        };
        self.deleted.insert(name.to_string(), vm);
        Ok(())
    }

    /// Undo a soft delete: deleted -> active.
    pub fn recover(&mut self, name: &str) -> Result<()> {
        let Some(vm) = self.deleted.remove(name) else {
            bail!("instance is not deleted: {name}");
        };
        self.active.insert(name.to_string(), vm);
        Ok(())
    }

    /// Drop a soft-deleted instance for good, spec included.
    pub fn purge(&mut self, name: &str) -> Result<()> {
        if self.deleted.remove(name).is_none() {
            bail!("instance is not deleted: {name}");
        }
        self.specs.remove(name);
        Ok(())
    }

    pub fn specs(&self) -> &HashMap<String, VmSpecs> {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<&VmSpecs> {
        self.specs.get(name)
    }

    pub fn vm(&self, name: &str) -> Option<&dyn VirtualMachine> {
        self.active.get(name).map(|vm| vm.as_ref())
    }

    pub fn vm_mut(&mut self, name: &str) -> Option<&mut (dyn VirtualMachine + '_)> {
        match self.active.get_mut(name) {
            Some(vm) => Some(vm.as_mut()),
            None => None,
        }
    }

    /// Mutable handle and spec for the same active instance, borrowed
    /// together so resize operations can update both in one pass.
    pub fn vm_and_spec_mut(
        &mut self,
        name: &str,
    ) -> Option<(&mut (dyn VirtualMachine + '_), &mut VmSpecs)> {
        let vm = self.active.get_mut(name)?;
        let spec = self.specs.get_mut(name)?;
        Some((vm.as_mut(), spec))
    }

    pub fn has_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.deleted.contains_key(name)
    }

    pub fn is_preparing(&self, name: &str) -> bool {
        self.preparing.contains(name)
    }

    pub fn active_names(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }
}
