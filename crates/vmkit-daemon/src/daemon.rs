//! Daemon wiring: owns the registry, the hypervisor backend, the spec
//! store, and the settings router, and mediates instance lifecycle
//! operations between them.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{error, info, warn};
use vmkit_core::instance::{VmSpecs, VmState};

use crate::persist::SpecStore;
use crate::registry::InstanceRegistry;
use crate::settings::SettingsRegistry;
use crate::settings::error::SettingsError;
use crate::settings::handler::{InstanceSettingsHandler, Persister};
use crate::vm::VmBackend;

pub struct Daemon {
    registry: Arc<Mutex<InstanceRegistry>>,
    backend: Box<dyn VmBackend>,
    store: Arc<SpecStore>,
    settings: SettingsRegistry,
}

fn lock(registry: &Mutex<InstanceRegistry>) -> MutexGuard<'_, InstanceRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn persist_specs(registry: &Mutex<InstanceRegistry>, store: &SpecStore) {
    let reg = lock(registry);
    if let Err(err) = store.save(reg.specs()) {
        error!(%err, "failed to persist instance specs");
    }
}

impl Daemon {
    /// Bring up the daemon state: reload persisted specs and re-instantiate
    /// their VMs through the backend, then wire the settings router.
    /// Instances the backend can no longer produce are logged and skipped.
    pub fn new(data_dir: &Path, backend: Box<dyn VmBackend>) -> Result<Self> {
        let store = Arc::new(SpecStore::new(data_dir));
        let registry = Arc::new(Mutex::new(InstanceRegistry::new()));

        let persisted = store.load().context("loading instance specs")?;
        {
            let mut reg = lock(&registry);
            for (name, specs) in persisted {
                match backend.create_vm(&name, &specs) {
                    Ok(vm) => {
                        reg.begin_preparing(&name)?;
                        reg.finish_preparing(&name, vm, specs)?;
                        info!(instance = %name, "recovered instance");
                    }
                    Err(err) => warn!(instance = %name, %err, "failed to recover instance"),
                }
            }
        }

        let persister: Persister = {
            let registry = Arc::clone(&registry);
            let store = Arc::clone(&store);
            Box::new(move || persist_specs(&registry, &store))
        };
        let mut settings = SettingsRegistry::new();
        settings.register(Box::new(InstanceSettingsHandler::new(
            Arc::clone(&registry),
            persister,
        )));

        Ok(Self {
            registry,
            backend,
            store,
            settings,
        })
    }

    /// Provision a new instance. The name is held in the preparing set for
    /// the duration of the backend call, which blocks settings mutations
    /// against it.
    pub fn create_instance(&mut self, name: &str, specs: VmSpecs) -> Result<()> {
        if specs.num_cores < 1 {
            bail!("an instance needs at least one core: {name}");
        }
        lock(&self.registry).begin_preparing(name)?;

        let vm = match self.backend.create_vm(name, &specs) {
            Ok(vm) => vm,
            Err(err) => {
                lock(&self.registry).abort_preparing(name);
                return Err(err.context(format!("creating instance {name}")));
            }
        };

        lock(&self.registry).finish_preparing(name, vm, specs)?;
        self.persist();
        info!(instance = name, "instance created");
        Ok(())
    }

    pub fn start(&mut self, name: &str) -> Result<()> {
        let mut reg = lock(&self.registry);
        let vm = reg
            .vm_mut(name)
            .ok_or_else(|| anyhow!("no such instance: {name}"))?;
        vm.start()?;
        info!(instance = name, "instance started");
        Ok(())
    }

    pub fn stop(&mut self, name: &str) -> Result<()> {
        let mut reg = lock(&self.registry);
        let vm = reg
            .vm_mut(name)
            .ok_or_else(|| anyhow!("no such instance: {name}"))?;
        vm.shutdown()?;
        info!(instance = name, "instance stopped");
        Ok(())
    }

    pub fn suspend(&mut self, name: &str) -> Result<()> {
        let mut reg = lock(&self.registry);
        let vm = reg
            .vm_mut(name)
            .ok_or_else(|| anyhow!("no such instance: {name}"))?;
        vm.suspend()?;
        info!(instance = name, "instance suspended");
        Ok(())
    }

    /// Soft-delete: shut the machine down if needed and move it to the
    /// deleted set. Its spec survives until [`Daemon::purge_instance`].
    pub fn delete_instance(&mut self, name: &str) -> Result<()> {
        {
            let mut reg = lock(&self.registry);
            let vm = reg
                .vm_mut(name)
                .ok_or_else(|| anyhow!("no such instance: {name}"))?;
            if !vm.current_state().allows_modification() {
                vm.shutdown()
                    .with_context(|| format!("shutting down {name}"))?;
            }
            reg.mark_deleted(name)?;
        }
        info!(instance = name, "instance deleted");
        Ok(())
    }

    pub fn recover_instance(&mut self, name: &str) -> Result<()> {
        lock(&self.registry).recover(name)?;
        info!(instance = name, "instance recovered");
        Ok(())
    }

    pub fn purge_instance(&mut self, name: &str) -> Result<()> {
        lock(&self.registry).purge(name)?;
        self.persist();
        info!(instance = name, "instance purged");
        Ok(())
    }

    /// Runtime state of an active instance, as its backend reports it.
    pub fn instance_state(&self, name: &str) -> Result<VmState> {
        let reg = lock(&self.registry);
        let vm = reg
            .vm(name)
            .ok_or_else(|| anyhow!("no such instance: {name}"))?;
        Ok(vm.current_state())
    }

    pub fn settings_keys(&self) -> Vec<String> {
        self.settings.keys()
    }

    pub fn get_setting(&self, key: &str) -> Result<String, SettingsError> {
        self.settings.get(key)
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.settings.set(key, value)
    }

    /// Shared registry handle, for subsystems that need direct access.
    pub fn registry(&self) -> Arc<Mutex<InstanceRegistry>> {
        Arc::clone(&self.registry)
    }

    fn persist(&self) {
        persist_specs(&self.registry, &self.store);
    }
}
