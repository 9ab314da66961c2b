//! In-memory VM fakes shared by the daemon unit tests.

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use vmkit_core::instance::{VmSpecs, VmState};
use vmkit_core::memory_size::MemorySize;

use crate::vm::{VirtualMachine, VmBackend};

/// Call log shared between a [`FakeVm`] and the test that created it.
#[derive(Clone, Default)]
pub struct VmCallLog(pub Arc<Mutex<Vec<String>>>);

impl VmCallLog {
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }
}

pub struct FakeVm {
    name: String,
    state: Arc<Mutex<VmState>>,
    log: VmCallLog,
    /// When set, every mutating operation fails.
    pub fail_ops: bool,
}

impl FakeVm {
    pub fn new(name: &str, state: VmState) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(state)),
            log: VmCallLog::default(),
            fail_ops: false,
        }
    }

    pub fn stopped(name: &str) -> Self {
        Self::new(name, VmState::Stopped)
    }

    /// Shared handle for flipping the reported state after the VM has
    /// been boxed into a registry.
    pub fn state_handle(&self) -> Arc<Mutex<VmState>> {
        Arc::clone(&self.state)
    }

    pub fn log_handle(&self) -> VmCallLog {
        self.log.clone()
    }

    fn apply(&self, call: String) -> Result<()> {
        if self.fail_ops {
            bail!("backend refused: {call}");
        }
        self.log.record(call);
        Ok(())
    }
}

impl VirtualMachine for FakeVm {
    fn name(&self) -> &str {
        &self.name
    }

    fn current_state(&self) -> VmState {
        *self.state.lock().unwrap()
    }

    fn start(&mut self) -> Result<()> {
        self.apply("start".into())?;
        *self.state.lock().unwrap() = VmState::Running;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.apply("shutdown".into())?;
        *self.state.lock().unwrap() = VmState::Stopped;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.apply("suspend".into())?;
        *self.state.lock().unwrap() = VmState::Suspended;
        Ok(())
    }

    fn update_cpus(&mut self, cpus: u32) -> Result<()> {
        self.apply(format!("update_cpus({cpus})"))
    }

    fn resize_memory(&mut self, size: MemorySize) -> Result<()> {
        self.apply(format!("resize_memory({})", size.in_bytes()))
    }

    fn resize_disk(&mut self, size: MemorySize) -> Result<()> {
        self.apply(format!("resize_disk({})", size.in_bytes()))
    }
}

/// Backend producing stopped [`FakeVm`]s; records created names.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub created: Arc<Mutex<Vec<String>>>,
}

impl VmBackend for FakeBackend {
    fn create_vm(&self, name: &str, _specs: &VmSpecs) -> Result<Box<dyn VirtualMachine>> {
        self.created.lock().unwrap().push(name.to_string());
        Ok(Box::new(FakeVm::stopped(name)))
    }
}
