use std::collections::HashMap;
use std::sync::Arc;

use mars_sh2::CpuId;
use parking_lot::Mutex;

use crate::error::{EventError, Result};
use crate::event::{SysEvent, SysEventListener};

type Listeners = HashMap<String, Arc<dyn SysEventListener>>;

/// Named listener registry, one map per CPU.
///
/// All operations take `&self` so the manager can be shared as an `Arc` between the
/// subsystems that publish and subscribe. Listeners are called with the registry unlocked,
/// which lets a callback register or remove listeners (itself included) while an event is
/// being fired.
#[derive(Default)]
pub struct SysEventManager {
    listeners: Mutex<[Listeners; 2]>,
}

impl SysEventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` under `name` for `cpu`. An existing registration under the same
    /// name is left in place and reported as an error.
    pub fn register_listener(
        &self,
        cpu: CpuId,
        name: impl Into<String>,
        listener: Arc<dyn SysEventListener>,
    ) -> Result<()> {
        let name = name.into();
        let mut listeners = self.listeners.lock();
        let map = &mut listeners[cpu.index()];
        if map.contains_key(&name) {
            tracing::warn!(cpu = %cpu, name = %name, "duplicate sys event listener");
            return Err(EventError::AlreadyRegistered { cpu, name });
        }
        tracing::debug!(cpu = %cpu, name = %name, "sys event listener registered");
        map.insert(name, listener);
        Ok(())
    }

    /// Registers the same listener under `name` for both CPUs.
    ///
    /// All or nothing: if either CPU already has `name`, neither side is touched and the
    /// conflict is returned (master checked first).
    pub fn register_listener_all(
        &self,
        name: impl Into<String>,
        listener: Arc<dyn SysEventListener>,
    ) -> Result<()> {
        let name = name.into();
        let mut listeners = self.listeners.lock();
        if let Some(cpu) = CpuId::ALL
            .into_iter()
            .find(|cpu| listeners[cpu.index()].contains_key(&name))
        {
            tracing::warn!(cpu = %cpu, name = %name, "duplicate sys event listener");
            return Err(EventError::AlreadyRegistered { cpu, name });
        }
        for map in listeners.iter_mut() {
            map.insert(name.clone(), listener.clone());
        }
        tracing::debug!(name = %name, "sys event listener registered for both cpus");
        Ok(())
    }

    /// Removes whatever is registered under `name` for `cpu`.
    pub fn remove_listener(&self, cpu: CpuId, name: &str) -> bool {
        let removed = self.listeners.lock()[cpu.index()].remove(name).is_some();
        if removed {
            tracing::debug!(cpu = %cpu, name, "sys event listener removed");
        }
        removed
    }

    /// Removes `name` from both CPUs and returns how many registrations existed.
    pub fn remove_listener_all(&self, name: &str) -> usize {
        CpuId::ALL
            .into_iter()
            .filter(|cpu| self.remove_listener(*cpu, name))
            .count()
    }

    /// Calls every listener registered for `cpu` and returns how many were called.
    ///
    /// The listener set is captured before the first call. Listeners added during the fire are
    /// not called until the next event; listeners removed during the fire are still called for
    /// this one. A panicking listener unwinds out of this call and skips the rest.
    pub fn fire_event(&self, cpu: CpuId, event: SysEvent) -> usize {
        let snapshot: Vec<Arc<dyn SysEventListener>> =
            self.listeners.lock()[cpu.index()].values().cloned().collect();
        tracing::trace!(cpu = %cpu, %event, listeners = snapshot.len(), "fire sys event");
        for listener in &snapshot {
            listener.on_sys_event(cpu, event);
        }
        snapshot.len()
    }

    /// Fires `event` for the master, then the slave.
    pub fn fire_event_all(&self, event: SysEvent) -> usize {
        CpuId::ALL
            .into_iter()
            .map(|cpu| self.fire_event(cpu, event))
            .sum()
    }

    pub fn is_registered(&self, cpu: CpuId, name: &str) -> bool {
        self.listeners.lock()[cpu.index()].contains_key(name)
    }

    pub fn listener_count(&self, cpu: CpuId) -> usize {
        self.listeners.lock()[cpu.index()].len()
    }

    /// Registered names for `cpu`, sorted.
    pub fn listener_names(&self, cpu: CpuId) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.lock()[cpu.index()].keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for SysEventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysEventManager")
            .field("master", &self.listener_names(CpuId::Master))
            .field("slave", &self.listener_names(CpuId::Slave))
            .finish()
    }
}
