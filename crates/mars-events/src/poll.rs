use std::sync::{Arc, Weak};

use mars_sh2::CpuId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::{SysEvent, SysEventListener};
use crate::manager::SysEventManager;

/// Name the detector registers under on both CPUs.
pub const POLLER_NAME: &str = "poller";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollDetectorConfig {
    /// Unregister from a CPU after its first wake-up.
    pub one_shot: bool,
    /// Events that end a poll.
    pub wake_events: Vec<SysEvent>,
}

impl Default for PollDetectorConfig {
    fn default() -> Self {
        Self {
            one_shot: false,
            wake_events: vec![
                SysEvent::Int,
                SysEvent::Sys,
                SysEvent::Sdram,
                SysEvent::Comm,
                SysEvent::Dma,
                SysEvent::Pwm,
                SysEvent::Vdp,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PollState {
    polling: bool,
    polls_started: u64,
    wakeups: u64,
}

/// Tracks which CPUs are spin-waiting.
///
/// `START_POLLING` marks a CPU as polling; any configured wake event for that CPU clears it.
/// The scheduler uses [`PollDetector::is_polling`] to skip slices of a CPU that would only spin.
#[derive(Debug)]
pub struct PollDetector {
    config: PollDetectorConfig,
    state: Mutex<[PollState; 2]>,
    manager: Weak<SysEventManager>,
}

impl PollDetector {
    /// Creates a detector and registers it for both CPUs under [`POLLER_NAME`].
    pub fn attach(
        manager: &Arc<SysEventManager>,
        config: PollDetectorConfig,
    ) -> Result<Arc<PollDetector>> {
        let detector = Arc::new(PollDetector {
            config,
            state: Mutex::new([PollState::default(); 2]),
            manager: Arc::downgrade(manager),
        });
        manager.register_listener_all(POLLER_NAME, detector.clone())?;
        Ok(detector)
    }

    pub fn config(&self) -> &PollDetectorConfig {
        &self.config
    }

    pub fn is_polling(&self, cpu: CpuId) -> bool {
        self.state.lock()[cpu.index()].polling
    }

    pub fn polls_started(&self, cpu: CpuId) -> u64 {
        self.state.lock()[cpu.index()].polls_started
    }

    pub fn wakeups(&self, cpu: CpuId) -> u64 {
        self.state.lock()[cpu.index()].wakeups
    }

    /// Forces `cpu` out of the polling state without counting a wake-up.
    pub fn clear(&self, cpu: CpuId) {
        self.state.lock()[cpu.index()].polling = false;
    }

    fn wake(&self, cpu: CpuId, event: SysEvent) -> bool {
        let mut state = self.state.lock();
        let slot = &mut state[cpu.index()];
        if !slot.polling {
            return false;
        }
        slot.polling = false;
        slot.wakeups += 1;
        tracing::debug!(cpu = %cpu, %event, "poll ended");
        true
    }
}

impl SysEventListener for PollDetector {
    fn on_sys_event(&self, cpu: CpuId, event: SysEvent) {
        match event {
            SysEvent::StartPolling => {
                let mut state = self.state.lock();
                let slot = &mut state[cpu.index()];
                if !slot.polling {
                    slot.polling = true;
                    slot.polls_started += 1;
                    tracing::debug!(cpu = %cpu, "poll started");
                }
            }
            event if self.config.wake_events.contains(&event) => {
                if self.wake(cpu, event) && self.config.one_shot {
                    if let Some(manager) = self.manager.upgrade() {
                        manager.remove_listener(cpu, POLLER_NAME);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wake_events_exclude_none_and_start() {
        let config = PollDetectorConfig::default();
        assert!(!config.wake_events.contains(&SysEvent::None));
        assert!(!config.wake_events.contains(&SysEvent::StartPolling));
        assert_eq!(config.wake_events.len(), 7);
    }

    #[test]
    fn repeated_start_counts_once() {
        let manager = Arc::new(SysEventManager::new());
        let detector = PollDetector::attach(&manager, PollDetectorConfig::default()).unwrap();
        manager.fire_event(CpuId::Master, SysEvent::StartPolling);
        manager.fire_event(CpuId::Master, SysEvent::StartPolling);
        assert_eq!(detector.polls_started(CpuId::Master), 1);
        assert!(detector.is_polling(CpuId::Master));
        assert!(!detector.is_polling(CpuId::Slave));

        manager.fire_event(CpuId::Master, SysEvent::None);
        assert!(detector.is_polling(CpuId::Master));

        detector.clear(CpuId::Master);
        assert!(!detector.is_polling(CpuId::Master));
        assert_eq!(detector.wakeups(CpuId::Master), 0);
    }
}
