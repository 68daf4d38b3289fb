use std::fmt;

use mars_sh2::CpuId;
use serde::{Deserialize, Serialize};

/// Kinds of system event that can be broadcast to one CPU's listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SysEvent {
    None,
    /// Interrupt line change.
    Int,
    Sys,
    Sdram,
    /// Master/slave communication port write.
    Comm,
    Dma,
    Pwm,
    Vdp,
    /// The CPU has been detected spinning on a memory location.
    StartPolling,
}

impl SysEvent {
    pub const ALL: [SysEvent; 9] = [
        SysEvent::None,
        SysEvent::Int,
        SysEvent::Sys,
        SysEvent::Sdram,
        SysEvent::Comm,
        SysEvent::Dma,
        SysEvent::Pwm,
        SysEvent::Vdp,
        SysEvent::StartPolling,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SysEvent::None => "NONE",
            SysEvent::Int => "INT",
            SysEvent::Sys => "SYS",
            SysEvent::Sdram => "SDRAM",
            SysEvent::Comm => "COMM",
            SysEvent::Dma => "DMA",
            SysEvent::Pwm => "PWM",
            SysEvent::Vdp => "VDP",
            SysEvent::StartPolling => "START_POLLING",
        }
    }
}

impl fmt::Display for SysEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback invoked by [`crate::SysEventManager::fire_event`].
pub trait SysEventListener: Send + Sync {
    fn on_sys_event(&self, cpu: CpuId, event: SysEvent);
}

impl<F> SysEventListener for F
where
    F: Fn(CpuId, SysEvent) + Send + Sync,
{
    fn on_sys_event(&self, cpu: CpuId, event: SysEvent) {
        self(cpu, event)
    }
}
