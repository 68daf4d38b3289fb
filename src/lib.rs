//! 32X dual-SH2 core plumbing.
//!
//! - [`sh2`]: per-CPU execution context and the bus access layer.
//! - [`events`]: named, per-CPU system event listeners and poll detection.
//! - [`smp`]: cooperative slice driver for the master/slave pair.

#![forbid(unsafe_code)]

pub use mars_events as events;
pub use mars_sh2 as sh2;
pub use mars_smp as smp;

pub use mars_events::{SysEvent, SysEventListener, SysEventManager};
pub use mars_sh2::{CpuId, Sh2Context};
pub use mars_smp::{DualSh2Scheduler, SmpConfig};
