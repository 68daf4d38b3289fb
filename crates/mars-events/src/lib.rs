//! Cross-CPU system event notification for the SH2 pair.
//!
//! Subsystems (interrupt controller, DMA, PWM, VDP, poll detection) subscribe to a
//! [`SysEventManager`] by name, separately for each CPU, and get called back synchronously
//! whenever an event concerning that CPU is fired.

#![forbid(unsafe_code)]

mod error;
mod event;
mod manager;
mod poll;

pub use error::{EventError, Result};
pub use event::{SysEvent, SysEventListener};
pub use manager::SysEventManager;
pub use poll::{PollDetector, PollDetectorConfig, POLLER_NAME};
