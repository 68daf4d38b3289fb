//! Per-CPU state and memory access contracts for the 32X dual-SH2 pair.
//!
//! [`Sh2Context`] holds everything an interpreter or recompiler needs to pause and resume one
//! SH2 core. [`Sh2Bus`] is the concrete accessor layer the execution loops call into; it sits on
//! top of the minimal [`Sh2Memory`] capability implemented by the system bus.

#![forbid(unsafe_code)]

mod bus;
mod context;
mod cpu;
mod fetch;
mod flat;

pub use bus::{AccessSize, CacheControl, Sh2Bus, Sh2Memory};
pub use context::{DeviceHandle, Sh2Context, SR_POWER_ON};
pub use cpu::CpuId;
pub use fetch::{BlockRef, FetchResult};
pub use flat::FlatMemory;
