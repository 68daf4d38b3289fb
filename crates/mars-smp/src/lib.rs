//! Cooperative slice driver for the master/slave SH2 pair.

#![forbid(unsafe_code)]

mod config;
mod error;
mod scheduler;

pub use config::{SmpConfig, MAX_SLICE_CYCLES};
pub use error::{ConfigError, Result, SmpError};
pub use scheduler::{DualSh2Scheduler, Sh2Executor, SliceReport};
