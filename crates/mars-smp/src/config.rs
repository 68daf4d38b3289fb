use mars_events::PollDetectorConfig;
use mars_sh2::{CpuId, Sh2Context};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for a single slice; keeps the two CPUs from drifting too far apart.
pub const MAX_SLICE_CYCLES: i32 = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmpConfig {
    /// Cycles granted to each CPU per slice.
    pub slice_cycles: i32,
    /// Run the master before the slave within a slice.
    pub master_first: bool,
    /// Skip the executor for a CPU the poll detector reports as spinning.
    pub skip_polling: bool,
    /// Build contexts with their debug flag set.
    pub debug_contexts: bool,
    pub poll: PollDetectorConfig,
}

impl Default for SmpConfig {
    fn default() -> Self {
        Self {
            slice_cycles: 1024,
            master_first: true,
            skip_polling: true,
            debug_contexts: false,
            poll: PollDetectorConfig::default(),
        }
    }
}

impl SmpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slice_cycles <= 0 {
            return Err(ConfigError::NonPositiveSlice(self.slice_cycles));
        }
        if self.slice_cycles > MAX_SLICE_CYCLES {
            return Err(ConfigError::SliceTooLarge {
                cycles: self.slice_cycles,
                max: MAX_SLICE_CYCLES,
            });
        }
        Ok(())
    }

    /// Execution order within one slice.
    pub fn order(&self) -> [CpuId; 2] {
        if self.master_first {
            [CpuId::Master, CpuId::Slave]
        } else {
            [CpuId::Slave, CpuId::Master]
        }
    }

    /// Builds the master and slave contexts.
    pub fn contexts(&self) -> (Sh2Context, Sh2Context) {
        (
            Sh2Context::with_debug(CpuId::Master, self.debug_contexts),
            Sh2Context::with_debug(CpuId::Slave, self.debug_contexts),
        )
    }
}
