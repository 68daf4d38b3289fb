use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two symmetric SH2 cores on the 32X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuId {
    Master,
    Slave,
}

impl CpuId {
    pub const ALL: [CpuId; 2] = [CpuId::Master, CpuId::Slave];

    /// Dense index suitable for `[T; 2]` per-CPU tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            CpuId::Master => 0,
            CpuId::Slave => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CpuId::Master => "MASTER",
            CpuId::Slave => "SLAVE",
        }
    }

    /// Single-character tag used in traces: the first character of [`CpuId::name`].
    pub fn type_code(self) -> char {
        // Names are non-empty ASCII literals.
        self.name().chars().next().unwrap_or('?')
    }

    pub const fn other(self) -> CpuId {
        match self {
            CpuId::Master => CpuId::Slave,
            CpuId::Slave => CpuId::Master,
        }
    }
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
