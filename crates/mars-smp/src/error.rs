use mars_events::EventError;
use mars_sh2::CpuId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmpError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("slice_cycles must be positive (got {0})")]
    NonPositiveSlice(i32),

    #[error("slice_cycles {cycles} exceeds maximum {max}")]
    SliceTooLarge { cycles: i32, max: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmpError {
    #[error("invalid smp config: {0}")]
    Config(#[from] ConfigError),

    #[error("poll detector: {0}")]
    Event(#[from] EventError),

    #[error("context for {got} passed in the {expected} slot")]
    WrongContext { expected: CpuId, got: CpuId },
}
