use mars_sh2::CpuId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EventError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("listener {name:?} is already registered for {cpu}")]
    AlreadyRegistered { cpu: CpuId, name: String },
}
