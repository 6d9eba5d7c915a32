use thiserror::Error;

/// Number of timestamps a round-trip exchange record must carry.
pub const EXCHANGE_LEN: usize = 5;

/// The exchange did not carry exactly [`EXCHANGE_LEN`] timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid timestamp exchange: expected 5 timestamps, got {len}")]
pub struct InvalidInputError {
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("empty exchange record")]
    Empty,
    #[error("invalid device id {0:?}")]
    BadDevice(String),
    #[error("field {index} is not a finite number: {raw:?}")]
    BadField { index: usize, raw: String },
    #[error("device {0} is not configured")]
    UnknownDevice(u32),
    #[error(transparent)]
    Invalid(#[from] InvalidInputError),
}
