//! Clock-offset estimation from five-timestamp round-trip exchanges.
//!
//! [`compute_offset`] is the core estimator. [`session::CalibrationSession`]
//! tracks successive exchanges per device on top of it.

pub mod config;
pub mod error;
pub mod record;
pub mod session;
pub mod time;

pub use error::{InvalidInputError, RecordError};
pub use time::calc::{compute_offset, estimate, OffsetEstimate, TimestampExchange};
