//! `gstsync-core`: shared value types for GST compliance tooling.
//!
//! This crate contains **pure** primitives (no IO, no runtime concerns).

pub mod error;
pub mod id;
pub mod period;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{PollId, ReferenceId};
pub use period::ReturnPeriod;
pub use value_object::ValueObject;
