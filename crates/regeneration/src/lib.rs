//! `gstsync-regeneration`: start and track server-side return regeneration.
//!
//! ## Design
//!
//! - The server does the work; this crate only starts a job and polls it
//! - Polling follows a fixed retry schedule (no open-ended retries)
//! - The transition table lives in [`PollMachine`], free of IO and timers
//! - Waiting goes through an injected [`Sleeper`] so tests never touch the clock
//!
//! ## Components
//!
//! - `RetrySchedule`: immutable list of waits shared by all polls
//! - `PollMachine`: attempt counter + terminal states
//! - `RegenerationService`: the remote collaborator (start / check status)
//! - `RegenerationPoller`: async driver tying the three together

pub mod machine;
pub mod poller;
pub mod regenerate;
pub mod schedule;
pub mod service;
pub mod sleeper;
pub mod types;

pub use machine::{PollMachine, PollState, Transition, TransportFailurePolicy};
pub use poller::{PollError, RegenerationPoller};
pub use regenerate::{RegenerateError, RegenerationRequest, RegenerationResult};
pub use schedule::{DEFAULT_SCHEDULE_MS, RetrySchedule};
pub use service::{RegenerationService, ServiceError};
pub use sleeper::{Sleeper, TokioSleeper};
pub use types::{
    EXHAUSTED_MESSAGE, ErrorClass, JobReference, PollOutcome, ReturnType, StartOutcome,
    StartResponse, StatusCode, StatusResponse,
};
