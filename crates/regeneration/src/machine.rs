//! Poll state machine.
//!
//! Transition table:
//!
//! | state               | input                 | next                                  |
//! |---------------------|-----------------------|---------------------------------------|
//! | `InProgress(k)`     | `IP`, k + 1 < len     | `InProgress(k + 1)`, wait `schedule[k + 1]` |
//! | `InProgress(k)`     | `IP`, k + 1 == len    | `Finished(Exhausted)`                 |
//! | `InProgress(k)`     | any other code        | `Finished(Succeeded \| Failed)`       |
//! | `InProgress(k)`     | transport failure     | per [`TransportFailurePolicy`]        |
//! | `Finished`/`Abandoned` | anything           | unchanged                             |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schedule::RetrySchedule;
use crate::types::{PollOutcome, StatusResponse};

/// What to do when a status query gets no answer at all.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailurePolicy {
    /// Stop polling and surface the transport error to the caller.
    #[default]
    Abort,
    /// Count the failed query as an attempt and keep following the schedule.
    /// Running out of schedule this way still surfaces the transport error.
    Retry,
}

impl core::str::FromStr for TransportFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(TransportFailurePolicy::Abort),
            "retry" => Ok(TransportFailurePolicy::Retry),
            other => Err(format!(
                "unknown transport failure policy {other:?} (expected abort or retry)"
            )),
        }
    }
}

/// Where a poll currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for (or about to issue) query number `attempt + 1`.
    InProgress { attempt: usize },
    Finished(PollOutcome),
    /// Stopped after a transport failure; no outcome.
    Abandoned,
}

/// Result of feeding one query result into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Query again after `delay`.
    Retry { attempt: usize, delay: Duration },
    Finished(PollOutcome),
    Abandoned,
}

/// Attempt counter and terminal states for one poll.
///
/// Synchronous and clock-free: the caller waits [`PollMachine::next_delay`],
/// issues the query, then reports the result.
#[derive(Debug, Clone)]
pub struct PollMachine {
    schedule: RetrySchedule,
    transport_policy: TransportFailurePolicy,
    state: PollState,
    queries: usize,
}

impl PollMachine {
    pub fn new(schedule: RetrySchedule, transport_policy: TransportFailurePolicy) -> Self {
        Self {
            schedule,
            transport_policy,
            state: PollState::InProgress { attempt: 0 },
            queries: 0,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Zero-based index of the next query.
    pub fn attempt(&self) -> usize {
        match self.state {
            PollState::InProgress { attempt } => attempt,
            _ => self.queries,
        }
    }

    /// Status queries reported so far (answered or not).
    pub fn queries(&self) -> usize {
        self.queries
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, PollState::InProgress { .. })
    }

    /// Wait before the next query; `None` once the poll is over.
    pub fn next_delay(&self) -> Option<Duration> {
        match self.state {
            PollState::InProgress { attempt } => self.schedule.get(attempt),
            _ => None,
        }
    }

    /// Feed the answer to the query just issued.
    pub fn on_status(&mut self, response: StatusResponse) -> Transition {
        let attempt = match self.state {
            PollState::InProgress { attempt } => attempt,
            _ => return self.terminal_transition(),
        };
        self.queries += 1;

        if !response.status.is_in_progress() {
            let outcome = PollOutcome::from_terminal(response, self.queries);
            self.state = PollState::Finished(outcome.clone());
            return Transition::Finished(outcome);
        }

        self.advance(attempt)
    }

    /// Report that the query just issued got no answer.
    pub fn on_transport_failure(&mut self) -> Transition {
        let attempt = match self.state {
            PollState::InProgress { attempt } => attempt,
            _ => return self.terminal_transition(),
        };
        self.queries += 1;

        match self.transport_policy {
            TransportFailurePolicy::Abort => {
                self.state = PollState::Abandoned;
                Transition::Abandoned
            }
            TransportFailurePolicy::Retry => match self.advance(attempt) {
                // Out of schedule with the last query unanswered.
                Transition::Finished(PollOutcome::Exhausted { .. }) => {
                    self.state = PollState::Abandoned;
                    Transition::Abandoned
                }
                other => other,
            },
        }
    }

    fn advance(&mut self, attempt: usize) -> Transition {
        let next = attempt + 1;
        match self.schedule.get(next) {
            Some(delay) => {
                self.state = PollState::InProgress { attempt: next };
                Transition::Retry {
                    attempt: next,
                    delay,
                }
            }
            None => {
                let outcome = PollOutcome::exhausted(self.queries);
                self.state = PollState::Finished(outcome.clone());
                Transition::Finished(outcome)
            }
        }
    }

    fn terminal_transition(&self) -> Transition {
        match &self.state {
            PollState::Finished(outcome) => Transition::Finished(outcome.clone()),
            _ => Transition::Abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EXHAUSTED_MESSAGE, StatusCode};

    fn schedule(ms: &[u64]) -> RetrySchedule {
        RetrySchedule::from_millis(ms).unwrap()
    }

    fn machine(ms: &[u64]) -> PollMachine {
        PollMachine::new(schedule(ms), TransportFailurePolicy::Abort)
    }

    #[test]
    fn starts_in_progress_with_first_wait() {
        let m = machine(&[2000, 3000]);
        assert_eq!(m.state(), &PollState::InProgress { attempt: 0 });
        assert_eq!(m.next_delay(), Some(Duration::from_millis(2000)));
        assert_eq!(m.queries(), 0);
        assert!(!m.is_finished());
    }

    #[test]
    fn in_progress_advances_to_next_wait() {
        let mut m = machine(&[2000, 3000, 15000]);
        let t = m.on_status(StatusResponse::in_progress());
        assert_eq!(
            t,
            Transition::Retry {
                attempt: 1,
                delay: Duration::from_millis(3000)
            }
        );
        assert_eq!(m.next_delay(), Some(Duration::from_millis(3000)));
        assert_eq!(m.attempt(), 1);
    }

    #[test]
    fn in_progress_on_last_entry_exhausts() {
        let mut m = machine(&[2000, 3000]);
        m.on_status(StatusResponse::in_progress());
        let t = m.on_status(StatusResponse::in_progress());

        match t {
            Transition::Finished(PollOutcome::Exhausted { message, queries }) => {
                assert_eq!(message, EXHAUSTED_MESSAGE);
                assert_eq!(queries, 2);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert!(m.is_finished());
        assert_eq!(m.next_delay(), None);
    }

    #[test]
    fn processed_finishes_as_success() {
        let mut m = machine(&[2000, 3000]);
        let t = m.on_status(StatusResponse::new(StatusCode::Processed));
        assert_eq!(
            t,
            Transition::Finished(PollOutcome::Succeeded {
                status: StatusCode::Processed,
                message: None,
                queries: 1
            })
        );
    }

    #[test]
    fn error_code_finishes_as_failure_with_message() {
        let mut m = machine(&[2000, 3000]);
        m.on_status(StatusResponse::in_progress());
        let t = m.on_status(StatusResponse::new(StatusCode::Error).with_error("Invalid GSTIN"));
        assert_eq!(
            t,
            Transition::Finished(PollOutcome::Failed {
                status: StatusCode::Error,
                message: Some("Invalid GSTIN".to_string()),
                queries: 2
            })
        );
    }

    #[test]
    fn unknown_code_is_terminal() {
        let mut m = machine(&[2000, 3000]);
        let t = m.on_status(StatusResponse::new(StatusCode::Other("HOLD".to_string())));
        assert!(matches!(t, Transition::Finished(PollOutcome::Failed { .. })));
    }

    #[test]
    fn finished_machine_ignores_further_input() {
        let mut m = machine(&[2000]);
        let first = m.on_status(StatusResponse::new(StatusCode::Processed));
        let again = m.on_status(StatusResponse::in_progress());
        assert_eq!(first, again);
        assert_eq!(m.queries(), 1);
    }

    #[test]
    fn transport_failure_aborts_by_default() {
        let mut m = machine(&[2000, 3000]);
        assert_eq!(m.on_transport_failure(), Transition::Abandoned);
        assert_eq!(m.state(), &PollState::Abandoned);
        assert_eq!(m.queries(), 1);
        assert_eq!(m.on_status(StatusResponse::in_progress()), Transition::Abandoned);
    }

    #[test]
    fn transport_failure_retry_policy_consumes_schedule() {
        let mut m = PollMachine::new(schedule(&[2000, 3000]), TransportFailurePolicy::Retry);
        assert_eq!(
            m.on_transport_failure(),
            Transition::Retry {
                attempt: 1,
                delay: Duration::from_millis(3000)
            }
        );
        assert_eq!(m.on_transport_failure(), Transition::Abandoned);
        assert_eq!(m.queries(), 2);
    }

    #[test]
    fn transport_failure_then_answer_recovers() {
        let mut m = PollMachine::new(schedule(&[2000, 3000]), TransportFailurePolicy::Retry);
        m.on_transport_failure();
        let t = m.on_status(StatusResponse::new(StatusCode::Processed));
        assert!(matches!(
            t,
            Transition::Finished(PollOutcome::Succeeded { queries: 2, .. })
        ));
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "Retry".parse::<TransportFailurePolicy>(),
            Ok(TransportFailurePolicy::Retry)
        );
        assert_eq!(
            "abort".parse::<TransportFailurePolicy>(),
            Ok(TransportFailurePolicy::Abort)
        );
        assert!("ignore".parse::<TransportFailurePolicy>().is_err());
    }
}
