//! Async driver for status polling.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use gstsync_core::PollId;

use crate::machine::{PollMachine, Transition, TransportFailurePolicy};
use crate::schedule::RetrySchedule;
use crate::service::{RegenerationService, ServiceError};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::types::{JobReference, PollOutcome};

/// A poll that ended without an outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("status query {queries} failed: {source}")]
    Transport {
        queries: usize,
        #[source]
        source: ServiceError,
    },
}

/// Polls regeneration jobs until they finish or the schedule runs out.
///
/// One poller serves any number of jobs; every `check_status` call owns its
/// own [`PollMachine`], so concurrent polls share nothing but the read-only
/// schedule.
pub struct RegenerationPoller<C, S = TokioSleeper> {
    service: C,
    sleeper: S,
    schedule: RetrySchedule,
    transport_policy: TransportFailurePolicy,
}

impl<C: RegenerationService> RegenerationPoller<C, TokioSleeper> {
    /// Poller that waits on the tokio timer.
    pub fn new(service: C, schedule: RetrySchedule) -> Self {
        Self::with_sleeper(service, TokioSleeper, schedule)
    }
}

impl<C: RegenerationService, S: Sleeper> RegenerationPoller<C, S> {
    pub fn with_sleeper(service: C, sleeper: S, schedule: RetrySchedule) -> Self {
        Self {
            service,
            sleeper,
            schedule,
            transport_policy: TransportFailurePolicy::default(),
        }
    }

    pub fn with_transport_policy(mut self, policy: TransportFailurePolicy) -> Self {
        self.transport_policy = policy;
        self
    }

    pub fn schedule(&self) -> &RetrySchedule {
        &self.schedule
    }

    pub fn transport_policy(&self) -> TransportFailurePolicy {
        self.transport_policy
    }

    pub(crate) fn service(&self) -> &C {
        &self.service
    }

    /// Fresh state machine for one poll.
    pub fn machine(&self) -> PollMachine {
        PollMachine::new(self.schedule.clone(), self.transport_policy)
    }

    /// Poll `job` until it reaches a terminal outcome.
    ///
    /// Waits `schedule[k]` before query `k + 1`. Returns exactly once; an
    /// `Err` only when a status query got no answer and the transport policy
    /// gave up.
    pub async fn check_status(&self, job: &JobReference) -> Result<PollOutcome, PollError> {
        let poll_id = PollId::new();
        let mut machine = self.machine();
        info!(
            poll_id = %poll_id,
            job = %job,
            max_queries = self.schedule.len(),
            "polling regeneration status"
        );

        while let Some(delay) = machine.next_delay() {
            debug!(
                poll_id = %poll_id,
                attempt = machine.attempt(),
                delay_ms = delay.as_millis() as u64,
                "waiting before status query"
            );
            self.sleeper.sleep(delay).await;

            let transition = match self.service.check_status(job).await {
                Ok(response) => {
                    debug!(
                        poll_id = %poll_id,
                        attempt = machine.attempt(),
                        status = %response.status,
                        "status query answered"
                    );
                    machine.on_status(response)
                }
                Err(error) => {
                    warn!(
                        poll_id = %poll_id,
                        attempt = machine.attempt(),
                        error = %error,
                        policy = ?self.transport_policy,
                        "status query failed"
                    );
                    match machine.on_transport_failure() {
                        Transition::Abandoned => {
                            return Err(PollError::Transport {
                                queries: machine.queries(),
                                source: error,
                            });
                        }
                        other => other,
                    }
                }
            };

            if let Transition::Finished(outcome) = transition {
                info!(
                    poll_id = %poll_id,
                    job = %job,
                    queries = outcome.queries(),
                    status = %outcome.status(),
                    success = outcome.is_success(),
                    "regeneration poll finished"
                );
                return Ok(outcome);
            }
        }

        // The machine only stops yielding delays once it is terminal, and
        // every terminal transition returns above.
        Ok(PollOutcome::exhausted(machine.queries()))
    }

    /// Run [`check_status`](Self::check_status) as a tokio task.
    pub fn spawn_check(
        self: &Arc<Self>,
        job: JobReference,
    ) -> tokio::task::JoinHandle<Result<PollOutcome, PollError>> {
        let poller = Arc::clone(self);
        tokio::spawn(async move { poller.check_status(&job).await })
    }
}
