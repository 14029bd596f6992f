//! Start a regeneration job and follow it to completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use gstsync_core::ReturnPeriod;
use gstsync_gstin::Gstin;

use crate::poller::{PollError, RegenerationPoller};
use crate::service::{RegenerationService, ServiceError};
use crate::sleeper::Sleeper;
use crate::types::{ErrorClass, JobReference, PollOutcome, ReturnType, StartOutcome};

/// What to regenerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationRequest {
    pub gstin: Gstin,
    pub period: ReturnPeriod,
    pub return_type: ReturnType,
}

/// How a regeneration request ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RegenerationResult {
    /// The server refused to start; nothing was polled.
    Rejected { error_type: ErrorClass },
    /// A job was started and polled to a terminal outcome.
    Completed {
        job: JobReference,
        outcome: PollOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
}

impl RegenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RegenerationResult::Completed { outcome, .. } if outcome.is_success())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegenerateError {
    #[error("could not start regeneration: {0}")]
    Start(#[source] ServiceError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

impl<C: RegenerationService, S: Sleeper> RegenerationPoller<C, S> {
    /// Ask the server to regenerate, then poll the job it hands back.
    ///
    /// An error classification from the server is returned as
    /// [`RegenerationResult::Rejected`] without any status query.
    pub async fn regenerate(
        &self,
        request: &RegenerationRequest,
    ) -> Result<RegenerationResult, RegenerateError> {
        let started_at = Utc::now();
        info!(
            gstin = %request.gstin,
            period = %request.period,
            return_type = %request.return_type,
            "starting regeneration"
        );

        let start = self
            .service()
            .start_regeneration(&request.gstin, request.period, request.return_type)
            .await
            .map_err(RegenerateError::Start)?;

        let reference_id = match start {
            StartOutcome::Started(reference_id) => reference_id,
            StartOutcome::Rejected(error_type) => {
                warn!(
                    gstin = %request.gstin,
                    error_type = %error_type,
                    "regeneration rejected by server"
                );
                return Ok(RegenerationResult::Rejected { error_type });
            }
        };

        let job = JobReference::new(request.gstin.clone(), reference_id, request.return_type);
        let outcome = self.check_status(&job).await?;

        Ok(RegenerationResult::Completed {
            job,
            outcome,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use gstsync_core::ReferenceId;

    use crate::poller::tests::{RecordingSleeper, ScriptedService, gstin};
    use crate::schedule::RetrySchedule;
    use crate::types::{StatusCode, StatusResponse};

    fn request() -> RegenerationRequest {
        RegenerationRequest {
            gstin: gstin(),
            period: ReturnPeriod::parse("042024").unwrap(),
            return_type: ReturnType::Gstr1,
        }
    }

    fn poller(
        service: Arc<ScriptedService>,
    ) -> RegenerationPoller<Arc<ScriptedService>, RecordingSleeper> {
        RegenerationPoller::with_sleeper(
            service,
            RecordingSleeper::default(),
            RetrySchedule::from_millis(&[1, 1, 1]).unwrap(),
        )
    }

    #[tokio::test]
    async fn rejected_start_skips_polling() {
        let service = Arc::new(ScriptedService::default());
        *service.start.lock().unwrap() = Some(Ok(StartOutcome::Rejected(ErrorClass::OtpRequested)));

        let result = poller(service.clone()).regenerate(&request()).await.unwrap();

        assert_eq!(
            result,
            RegenerationResult::Rejected {
                error_type: ErrorClass::OtpRequested
            }
        );
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn started_job_is_polled_to_completion() {
        let service = Arc::new(ScriptedService::default());
        *service.start.lock().unwrap() = Some(Ok(StartOutcome::Started(
            ReferenceId::new("REF-R").unwrap(),
        )));
        service.script(
            "REF-R",
            vec![
                Ok(StatusResponse::in_progress()),
                Ok(StatusResponse::new(StatusCode::Processed)),
            ],
        );

        let result = poller(service.clone()).regenerate(&request()).await.unwrap();

        match &result {
            RegenerationResult::Completed {
                job,
                outcome,
                started_at,
                finished_at,
            } => {
                assert_eq!(job.reference_id.as_str(), "REF-R");
                assert_eq!(job.return_type, ReturnType::Gstr1);
                assert_eq!(outcome.queries(), 2);
                assert!(started_at <= finished_at);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(result.is_success());
        assert_eq!(service.queries("REF-R"), 2);
    }

    #[tokio::test]
    async fn start_transport_error_is_surfaced() {
        let service = Arc::new(ScriptedService::default());

        let err = poller(service).regenerate(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            RegenerateError::Start(ServiceError::Transport(_))
        ));
    }
}
