//! Remote collaborator that runs regeneration jobs.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use gstsync_core::ReturnPeriod;
use gstsync_gstin::Gstin;

use crate::types::{JobReference, ReturnType, StartOutcome, StatusResponse};

/// Failure to get an answer from the server at all.
///
/// A server that answers with an error status is *not* a `ServiceError`;
/// that arrives as a normal [`StatusResponse`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not decode server response: {0}")]
    Decode(String),

    #[error("server raised {exception}: {message}")]
    Server { exception: String, message: String },
}

/// Server-side regeneration endpoints.
#[async_trait]
pub trait RegenerationService: Send + Sync + 'static {
    /// Ask the server to recompute the return summary for a period.
    async fn start_regeneration(
        &self,
        gstin: &Gstin,
        period: ReturnPeriod,
        return_type: ReturnType,
    ) -> Result<StartOutcome, ServiceError>;

    /// One status query for a running job.
    async fn check_status(&self, job: &JobReference) -> Result<StatusResponse, ServiceError>;
}

#[async_trait]
impl<T: RegenerationService + ?Sized> RegenerationService for Arc<T> {
    async fn start_regeneration(
        &self,
        gstin: &Gstin,
        period: ReturnPeriod,
        return_type: ReturnType,
    ) -> Result<StartOutcome, ServiceError> {
        (**self).start_regeneration(gstin, period, return_type).await
    }

    async fn check_status(&self, job: &JobReference) -> Result<StatusResponse, ServiceError> {
        (**self).check_status(job).await
    }
}
