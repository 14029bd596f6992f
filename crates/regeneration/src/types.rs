//! Wire and outcome types for regeneration jobs.

use serde::{Deserialize, Serialize};

use gstsync_core::{DomainError, ReferenceId, ValueObject};
use gstsync_gstin::Gstin;

/// Message attached to a poll that ran out of retries.
pub const EXHAUSTED_MESSAGE: &str =
    "Regeneration is taking longer than expected. Please check the status again later.";

/// Return whose summary is regenerated (the document-type tag sent to the server).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    #[serde(rename = "GSTR1")]
    Gstr1,
    #[serde(rename = "GSTR3B")]
    Gstr3b,
}

impl ValueObject for ReturnType {}

impl ReturnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::Gstr1 => "GSTR1",
            ReturnType::Gstr3b => "GSTR3B",
        }
    }
}

impl core::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ReturnType {
    type Err = DomainError;

    /// Accepts `GSTR1`, `GSTR-1`, `gstr3b`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "GSTR1" => Ok(ReturnType::Gstr1),
            "GSTR3B" => Ok(ReturnType::Gstr3b),
            _ => Err(DomainError::validation(format!("unknown return type {s:?}"))),
        }
    }
}

/// Status code reported by the server for a regeneration job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusCode {
    /// `IP`: still running; the only non-terminal code.
    InProgress,
    /// `P`
    Processed,
    /// `PE`
    ProcessedWithErrors,
    /// `ER`
    Error,
    /// Any code this client does not know; terminal.
    Other(String),
}

impl StatusCode {
    pub fn as_str(&self) -> &str {
        match self {
            StatusCode::InProgress => "IP",
            StatusCode::Processed => "P",
            StatusCode::ProcessedWithErrors => "PE",
            StatusCode::Error => "ER",
            StatusCode::Other(code) => code,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, StatusCode::InProgress)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Processed)
    }
}

impl From<String> for StatusCode {
    fn from(value: String) -> Self {
        match value.trim() {
            "IP" => StatusCode::InProgress,
            "P" => StatusCode::Processed,
            "PE" => StatusCode::ProcessedWithErrors,
            "ER" => StatusCode::Error,
            other => StatusCode::Other(other.to_string()),
        }
    }
}

impl From<StatusCode> for String {
    fn from(value: StatusCode) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to one "check regeneration status" query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "status_cd")]
    pub status: StatusCode,
    #[serde(rename = "error_report", default, alias = "error")]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            error: None,
        }
    }

    pub fn in_progress() -> Self {
        Self::new(StatusCode::InProgress)
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Why the server refused to start a regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorClass {
    /// The portal sent an OTP; the user must authenticate first.
    OtpRequested,
    InvalidOtp,
    InvalidAuthToken,
    /// GSP/GST server is down.
    ServerError,
    /// GSP/GST account limit exceeded.
    LimitExceeded,
    /// The server took too long to respond.
    GatewayTimeout,
    Other(String),
}

impl ErrorClass {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorClass::OtpRequested => "otp_requested",
            ErrorClass::InvalidOtp => "invalid_otp",
            ErrorClass::InvalidAuthToken => "invalid_auth_token",
            ErrorClass::ServerError => "server_error",
            ErrorClass::LimitExceeded => "limit_exceeded",
            ErrorClass::GatewayTimeout => "gateway_timeout",
            ErrorClass::Other(class) => class,
        }
    }

    /// Whether asking the user to re-authenticate can resolve the error.
    pub fn needs_authentication(&self) -> bool {
        matches!(
            self,
            ErrorClass::OtpRequested | ErrorClass::InvalidOtp | ErrorClass::InvalidAuthToken
        )
    }
}

impl From<String> for ErrorClass {
    fn from(value: String) -> Self {
        match value.trim() {
            "otp_requested" => ErrorClass::OtpRequested,
            "invalid_otp" => ErrorClass::InvalidOtp,
            "invalid_auth_token" => ErrorClass::InvalidAuthToken,
            "server_error" => ErrorClass::ServerError,
            "limit_exceeded" => ErrorClass::LimitExceeded,
            "gateway_timeout" => ErrorClass::GatewayTimeout,
            other => ErrorClass::Other(other.to_string()),
        }
    }
}

impl From<ErrorClass> for String {
    fn from(value: ErrorClass) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw answer to "start regeneration" as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartResponse {
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub error_type: Option<ErrorClass>,
}

/// Interpreted answer to "start regeneration".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(ReferenceId),
    Rejected(ErrorClass),
}

impl TryFrom<StartResponse> for StartOutcome {
    type Error = DomainError;

    /// An error classification wins over a reference id.
    fn try_from(value: StartResponse) -> Result<Self, Self::Error> {
        if let Some(class) = value.error_type {
            return Ok(StartOutcome::Rejected(class));
        }
        match value.reference_id {
            Some(id) => Ok(StartOutcome::Started(ReferenceId::new(id)?)),
            None => Err(DomainError::validation(
                "start response carries neither a reference id nor an error type",
            )),
        }
    }
}

/// One outstanding regeneration job.
///
/// Identified by the company GSTIN (tenant) and the server's reference id
/// (correlation). The return type is carried along because every status
/// query has to repeat it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobReference {
    pub gstin: Gstin,
    pub reference_id: ReferenceId,
    pub return_type: ReturnType,
}

impl JobReference {
    pub fn new(gstin: Gstin, reference_id: ReferenceId, return_type: ReturnType) -> Self {
        Self {
            gstin,
            reference_id,
            return_type,
        }
    }
}

impl core::fmt::Display for JobReference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}/{}", self.gstin, self.return_type, self.reference_id)
    }
}

/// Terminal result of one polling run.
///
/// `queries` counts status queries issued, including the final one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    Succeeded {
        status: StatusCode,
        message: Option<String>,
        queries: usize,
    },
    Failed {
        status: StatusCode,
        message: Option<String>,
        queries: usize,
    },
    Exhausted {
        message: String,
        queries: usize,
    },
}

impl PollOutcome {
    /// Classify a terminal status response.
    pub(crate) fn from_terminal(response: StatusResponse, queries: usize) -> Self {
        if response.status.is_success() {
            PollOutcome::Succeeded {
                status: response.status,
                message: response.error,
                queries,
            }
        } else {
            PollOutcome::Failed {
                status: response.status,
                message: response.error,
                queries,
            }
        }
    }

    pub(crate) fn exhausted(queries: usize) -> Self {
        PollOutcome::Exhausted {
            message: EXHAUSTED_MESSAGE.to_string(),
            queries,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Succeeded { .. })
    }

    /// Last status the server reported (`IP` for an exhausted poll).
    pub fn status(&self) -> StatusCode {
        match self {
            PollOutcome::Succeeded { status, .. } | PollOutcome::Failed { status, .. } => {
                status.clone()
            }
            PollOutcome::Exhausted { .. } => StatusCode::InProgress,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            PollOutcome::Succeeded { message, .. } | PollOutcome::Failed { message, .. } => {
                message.as_deref()
            }
            PollOutcome::Exhausted { message, .. } => Some(message),
        }
    }

    pub fn queries(&self) -> usize {
        match self {
            PollOutcome::Succeeded { queries, .. }
            | PollOutcome::Failed { queries, .. }
            | PollOutcome::Exhausted { queries, .. } => *queries,
        }
    }
}
