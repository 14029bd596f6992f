//! [`RegenerationService`] over the ERP's whitelisted-method HTTP API.
//!
//! Calls are `POST {base}/api/method/{method}` with a JSON body. A successful
//! answer wraps its payload as `{"message": ...}`; a server-side exception
//! comes back with a non-2xx status and an `exc_type` field.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use gstsync_core::ReturnPeriod;
use gstsync_gstin::Gstin;
use gstsync_regeneration::{
    JobReference, RegenerationService, ReturnType, ServiceError, StartOutcome, StartResponse,
    StatusResponse,
};

use crate::settings::Settings;

#[derive(Debug, Serialize)]
struct StartArgs<'a> {
    company_gstin: &'a str,
    period: String,
    doc_type: ReturnType,
}

#[derive(Debug, Serialize)]
struct StatusArgs<'a> {
    company_gstin: &'a str,
    reference_id: &'a str,
    doc_type: ReturnType,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    message: T,
}

/// Error body the server sends alongside a non-2xx status.
#[derive(Debug, Default, Deserialize)]
struct ServerFault {
    #[serde(default)]
    exc_type: Option<String>,
    #[serde(default)]
    exception: Option<String>,
    /// JSON-encoded list of JSON-encoded `{"message": ...}` objects.
    #[serde(default, rename = "_server_messages")]
    server_messages: Option<String>,
}

impl ServerFault {
    fn first_message(&self) -> Option<String> {
        let raw = self.server_messages.as_deref()?;
        let messages: Vec<String> = serde_json::from_str(raw).ok()?;
        messages.into_iter().find_map(|encoded| {
            serde_json::from_str::<serde_json::Value>(&encoded)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .or(Some(encoded))
        })
    }
}

/// Interpret one HTTP answer from a whitelisted method.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ServiceError> {
    if (200..300).contains(&status) {
        let envelope: Envelope<T> =
            serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        return Ok(envelope.message);
    }

    let fault: ServerFault = serde_json::from_str(body).unwrap_or_default();
    match fault.exc_type.clone() {
        Some(exception) => {
            let message = fault
                .first_message()
                .or(fault.exception)
                .unwrap_or_else(|| exception.clone());
            Err(ServiceError::Server { exception, message })
        }
        None => Err(ServiceError::Http {
            status,
            body: body.to_string(),
        }),
    }
}

/// HTTP client for the start and status methods.
#[derive(Debug, Clone)]
pub struct RpcRegenerationService {
    client: reqwest::Client,
    base_url: String,
    start_method: String,
    status_method: String,
}

impl RpcRegenerationService {
    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = settings.authorization() {
            let mut value = HeaderValue::from_str(&token)
                .map_err(|e| ServiceError::Transport(format!("authorization header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            start_method: settings.start_method.clone(),
            status_method: settings.status_method.clone(),
        })
    }

    pub fn method_url(&self, method: &str) -> String {
        format!("{}/api/method/{}", self.base_url, method)
    }

    async fn call<A, T>(&self, method: &str, args: &A) -> Result<T, ServiceError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.method_url(method);
        tracing::debug!(url = %url, "calling server method");

        let resp = self
            .client
            .post(&url)
            .json(args)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        decode_envelope(status, &body)
    }
}

#[async_trait]
impl RegenerationService for RpcRegenerationService {
    async fn start_regeneration(
        &self,
        gstin: &Gstin,
        period: ReturnPeriod,
        return_type: ReturnType,
    ) -> Result<StartOutcome, ServiceError> {
        let args = StartArgs {
            company_gstin: gstin.as_str(),
            period: period.to_string(),
            doc_type: return_type,
        };
        let response: StartResponse = self.call(&self.start_method, &args).await?;
        StartOutcome::try_from(response).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn check_status(&self, job: &JobReference) -> Result<StatusResponse, ServiceError> {
        let args = StatusArgs {
            company_gstin: job.gstin.as_str(),
            reference_id: job.reference_id.as_str(),
            doc_type: job.return_type,
        };
        self.call(&self.status_method, &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gstsync_regeneration::{ErrorClass, StatusCode};

    #[test]
    fn success_envelope_is_unwrapped() {
        let status: StatusResponse =
            decode_envelope(200, r#"{"message":{"status_cd":"IP"}}"#).unwrap();
        assert_eq!(status, StatusResponse::in_progress());

        let status: StatusResponse = decode_envelope(
            200,
            r#"{"message":{"status_cd":"ER","error_report":"Invalid return period"}}"#,
        )
        .unwrap();
        assert_eq!(status.status, StatusCode::Error);
        assert_eq!(status.error.as_deref(), Some("Invalid return period"));
    }

    #[test]
    fn start_payload_maps_to_outcome() {
        let started: StartResponse =
            decode_envelope(200, r#"{"message":{"reference_id":"abc-123"}}"#).unwrap();
        assert!(matches!(
            StartOutcome::try_from(started),
            Ok(StartOutcome::Started(id)) if id.as_str() == "abc-123"
        ));

        let rejected: StartResponse =
            decode_envelope(200, r#"{"message":{"error_type":"otp_requested"}}"#).unwrap();
        assert_eq!(
            StartOutcome::try_from(rejected),
            Ok(StartOutcome::Rejected(ErrorClass::OtpRequested))
        );
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let err = decode_envelope::<StatusResponse>(200, "<html>").unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));

        let err = decode_envelope::<StatusResponse>(200, r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn server_exception_uses_first_user_message() {
        let body = r#"{
            "exc_type": "ValidationError",
            "exception": "frappe.exceptions.ValidationError: Invalid GSTIN",
            "_server_messages": "[\"{\\\"message\\\": \\\"Invalid GSTIN\\\"}\"]"
        }"#;
        let err = decode_envelope::<StatusResponse>(417, body).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Server {
                exception: "ValidationError".to_string(),
                message: "Invalid GSTIN".to_string()
            }
        );
    }

    #[test]
    fn server_exception_without_messages_falls_back() {
        let body = r#"{"exc_type":"PermissionError","exception":"not allowed"}"#;
        let err = decode_envelope::<StatusResponse>(403, body).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Server {
                exception: "PermissionError".to_string(),
                message: "not allowed".to_string()
            }
        );
    }

    #[test]
    fn plain_http_failure_keeps_body() {
        let err = decode_envelope::<StatusResponse>(502, "Bad Gateway").unwrap_err();
        assert_eq!(
            err,
            ServiceError::Http {
                status: 502,
                body: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn method_url_joins_base_and_method() {
        let settings = Settings {
            api_base_url: "https://erp.example.com/".to_string(),
            ..Settings::default()
        };
        let service = RpcRegenerationService::from_settings(&settings).unwrap();
        assert_eq!(
            service.method_url("a.b.c"),
            "https://erp.example.com/api/method/a.b.c"
        );
    }

    #[test]
    fn request_args_use_wire_names() {
        let args = StartArgs {
            company_gstin: "27AAPFU0939F1ZV",
            period: "042024".to_string(),
            doc_type: ReturnType::Gstr3b,
        };
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            serde_json::json!({
                "company_gstin": "27AAPFU0939F1ZV",
                "period": "042024",
                "doc_type": "GSTR3B"
            })
        );
    }
}
