//! Process configuration.
//!
//! One explicit value built at startup and passed to whatever needs it.
//! Every recognized option is listed in [`SettingKey`]; anything else is
//! ignored in the environment and rejected in JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gstsync_observability::LogFormat;
use gstsync_regeneration::{RetrySchedule, TransportFailurePolicy};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_START_METHOD: &str =
    "india_compliance.gst_india.api.regeneration.start_regeneration";
pub const DEFAULT_STATUS_METHOD: &str =
    "india_compliance.gst_india.api.regeneration.get_regeneration_status";

/// Recognized configuration options.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiBaseUrl,
    ApiKey,
    ApiSecret,
    RequestTimeoutMs,
    StartMethod,
    StatusMethod,
    RetryScheduleMs,
    TransportFailure,
    LogFormat,
}

impl SettingKey {
    pub const ALL: [SettingKey; 9] = [
        SettingKey::ApiBaseUrl,
        SettingKey::ApiKey,
        SettingKey::ApiSecret,
        SettingKey::RequestTimeoutMs,
        SettingKey::StartMethod,
        SettingKey::StatusMethod,
        SettingKey::RetryScheduleMs,
        SettingKey::TransportFailure,
        SettingKey::LogFormat,
    ];

    pub fn env_var(&self) -> &'static str {
        match self {
            SettingKey::ApiBaseUrl => "GST_API_BASE_URL",
            SettingKey::ApiKey => "GST_API_KEY",
            SettingKey::ApiSecret => "GST_API_SECRET",
            SettingKey::RequestTimeoutMs => "GST_REQUEST_TIMEOUT_MS",
            SettingKey::StartMethod => "GST_START_METHOD",
            SettingKey::StatusMethod => "GST_STATUS_METHOD",
            SettingKey::RetryScheduleMs => "GST_RETRY_SCHEDULE_MS",
            SettingKey::TransportFailure => "GST_TRANSPORT_FAILURE",
            SettingKey::LogFormat => "GST_LOG_FORMAT",
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SettingsError {
    fn invalid(key: SettingKey, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            key: key.env_var(),
            reason: reason.into(),
        }
    }
}

/// Client settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub request_timeout_ms: u64,
    pub start_method: String,
    pub status_method: String,
    pub retry_schedule: RetrySchedule,
    pub transport_failure: TransportFailurePolicy,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_secret: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            start_method: DEFAULT_START_METHOD.to_string(),
            status_method: DEFAULT_STATUS_METHOD.to_string(),
            retry_schedule: RetrySchedule::default(),
            transport_failure: TransportFailurePolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl core::fmt::Debug for Settings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Settings")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("start_method", &self.start_method)
            .field("status_method", &self.status_method)
            .field("retry_schedule", &self.retry_schedule)
            .field("transport_failure", &self.transport_failure)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Settings {
    /// Read every [`SettingKey`] from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key.env_var()).ok())
    }

    /// Build settings from any key lookup; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(SettingKey) -> Option<String>,
    {
        let mut settings = Settings::default();
        for key in SettingKey::ALL {
            let Some(raw) = lookup(key) else { continue };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            settings.apply(key, raw)?;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&mut self, key: SettingKey, raw: &str) -> Result<(), SettingsError> {
        match key {
            SettingKey::ApiBaseUrl => self.api_base_url = raw.to_string(),
            SettingKey::ApiKey => self.api_key = Some(raw.to_string()),
            SettingKey::ApiSecret => self.api_secret = Some(raw.to_string()),
            SettingKey::RequestTimeoutMs => {
                self.request_timeout_ms = raw
                    .parse()
                    .map_err(|e| SettingsError::invalid(key, format!("{e}")))?;
            }
            SettingKey::StartMethod => self.start_method = raw.to_string(),
            SettingKey::StatusMethod => self.status_method = raw.to_string(),
            SettingKey::RetryScheduleMs => {
                self.retry_schedule = RetrySchedule::parse_millis(raw)
                    .map_err(|e| SettingsError::invalid(key, e.to_string()))?;
            }
            SettingKey::TransportFailure => {
                self.transport_failure = raw.parse().map_err(|e| SettingsError::invalid(key, e))?;
            }
            SettingKey::LogFormat => {
                self.log_format = raw.parse().map_err(|e| SettingsError::invalid(key, e))?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(SettingsError::invalid(
                SettingKey::ApiBaseUrl,
                format!("expected an http(s) URL, got {:?}", self.api_base_url),
            ));
        }
        if self.api_key.is_some() != self.api_secret.is_some() {
            return Err(SettingsError::invalid(
                SettingKey::ApiSecret,
                "api key and api secret must be set together",
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                SettingKey::RequestTimeoutMs,
                "must be greater than zero",
            ));
        }
        for (key, method) in [
            (SettingKey::StartMethod, &self.start_method),
            (SettingKey::StatusMethod, &self.status_method),
        ] {
            if method.trim().is_empty() || method.contains('/') {
                return Err(SettingsError::invalid(
                    key,
                    format!("expected a dotted method path, got {method:?}"),
                ));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `token key:secret` header value, when credentials are configured.
    pub fn authorization(&self) -> Option<String> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Some(format!("token {key}:{secret}")),
            _ => None,
        }
    }
}
