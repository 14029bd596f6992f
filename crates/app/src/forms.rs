//! Form lifecycle: hooks invoked by a caller-owned driver.
//!
//! A form reacts to lifecycle events by returning [`FormEffect`]s; whoever
//! renders the form applies them. Nothing here touches a UI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gstsync_core::{ReturnPeriod, ValueObject};
use gstsync_gstin::Gstin;
use gstsync_regeneration::{
    PollOutcome, RegenerateError, RegenerationRequest, RegenerationResult, ReturnType,
};

/// Badge colour, in the host's indicator vocabulary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Green,
    Red,
    Orange,
    Blue,
    Gray,
}

/// Short status shown next to the form title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub label: String,
    pub indicator: Indicator,
}

impl StatusBadge {
    pub fn new(label: impl Into<String>, indicator: Indicator) -> Self {
        Self {
            label: label.into(),
            indicator,
        }
    }

    pub fn idle() -> Self {
        Self::new("Not Started", Indicator::Gray)
    }

    pub fn running() -> Self {
        Self::new("Regenerating", Indicator::Blue)
    }

    pub fn for_outcome(outcome: &PollOutcome) -> Self {
        match outcome {
            PollOutcome::Succeeded { .. } => Self::new("Regenerated", Indicator::Green),
            PollOutcome::Failed {
                status, message, ..
            } => match message {
                Some(message) => Self::new(format!("Failed: {message}"), Indicator::Red),
                None => Self::new(format!("Failed ({status})"), Indicator::Red),
            },
            PollOutcome::Exhausted { message, .. } => Self::new(message.clone(), Indicator::Orange),
        }
    }

    pub fn for_result(result: &RegenerationResult) -> Self {
        match result {
            RegenerationResult::Completed { outcome, .. } => Self::for_outcome(outcome),
            RegenerationResult::Rejected { error_type } if error_type.needs_authentication() => {
                Self::new(
                    format!("Authentication Required ({error_type})"),
                    Indicator::Orange,
                )
            }
            RegenerationResult::Rejected { error_type } => {
                Self::new(format!("Not Started ({error_type})"), Indicator::Red)
            }
        }
    }

    pub fn for_error(error: &RegenerateError) -> Self {
        Self::new(format!("Error: {error}"), Indicator::Red)
    }
}

/// Change a form asks its renderer to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    SetFieldError {
        field: &'static str,
        message: String,
    },
    ClearFieldError {
        field: &'static str,
    },
    SetBadge(StatusBadge),
    EnableAction {
        action: &'static str,
        enabled: bool,
    },
}

/// Named lifecycle callbacks of a form.
pub trait FormHooks {
    /// First display of the form.
    fn on_load(&mut self) -> Vec<FormEffect>;

    /// Redisplay after the underlying record changed.
    fn on_refresh(&mut self) -> Vec<FormEffect> {
        Vec::new()
    }

    /// A field was edited. Unknown fields are ignored.
    fn on_field_change(&mut self, field: &str, value: &str) -> Vec<FormEffect>;
}

/// Owns a form and invokes its hooks in lifecycle order.
///
/// `on_load` runs exactly once, before any other hook. Every effect emitted
/// is kept, in order, until drained.
#[derive(Debug)]
pub struct FormDriver<F> {
    form: F,
    loaded: bool,
    pending: Vec<FormEffect>,
}

impl<F: FormHooks> FormDriver<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            loaded: false,
            pending: Vec::new(),
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn load(&mut self) {
        if !self.loaded {
            self.loaded = true;
            let effects = self.form.on_load();
            self.pending.extend(effects);
        }
    }

    pub fn refresh(&mut self) {
        self.load();
        let effects = self.form.on_refresh();
        self.pending.extend(effects);
    }

    pub fn set_field(&mut self, field: &str, value: &str) {
        self.load();
        let effects = self.form.on_field_change(field, value);
        self.pending.extend(effects);
    }

    /// Run `f` against the form and queue whatever it returns.
    pub fn apply<R>(&mut self, f: impl FnOnce(&mut F) -> (R, Vec<FormEffect>)) -> R {
        self.load();
        let (value, effects) = f(&mut self.form);
        self.pending.extend(effects);
        value
    }

    pub fn drain_effects(&mut self) -> Vec<FormEffect> {
        std::mem::take(&mut self.pending)
    }
}

/// Regeneration form for a company's return summary.
#[derive(Debug, Clone, Default)]
pub struct RegenerationForm {
    company_gstin: Option<Gstin>,
    period: Option<ReturnPeriod>,
    return_type: Option<ReturnType>,
    errors: BTreeMap<&'static str, String>,
    running: bool,
    last_result: Option<RegenerationResult>,
}

impl RegenerationForm {
    pub const COMPANY_GSTIN: &'static str = "company_gstin";
    pub const PERIOD: &'static str = "period";
    pub const RETURN_TYPE: &'static str = "return_type";
    pub const REGENERATE: &'static str = "regenerate";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn company_gstin(&self) -> Option<&Gstin> {
        self.company_gstin.as_ref()
    }

    pub fn period(&self) -> Option<ReturnPeriod> {
        self.period
    }

    /// Defaults to GSTR-1 until another type is chosen.
    pub fn return_type(&self) -> ReturnType {
        self.return_type.unwrap_or(ReturnType::Gstr1)
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn last_result(&self) -> Option<&RegenerationResult> {
        self.last_result.as_ref()
    }

    /// The request this form describes, once every field is valid.
    pub fn request(&self) -> Option<RegenerationRequest> {
        if !self.errors.is_empty() {
            return None;
        }
        Some(RegenerationRequest {
            gstin: self.company_gstin.clone()?,
            period: self.period?,
            return_type: self.return_type(),
        })
    }

    pub fn mark_running(&mut self) -> Vec<FormEffect> {
        self.running = true;
        vec![
            FormEffect::SetBadge(StatusBadge::running()),
            self.action_state(),
        ]
    }

    pub fn record_result(&mut self, result: RegenerationResult) -> Vec<FormEffect> {
        self.running = false;
        let badge = StatusBadge::for_result(&result);
        self.last_result = Some(result);
        vec![FormEffect::SetBadge(badge), self.action_state()]
    }

    pub fn record_error(&mut self, error: &RegenerateError) -> Vec<FormEffect> {
        self.running = false;
        vec![
            FormEffect::SetBadge(StatusBadge::for_error(error)),
            self.action_state(),
        ]
    }

    fn badge(&self) -> StatusBadge {
        if self.running {
            return StatusBadge::running();
        }
        self.last_result
            .as_ref()
            .map(StatusBadge::for_result)
            .unwrap_or_else(StatusBadge::idle)
    }

    fn action_state(&self) -> FormEffect {
        FormEffect::EnableAction {
            action: Self::REGENERATE,
            enabled: !self.running && self.request().is_some(),
        }
    }

    fn settle(&mut self, field: &'static str, error: Option<String>) -> FormEffect {
        match error {
            Some(message) => {
                self.errors.insert(field, message.clone());
                FormEffect::SetFieldError { field, message }
            }
            None => {
                self.errors.remove(field);
                FormEffect::ClearFieldError { field }
            }
        }
    }
}

impl FormHooks for RegenerationForm {
    fn on_load(&mut self) -> Vec<FormEffect> {
        vec![FormEffect::SetBadge(self.badge()), self.action_state()]
    }

    fn on_refresh(&mut self) -> Vec<FormEffect> {
        self.on_load()
    }

    fn on_field_change(&mut self, field: &str, value: &str) -> Vec<FormEffect> {
        let effect = match field {
            Self::COMPANY_GSTIN => {
                let parsed = parse_field(value, Gstin::parse);
                self.company_gstin = parsed.as_ref().ok().cloned().flatten();
                self.settle(Self::COMPANY_GSTIN, parsed.err())
            }
            Self::PERIOD => {
                let parsed = parse_field(value, ReturnPeriod::parse);
                self.period = parsed.as_ref().ok().copied().flatten();
                self.settle(Self::PERIOD, parsed.err())
            }
            Self::RETURN_TYPE => {
                let parsed = parse_field(value, |raw| raw.parse::<ReturnType>());
                self.return_type = parsed.as_ref().ok().copied().flatten();
                self.settle(Self::RETURN_TYPE, parsed.err())
            }
            _ => return Vec::new(),
        };
        vec![effect, self.action_state()]
    }
}

/// Blank input clears the field; anything else must parse.
fn parse_field<V, E>(
    value: &str,
    parse: impl FnOnce(&str) -> Result<V, E>,
) -> Result<Option<V>, String>
where
    V: ValueObject,
    E: core::fmt::Display,
{
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse(value).map(Some).map_err(|e| e.to_string())
}
