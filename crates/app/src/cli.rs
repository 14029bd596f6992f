//! Command line for `gstsync`.

use clap::Parser;
use thiserror::Error;
use tracing::info;

use gstsync_regeneration::{
    RegenerateError, RegenerationPoller, RegenerationRequest, RegenerationResult,
    RegenerationService, Sleeper,
};

use crate::forms::{FormDriver, FormEffect, RegenerationForm};

#[derive(Debug, Clone, Parser)]
#[command(name = "gstsync", version)]
#[command(about = "Regenerate a GST return summary and wait for the result", long_about = None)]
pub struct Args {
    /// Company GSTIN
    pub gstin: String,

    /// Return period as MMYYYY
    pub period: String,

    /// GSTR1 or GSTR3B
    #[arg(default_value = "GSTR1")]
    pub return_type: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("company GSTIN and return period are required")]
    Incomplete,
}

/// Validated command line, with the form that validated it.
#[derive(Debug)]
pub struct Invocation {
    pub form: FormDriver<RegenerationForm>,
    pub request: RegenerationRequest,
}

impl Args {
    /// Fill the regeneration form; the form does all field validation.
    pub fn into_invocation(self) -> Result<Invocation, CliError> {
        let mut form = FormDriver::new(RegenerationForm::new());
        form.set_field(RegenerationForm::COMPANY_GSTIN, &self.gstin);
        form.set_field(RegenerationForm::PERIOD, &self.period);
        form.set_field(RegenerationForm::RETURN_TYPE, &self.return_type);

        for effect in form.drain_effects() {
            if let FormEffect::SetFieldError { field, message } = effect {
                return Err(CliError::InvalidField { field, message });
            }
        }

        match form.form().request() {
            Some(request) => Ok(Invocation { form, request }),
            None => Err(CliError::Incomplete),
        }
    }
}

/// Regenerate and record the result on the form.
pub async fn run<C, S>(
    poller: &RegenerationPoller<C, S>,
    invocation: &mut Invocation,
) -> Result<RegenerationResult, RegenerateError>
where
    C: RegenerationService,
    S: Sleeper,
{
    invocation.form.apply(|form| ((), form.mark_running()));
    log_badges(&mut invocation.form);

    let result = poller.regenerate(&invocation.request).await;
    match &result {
        Ok(done) => invocation
            .form
            .apply(|form| ((), form.record_result(done.clone()))),
        Err(error) => invocation.form.apply(|form| ((), form.record_error(error))),
    }
    log_badges(&mut invocation.form);
    result
}

fn log_badges(form: &mut FormDriver<RegenerationForm>) {
    for effect in form.drain_effects() {
        if let FormEffect::SetBadge(badge) = effect {
            info!(status = %badge.label, indicator = ?badge.indicator, "form status");
        }
    }
}
