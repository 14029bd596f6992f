use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use gstsync_app::cli::{self, Args};
use gstsync_app::{RpcRegenerationService, Settings};
use gstsync_regeneration::RegenerationPoller;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let settings = Settings::from_env().context("failed to load settings")?;
    gstsync_observability::init(settings.log_format);
    tracing::debug!(?settings, "settings loaded");

    let mut invocation = match args.into_invocation() {
        Ok(invocation) => invocation,
        Err(e) => Args::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let service =
        RpcRegenerationService::from_settings(&settings).context("failed to build HTTP client")?;
    let poller = RegenerationPoller::new(service, settings.retry_schedule.clone())
        .with_transport_policy(settings.transport_failure);

    let result = cli::run(&poller, &mut invocation)
        .await
        .with_context(|| format!("regeneration failed for {}", invocation.request.gstin))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("failed to encode result")?
    );

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
