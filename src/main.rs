use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cancel_superseded::config::Config;
use cancel_superseded::event::TriggerContext;
use cancel_superseded::github::OctocrabClient;
use cancel_superseded::output::{self, CANCELLED_RUNS_OUTPUT};
use cancel_superseded::pass;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cancel_superseded=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = run().await;

    // The output is set on every path, including early exit and failure.
    let count = result.as_ref().map_or(0, |count| *count);
    if let Err(e) = output::set_output(CANCELLED_RUNS_OUTPUT, &count.to_string()) {
        tracing::error!(error = %e, "Failed to set step output");
    }

    match result {
        Ok(count) => {
            tracing::info!(count, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = ?e, "Pass failed");
            output::set_failed(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<u32> {
    let config = Config::from_env().context("invalid action inputs")?;
    let context = TriggerContext::from_env().context("failed to read trigger context")?;
    tracing::debug!(?config, event = %context.event_name, "Loaded configuration");

    let client = OctocrabClient::from_token(
        config.github_token.clone(),
        config.api_base.as_deref(),
        context.repo.clone(),
    )
    .context("failed to build GitHub client")?;

    let summary = pass::run_pass(&client, &config, &context)
        .await
        .context("reconciliation pass failed")?;
    Ok(summary.requests_issued)
}
