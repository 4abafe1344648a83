//! tokenwatch - scheduled audit of GitLab access-token expiry

use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;

mod cli;
mod client;
mod config;
mod error;
mod notify;
mod scan;

use cli::Cli;
use client::GitLabClient;
use config::Config;
use error::Result;
use notify::{ChatWebhookSink, NotificationSink, RedisQueueSink, Report};
use scan::{run_scan, RunOutcome};

/// Structured result of one run, printed as JSON on stdout for whatever
/// scheduled the job.
#[derive(Debug, Serialize)]
struct RunResult {
    status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_checked: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    traceback: Option<String>,
}

impl RunResult {
    fn ok(tokens_checked: usize) -> Self {
        Self {
            status: "ok",
            tokens_checked: Some(tokens_checked),
            message: None,
            error: None,
            traceback: None,
        }
    }

    fn error_message(message: String) -> Self {
        Self {
            status: "error",
            tokens_checked: None,
            message: Some(message),
            error: None,
            traceback: None,
        }
    }

    fn fault(err: &error::Error) -> Self {
        Self {
            status: "error",
            tokens_checked: None,
            message: None,
            error: Some(err.to_string()),
            traceback: Some(format!("{err:#?}")),
        }
    }

    fn is_error(&self) -> bool {
        self.status != "ok"
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match Config::from_cli(&cli) {
        Ok(config) => audit(&config).await,
        Err(err) => {
            error!("{err}");
            RunResult::error_message(err.to_string())
        }
    };

    match serde_json::to_string(&result) {
        Ok(doc) => println!("{doc}"),
        Err(err) => error!("failed to serialize run result: {err}"),
    }

    if result.is_error() {
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::new()
        .parse_filters(&level.to_lowercase())
        .init();
}

/// Run the audit with the single top-level catch for unexpected faults.
async fn audit(config: &Config) -> RunResult {
    let chat = match &config.chat_webhook_url {
        Some(url) => match ChatWebhookSink::new(url) {
            Ok(sink) => Some(sink),
            Err(err) => {
                warn!("chat sink disabled: {err}");
                None
            }
        },
        None => None,
    };

    match run(config, chat.as_ref()).await {
        Ok(result) => result,
        Err(err) => {
            error!("Unexpected error during token audit: {err:?}");
            if let Some(chat) = &chat {
                if let Err(alert_err) = chat.alert(&format!("⚠️ Token audit failed: {err}")).await {
                    warn!("could not deliver failure alert: {alert_err}");
                }
            }
            RunResult::fault(&err)
        }
    }
}

async fn run(config: &Config, chat: Option<&ChatWebhookSink>) -> Result<RunResult> {
    let client = GitLabClient::new(config)?;
    let ctx = run_scan(&client, config).await;

    let outcome = ctx.outcome();
    if let RunOutcome::ApiUnavailable = outcome {
        // Nothing was checked; do not send a report claiming otherwise.
        let message =
            "GitLab API unreachable: no token listing succeeded, tokens were not checked"
                .to_string();
        error!("{message}");
        if let Some(chat) = chat {
            if let Err(err) = chat.alert(&format!("🚨 {message}")).await {
                warn!("could not deliver API-unavailable alert: {err}");
            }
        }
        return Ok(RunResult::error_message(message));
    }

    info!(
        "scan finished: {} token(s) within the expiry window",
        ctx.reported().len()
    );

    let report = Report::new(ctx.into_reported(), config.threshold_days);

    let queue = match &config.queue {
        Some(queue_config) => Some(RedisQueueSink::new(queue_config)?),
        None => None,
    };
    notify::dispatch(
        outcome,
        &report,
        chat.map(|c| c as &dyn NotificationSink),
        queue.as_ref().map(|q| q as &dyn NotificationSink),
    )
    .await?;

    Ok(RunResult::ok(report.tokens.len()))
}
