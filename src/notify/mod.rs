//! Report sinks
//!
//! Each sink is an independent capability behind [`NotificationSink`]; the
//! entry point fans the finished report out to whichever sinks are
//! configured. Delivery policy differs per sink: the chat webhook is
//! best-effort, the queue is the authoritative downstream record and its
//! failures propagate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;

use crate::error::NotifyError;
use crate::scan::{ReportedTokenSummary, RunOutcome};

pub mod chat;
pub mod queue;

pub use chat::ChatWebhookSink;
pub use queue::RedisQueueSink;

/// The finished report handed to every sink
#[derive(Debug)]
pub struct Report {
    /// Tokens inside the expiry window, in the order they were found
    pub tokens: Vec<ReportedTokenSummary>,

    /// Window the scan used, in days
    pub threshold_days: i64,

    /// When the run produced this report
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(tokens: Vec<ReportedTokenSummary>, threshold_days: i64) -> Self {
        Self {
            tokens,
            threshold_days,
            generated_at: Utc::now(),
        }
    }
}

/// A single delivery target for the report
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver the report. One attempt, no retries.
    async fn deliver(&self, report: &Report) -> std::result::Result<(), NotifyError>;
}

/// Fan the report out to the configured sinks, honoring the outcome.
///
/// An unreachable API means nothing was checked, so no report goes out at
/// all; the operator alert for that case travels outside this path.
/// Otherwise both sinks get the report, the empty-window case included.
/// Chat is best-effort and its failure only logged; the queue is the
/// authoritative downstream record and its failure propagates.
pub async fn dispatch(
    outcome: RunOutcome,
    report: &Report,
    chat: Option<&dyn NotificationSink>,
    queue: Option<&dyn NotificationSink>,
) -> std::result::Result<(), NotifyError> {
    if outcome == RunOutcome::ApiUnavailable {
        return Ok(());
    }

    if let Some(chat) = chat {
        if let Err(err) = chat.deliver(report).await {
            warn!("chat delivery failed: {err}");
        }
    }

    if let Some(queue) = queue {
        queue.deliver(report).await?;
    }

    Ok(())
}
