//! Message-queue sink
//!
//! Pushes the machine-readable report onto a Redis list. Unlike the chat
//! webhook this sink always receives a payload, including the empty-window
//! case: downstream consumers treat every run as a data point.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;

use super::{NotificationSink, Report};
use crate::config::QueueConfig;
use crate::error::NotifyError;
use crate::scan::ReportedTokenSummary;

/// Redis list sink
pub struct RedisQueueSink {
    client: redis::Client,
    queue_name: String,
}

/// Wire shape of the queued document
#[derive(Debug, Serialize)]
struct QueuePayload<'a> {
    summary: RunSummary,
    tokens: &'a [ReportedTokenSummary],
}

#[derive(Debug, Serialize)]
struct RunSummary {
    tokens_checked: usize,
    timestamp: String,
}

impl RedisQueueSink {
    pub fn new(config: &QueueConfig) -> std::result::Result<Self, NotifyError> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            queue_name: config.queue_name.clone(),
        })
    }
}

/// Serialize the report into the queued JSON document.
pub fn payload_json(report: &Report) -> std::result::Result<String, NotifyError> {
    let payload = QueuePayload {
        summary: RunSummary {
            tokens_checked: report.tokens.len(),
            timestamp: report.generated_at.to_rfc3339(),
        },
        tokens: &report.tokens,
    };
    serde_json::to_string(&payload).map_err(|e| NotifyError::Queue(e.to_string()))
}

#[async_trait]
impl NotificationSink for RedisQueueSink {
    async fn deliver(&self, report: &Report) -> std::result::Result<(), NotifyError> {
        let payload = payload_json(report)?;
        let mut conn = self.client.get_async_connection().await?;
        let _: () = conn.rpush(&self.queue_name, payload).await?;
        Ok(())
    }
}
