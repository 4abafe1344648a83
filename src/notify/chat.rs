//! Chat webhook sink
//!
//! Posts a single `{"text": ...}` object, the shape Mattermost and Slack
//! compatible webhooks accept. The message mirrors what the audit used to
//! print per token: name, scopes, created, last used, expiry, plus the
//! owner identity or a project/group link.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;

use super::{NotificationSink, Report};
use crate::error::NotifyError;
use crate::scan::ReportedTokenSummary;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Fire-and-forget webhook sink
pub struct ChatWebhookSink {
    http: HttpClient,
    webhook_url: String,
}

impl ChatWebhookSink {
    pub fn new(webhook_url: &str) -> std::result::Result<Self, NotifyError> {
        let http = HttpClient::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Chat(e.to_string()))?;

        Ok(Self {
            http,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// Post an operator-facing alert outside the normal report flow
    /// (API unreachable, unexpected fault).
    pub async fn alert(&self, text: &str) -> std::result::Result<(), NotifyError> {
        self.post_text(text).await
    }

    async fn post_text(&self, text: &str) -> std::result::Result<(), NotifyError> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| NotifyError::Chat(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Chat(format!("webhook returned HTTP {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for ChatWebhookSink {
    async fn deliver(&self, report: &Report) -> std::result::Result<(), NotifyError> {
        self.post_text(&format_report(report)).await
    }
}

/// Render the full chat message for a report.
pub fn format_report(report: &Report) -> String {
    if report.tokens.is_empty() {
        return format!(
            "✅ All tokens are valid. No tokens are expiring within {} days.",
            report.threshold_days
        );
    }

    let mut out = format!(
        "=== Tokens expiring within {} days or sooner (UTC) ===\n\n",
        report.threshold_days
    );
    for token in &report.tokens {
        out.push_str(&format_token(token));
        out.push_str(&"-".repeat(60));
        out.push('\n');
    }
    out
}

fn format_token(token: &ReportedTokenSummary) -> String {
    let mut out = String::new();

    match &token.link {
        Some(link) => out.push_str(&format!("🔗 {}: {link}\n", token.source)),
        None => out.push_str(&format!("👤 {}\n", token.source)),
    }

    let scopes = if token.scopes.is_empty() {
        "(not specified)".to_string()
    } else {
        token.scopes.join(", ")
    };
    let created = token
        .created_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "—".to_string());
    let last_used = token
        .last_used_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "Never".to_string());
    let expires = token.expires_at.as_deref().unwrap_or("—");

    out.push_str(&format!("🔑 Token:      {}\n", token.name));
    out.push_str(&format!("📜 Scopes:     {scopes}\n"));
    out.push_str(&format!("🗓️ Created:    {created}\n"));
    out.push_str(&format!("🕒 Last used:  {last_used}\n"));
    out.push_str(&format!("📅 Expires at: {expires}\n"));
    out
}
