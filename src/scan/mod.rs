//! Run-scoped scan state: dedup, collected summaries, aggregate outcome
//!
//! All state for one audit run lives in an explicit [`ScanContext`] that is
//! created at orchestration start, threaded through the passes, and
//! consumed by the notifier. Nothing here is ambient or shared.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::AccessToken;

pub mod expiry;
pub mod passes;

pub use passes::run_scan;

/// Externally visible projection of a reported token
#[derive(Debug, Clone, Serialize)]
pub struct ReportedTokenSummary {
    pub name: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    /// Owner identity for personal tokens, "Project" or "Group" otherwise
    pub source: String,
    /// Project/group URL; absent for personal tokens
    pub link: Option<String>,
}

/// Aggregate result of a run, derived once all passes have finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No page request in any pass ever returned a success status
    ApiUnavailable,
    /// API reachable, nothing inside the expiry window
    NoExpiring,
    /// API reachable, this many tokens inside the window
    Expiring(usize),
}

/// Collector for one audit run
#[derive(Debug, Default)]
pub struct ScanContext {
    seen: HashSet<u64>,
    reported: Vec<ReportedTokenSummary>,
    api_reachable: bool,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a qualifying token.
    ///
    /// Returns false (and records nothing) if the token's id was already
    /// reported this run; duplicates are silent no-ops. Callers are
    /// responsible for the revoked/active/window filters.
    pub fn record(&mut self, token: &AccessToken, source: &str, link: Option<String>) -> bool {
        if !self.seen.insert(token.id) {
            return false;
        }

        self.reported.push(ReportedTokenSummary {
            name: token.name.clone(),
            scopes: token.scopes.clone(),
            expires_at: token.expires_at.clone(),
            created_at: token.created_at,
            last_used_at: token.last_used_at,
            source: source.to_string(),
            link,
        });
        true
    }

    /// Note whether an endpoint's fetch saw at least one successful page.
    pub fn mark_api_success(&mut self, succeeded: bool) {
        self.api_reachable |= succeeded;
    }

    pub fn reported(&self) -> &[ReportedTokenSummary] {
        &self.reported
    }

    pub fn outcome(&self) -> RunOutcome {
        if !self.api_reachable {
            RunOutcome::ApiUnavailable
        } else if self.reported.is_empty() {
            RunOutcome::NoExpiring
        } else {
            RunOutcome::Expiring(self.reported.len())
        }
    }

    /// Consume the context, yielding the ordered summaries.
    pub fn into_reported(self) -> Vec<ReportedTokenSummary> {
        self.reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: u64, name: &str) -> AccessToken {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "scopes": ["api"],
            "expires_at": "2025-07-01"
        }))
        .unwrap()
    }

    #[test]
    fn test_record_returns_true_for_new_token() {
        let mut ctx = ScanContext::new();
        assert!(ctx.record(&token(1, "a"), "Project", None));
        assert_eq!(ctx.reported().len(), 1);
    }

    #[test]
    fn test_duplicate_id_collapses_to_one_entry() {
        let mut ctx = ScanContext::new();
        assert!(ctx.record(&token(1, "a"), "alice <alice@example.com>", None));
        // Same id surfacing from another pass with a different label
        assert!(!ctx.record(
            &token(1, "a"),
            "Project",
            Some("http://gitlab.local/g/p".to_string())
        ));

        assert_eq!(ctx.reported().len(), 1);
        // First recording wins
        assert_eq!(ctx.reported()[0].source, "alice <alice@example.com>");
    }

    #[test]
    fn test_report_order_follows_record_order() {
        let mut ctx = ScanContext::new();
        ctx.record(&token(2, "second"), "Project", None);
        ctx.record(&token(1, "first"), "Group", None);

        let names: Vec<&str> = ctx.reported().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_outcome_api_unavailable_when_nothing_succeeded() {
        let ctx = ScanContext::new();
        assert_eq!(ctx.outcome(), RunOutcome::ApiUnavailable);
    }

    #[test]
    fn test_outcome_no_expiring() {
        let mut ctx = ScanContext::new();
        ctx.mark_api_success(true);
        assert_eq!(ctx.outcome(), RunOutcome::NoExpiring);
    }

    #[test]
    fn test_outcome_counts_reported_tokens() {
        let mut ctx = ScanContext::new();
        ctx.mark_api_success(true);
        ctx.record(&token(1, "a"), "Project", None);
        ctx.record(&token(2, "b"), "Group", None);
        assert_eq!(ctx.outcome(), RunOutcome::Expiring(2));
    }

    #[test]
    fn test_mark_api_success_is_sticky() {
        let mut ctx = ScanContext::new();
        ctx.mark_api_success(true);
        ctx.mark_api_success(false);
        assert_eq!(ctx.outcome(), RunOutcome::NoExpiring);
    }
}
