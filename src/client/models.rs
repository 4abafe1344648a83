//! Serde models for the GitLab resources the audit touches
//!
//! Only the fields the scan reads are modeled; everything else in the API
//! responses is ignored. `expires_at` stays a raw string because GitLab
//! may return a date, null, or the `∞` non-expiring sentinel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An access token as returned by any of the token list endpoints.
///
/// Personal tokens carry a nested `user`; project and group tokens do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Token ID, unique across the instance
    pub id: u64,

    /// Display name
    pub name: String,

    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Last-used timestamp, absent for never-used tokens
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,

    /// Calendar expiry date (`YYYY-MM-DD`), null, or `∞`
    #[serde(default)]
    pub expires_at: Option<String>,

    /// Whether the token has been revoked
    #[serde(default)]
    pub revoked: bool,

    /// Whether the token is active; absent means active
    #[serde(default = "default_active")]
    pub active: bool,

    /// Owning user, present on personal access tokens only
    #[serde(default)]
    pub user: Option<TokenUser>,
}

fn default_active() -> bool {
    true
}

impl AccessToken {
    /// Revoked or inactive tokens never enter the report, regardless of
    /// their expiry date.
    pub fn eligible(&self) -> bool {
        !self.revoked && self.active
    }
}

/// Owner identity nested in a personal access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub username: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// A project, enumerated to reach its access-token list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,

    /// Namespaced path, e.g. `group/project` (used for the report link)
    pub path_with_namespace: String,
}

/// A group, enumerated to reach its access-token list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,

    /// Full path, e.g. `parent/child` (used for the report link)
    pub full_path: String,
}
