//! Runtime configuration assembled from the CLI/environment surface

use crate::cli::Cli;
use crate::error::{ConfigError, Result};

/// Resolved configuration for one audit run
#[derive(Debug, Clone)]
pub struct Config {
    /// Instance base URL, no trailing slash (used for report links)
    pub base_url: String,

    /// REST API root, `<base_url>/api/v4`
    pub api_url: String,

    /// Admin token sent as the PRIVATE-TOKEN header
    pub admin_token: String,

    /// Tokens expiring within this many days are reported (inclusive)
    pub threshold_days: i64,

    /// Chat webhook, if configured
    pub chat_webhook_url: Option<String>,

    /// Queue sink, if configured
    pub queue: Option<QueueConfig>,
}

/// Queue sink destination
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis connection URL
    pub url: String,

    /// List key the payload is pushed to
    pub queue_name: String,
}

impl Config {
    /// Resolve configuration from parsed CLI options.
    ///
    /// A missing admin token is a fatal startup condition: without it none
    /// of the token listing endpoints are usable.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let admin_token = cli
            .admin_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingAdminToken)?;

        if cli.threshold_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "expiry threshold must be non-negative, got {}",
                cli.threshold_days
            ))
            .into());
        }

        let base_url = cli.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("base URL is empty".to_string()).into());
        }
        let api_url = format!("{base_url}/api/v4");

        let queue = cli.queue_url.clone().map(|url| QueueConfig {
            url,
            queue_name: cli.queue_name.clone(),
        });

        Ok(Self {
            base_url,
            api_url,
            admin_token,
            threshold_days: cli.threshold_days,
            chat_webhook_url: cli.chat_webhook_url.clone(),
            queue,
        })
    }
}
