//! Command-line definition for the scheduled audit job
//!
//! There are no subcommands: one invocation is one audit run. Every option
//! is environment-backed so the job can be driven entirely from a cron or
//! CI schedule without arguments.

use clap::Parser;

/// Audit GitLab access tokens nearing expiration
#[derive(Parser, Debug)]
#[command(name = "tokenwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the GitLab instance (without the /api/v4 suffix)
    #[arg(long, env = "GITLAB_BASE_URL", hide_env = true)]
    pub base_url: String,

    /// Admin personal access token used to enumerate tokens
    #[arg(long, env = "GITLAB_ADMIN_TOKEN", hide_env = true)]
    pub admin_token: Option<String>,

    /// Report tokens expiring within this many days (inclusive)
    #[arg(long, env = "EXPIRY_THRESHOLD_DAYS", default_value_t = 30, hide_env = true)]
    pub threshold_days: i64,

    /// Chat webhook URL for the human-readable report
    #[arg(long, env = "CHAT_WEBHOOK_URL", hide_env = true)]
    pub chat_webhook_url: Option<String>,

    /// Redis URL of the report queue
    #[arg(long, env = "QUEUE_URL", hide_env = true)]
    pub queue_url: Option<String>,

    /// Redis list the report payload is pushed to
    #[arg(
        long,
        env = "QUEUE_NAME",
        default_value = "token-expiry-reports",
        hide_env = true
    )]
    pub queue_name: String,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(long, env = "LOGLEVEL", default_value = "info", hide_env = true)]
    pub log_level: String,
}
