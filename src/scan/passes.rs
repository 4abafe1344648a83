//! The three scan passes and their orchestration
//!
//! Passes run sequentially and are independent: a pass that finds nothing
//! or fails outright never stops the others. Each pass applies the same
//! filters (not revoked, active, inside the expiry window) before handing
//! a token to the collector.

use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};

use super::expiry;
use super::ScanContext;
use crate::client::{fetch_all, AccessToken, GitLabApi};
use crate::config::Config;

/// Fallback when a personal token's owner has no visible email
const NO_EMAIL: &str = "no email";

/// Run all three passes and return the populated context.
pub async fn run_scan(api: &dyn GitLabApi, config: &Config) -> ScanContext {
    let mut ctx = ScanContext::new();
    let today = Utc::now().date_naive();

    info!(
        "Scanning for tokens expiring within {} days (UTC)",
        config.threshold_days
    );

    personal_pass(api, config, today, &mut ctx).await;
    project_pass(api, config, today, &mut ctx).await;
    group_pass(api, config, today, &mut ctx).await;

    ctx
}

fn qualifies(token: &AccessToken, config: &Config, today: NaiveDate) -> bool {
    token.eligible()
        && expiry::within_window(token.expires_at.as_deref(), config.threshold_days, today)
}

async fn personal_pass(
    api: &dyn GitLabApi,
    config: &Config,
    today: NaiveDate,
    ctx: &mut ScanContext,
) {
    let outcome = fetch_all("personal access tokens", |page| {
        api.personal_access_tokens_page(page)
    })
    .await;
    ctx.mark_api_success(outcome.succeeded);

    for token in outcome.items {
        if !qualifies(&token, config, today) {
            continue;
        }
        // Instance-wide listings can include bot tokens without an owner;
        // those surface through the project/group passes instead.
        let Some(user) = &token.user else {
            continue;
        };

        let email = user.email.as_deref().unwrap_or(NO_EMAIL);
        let source = format!("{} <{email}>", user.username);
        if ctx.record(&token, &source, None) {
            debug!("reported personal token '{}' for {}", token.name, user.username);
        }
    }
}

async fn project_pass(
    api: &dyn GitLabApi,
    config: &Config,
    today: NaiveDate,
    ctx: &mut ScanContext,
) {
    let projects = fetch_all("projects", |page| api.projects_page(page)).await;
    ctx.mark_api_success(projects.succeeded);

    for project in projects.items {
        let tokens = match api.project_access_tokens(project.id).await {
            Ok(tokens) => {
                ctx.mark_api_success(true);
                tokens
            }
            Err(err) => {
                warn!(
                    "skipping tokens of project {}: {err}",
                    project.path_with_namespace
                );
                continue;
            }
        };

        let link = format!("{}/{}", config.base_url, project.path_with_namespace);
        for token in tokens {
            if !qualifies(&token, config, today) {
                continue;
            }
            if ctx.record(&token, "Project", Some(link.clone())) {
                debug!("reported project token '{}' in {link}", token.name);
            }
        }
    }
}

async fn group_pass(
    api: &dyn GitLabApi,
    config: &Config,
    today: NaiveDate,
    ctx: &mut ScanContext,
) {
    let groups = fetch_all("groups", |page| api.groups_page(page)).await;
    ctx.mark_api_success(groups.succeeded);

    for group in groups.items {
        let tokens = match api.group_access_tokens(group.id).await {
            Ok(tokens) => {
                ctx.mark_api_success(true);
                tokens
            }
            Err(err) => {
                warn!("skipping tokens of group {}: {err}", group.full_path);
                continue;
            }
        };

        let link = format!("{}/groups/{}", config.base_url, group.full_path);
        for token in tokens {
            if !qualifies(&token, config, today) {
                continue;
            }
            if ctx.record(&token, "Group", Some(link.clone())) {
                debug!("reported group token '{}' in {link}", token.name);
            }
        }
    }
}
