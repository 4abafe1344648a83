//! GitLab API client

use async_trait::async_trait;

use crate::error::Result;

pub mod gitlab;
pub mod models;
pub mod pagination;

pub use gitlab::GitLabClient;
pub use models::{AccessToken, Group, Project, TokenUser};
pub use pagination::{fetch_all, FetchOutcome, PageResult};

/// The slice of the GitLab REST API the audit consumes.
///
/// Page-oriented methods return a [`PageResult`] so the pagination loop can
/// tell end-of-results apart from a failed request. The per-resource token
/// lists are single requests; the API serves them unpaginated for the list
/// sizes this job sees.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// One page of `/personal_access_tokens`
    async fn personal_access_tokens_page(&self, page: usize) -> PageResult<AccessToken>;

    /// One page of `/projects`
    async fn projects_page(&self, page: usize) -> PageResult<Project>;

    /// One page of `/groups`
    async fn groups_page(&self, page: usize) -> PageResult<Group>;

    /// `/projects/{id}/access_tokens`
    async fn project_access_tokens(&self, project_id: u64) -> Result<Vec<AccessToken>>;

    /// `/groups/{id}/access_tokens`
    async fn group_access_tokens(&self, group_id: u64) -> Result<Vec<AccessToken>>;
}
