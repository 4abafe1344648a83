//! GitLab REST client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::pagination::{PageResult, PER_PAGE};
use super::{AccessToken, GitLabApi, Group, Project};
use crate::config::Config;
use crate::error::{ApiError, ConfigError, Result};

/// Per-request timeout. The run makes many small requests; one slow call
/// should not stall the whole audit for long.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// GitLab API client authenticated with an admin token
pub struct GitLabClient {
    http: HttpClient,
    api_url: String,
}

impl GitLabClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut token = HeaderValue::from_str(&config.admin_token).map_err(|_| {
            ConfigError::Invalid("admin token contains characters invalid in a header".to_string())
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("PRIVATE-TOKEN", token);

        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    /// Request one page of a paginated collection.
    ///
    /// A success status with an empty array is the end of the collection;
    /// anything else that is not a non-empty success page is a failure.
    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: usize) -> PageResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http
            .get(&url)
            .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<Vec<T>>().await {
                Ok(items) if items.is_empty() => PageResult::End,
                Ok(items) => PageResult::Items(items),
                Err(e) => PageResult::Failed(ApiError::InvalidResponse(e.to_string())),
            },
            Ok(resp) => PageResult::Failed(status_error(resp.status())),
            Err(e) => PageResult::Failed(ApiError::from(e)),
        }
    }

    /// Request a small, unpaginated list.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.api_url, path);
        let resp = self.http.get(&url).send().await.map_err(ApiError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status).into());
        }

        let items = resp
            .json::<Vec<T>>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(items)
    }
}

fn status_error(status: StatusCode) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized
    } else {
        ApiError::Status(status.as_u16())
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn personal_access_tokens_page(&self, page: usize) -> PageResult<AccessToken> {
        self.get_page("/personal_access_tokens", page).await
    }

    async fn projects_page(&self, page: usize) -> PageResult<Project> {
        self.get_page("/projects", page).await
    }

    async fn groups_page(&self, page: usize) -> PageResult<Group> {
        self.get_page("/groups", page).await
    }

    async fn project_access_tokens(&self, project_id: u64) -> Result<Vec<AccessToken>> {
        self.get_list(&format!("/projects/{project_id}/access_tokens"))
            .await
    }

    async fn group_access_tokens(&self, group_id: u64) -> Result<Vec<AccessToken>> {
        self.get_list(&format!("/groups/{group_id}/access_tokens"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_config(base: &str) -> Config {
        let cli = crate::cli::Cli::try_parse_from([
            "tokenwatch",
            "--base-url",
            base,
            "--admin-token",
            "glpat-test",
        ])
        .unwrap();
        Config::from_cli(&cli).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = test_config("http://gitlab.local");
        assert!(GitLabClient::new(&config).is_ok());
    }

    #[test]
    fn test_client_rejects_token_with_header_invalid_chars() {
        let mut config = test_config("http://gitlab.local");
        config.admin_token = "bad\ntoken".to_string();
        assert!(GitLabClient::new(&config).is_err());
    }

    #[test]
    fn test_status_error_maps_unauthorized() {
        match status_error(StatusCode::UNAUTHORIZED) {
            ApiError::Unauthorized => (),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
        match status_error(StatusCode::INTERNAL_SERVER_ERROR) {
            ApiError::Status(500) => (),
            other => panic!("expected Status(500), got {other:?}"),
        }
    }
}
