//! End-to-end scan scenarios against a mocked GitLab API
//!
//! Each test runs the real binary with its environment pointed at a
//! mockito server and checks the structured run result on stdout plus
//! what reached the chat webhook.

use assert_cmd::prelude::*;
use chrono::Utc;
use mockito::Matcher;
use predicates::prelude::*;
use std::process::Command;

fn date_in(days: i64) -> String {
    (Utc::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn tokenwatch(base_url: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tokenwatch"));
    cmd.env_clear()
        .env("GITLAB_BASE_URL", base_url)
        .env("GITLAB_ADMIN_TOKEN", "glpat-test")
        .env("LOGLEVEL", "debug");
    cmd
}

fn personal_token_body(expires_at: &str) -> String {
    format!(
        r#"[{{
            "id": 123,
            "name": "alice api token",
            "scopes": ["api"],
            "created_at": "2024-04-01T12:00:00Z",
            "last_used_at": "2024-04-20T12:00:00Z",
            "expires_at": "{expires_at}",
            "active": true,
            "revoked": false,
            "user": {{ "username": "alice", "email": "alice@example.com" }}
        }}]"#
    )
}

fn project_token_body(id: u64, expires_at: &str) -> String {
    format!(
        r#"[{{
            "id": {id},
            "name": "deploy token",
            "scopes": ["read_api"],
            "created_at": "2024-03-01T12:00:00Z",
            "last_used_at": null,
            "expires_at": "{expires_at}",
            "active": true,
            "revoked": false
        }}]"#
    )
}

fn mock_empty(server: &mut mockito::Server, path: &str) -> mockito::Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create()
}

#[test]
fn personal_token_in_window_is_reported_with_owner() {
    let mut server = mockito::Server::new();

    let _page1 = server
        .mock("GET", "/api/v4/personal_access_tokens")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(personal_token_body(&date_in(5)))
        .create();
    let _page2 = server
        .mock("GET", "/api/v4/personal_access_tokens")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    let _projects = mock_empty(&mut server, "/api/v4/projects");
    let _groups = mock_empty(&mut server, "/api/v4/groups");

    let chat = server
        .mock("POST", "/hooks/audit")
        .match_body(Matcher::Regex("alice <alice@example.com>".to_string()))
        .with_status(200)
        .with_body("ok")
        .create();

    tokenwatch(&server.url())
        .env("CHAT_WEBHOOK_URL", format!("{}/hooks/audit", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tokens_checked":1"#));

    chat.assert();
}

#[test]
fn project_token_reported_with_project_link() {
    let mut server = mockito::Server::new();

    let _personal = mock_empty(&mut server, "/api/v4/personal_access_tokens");
    let _projects1 = server
        .mock("GET", "/api/v4/projects")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(r#"[{ "id": 10, "path_with_namespace": "team/app" }]"#)
        .create();
    let _projects2 = server
        .mock("GET", "/api/v4/projects")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    let _tokens = server
        .mock("GET", "/api/v4/projects/10/access_tokens")
        .with_status(200)
        .with_body(project_token_body(456, &date_in(5)))
        .create();
    let _groups = mock_empty(&mut server, "/api/v4/groups");

    // The chat line carries the base URL joined with the project path
    let link = format!("Project: {}/team/app", server.url());
    let chat = server
        .mock("POST", "/hooks/audit")
        .match_body(Matcher::Regex(link))
        .with_status(200)
        .create();

    tokenwatch(&server.url())
        .env("CHAT_WEBHOOK_URL", format!("{}/hooks/audit", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tokens_checked":1"#));

    chat.assert();
}

#[test]
fn all_clear_sends_all_clear_notification() {
    let mut server = mockito::Server::new();

    let _personal = mock_empty(&mut server, "/api/v4/personal_access_tokens");
    let _projects = mock_empty(&mut server, "/api/v4/projects");
    let _groups = mock_empty(&mut server, "/api/v4/groups");

    let chat = server
        .mock("POST", "/hooks/audit")
        .match_body(Matcher::Regex("All tokens are valid".to_string()))
        .with_status(200)
        .create();

    tokenwatch(&server.url())
        .env("CHAT_WEBHOOK_URL", format!("{}/hooks/audit", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tokens_checked":0"#));

    chat.assert();
}

#[test]
fn fully_unreachable_api_reports_error_not_all_clear() {
    let mut server = mockito::Server::new();

    for path in [
        "/api/v4/personal_access_tokens",
        "/api/v4/projects",
        "/api/v4/groups",
    ] {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(500)
            .create();
    }

    let alert = server
        .mock("POST", "/hooks/audit")
        .match_body(Matcher::Regex("unreachable".to_string()))
        .with_status(200)
        .create();

    tokenwatch(&server.url())
        .env("CHAT_WEBHOOK_URL", format!("{}/hooks/audit", server.url()))
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""status":"error""#))
        .stdout(predicate::str::contains("unreachable"));

    alert.assert();
}

#[test]
fn failing_project_is_skipped_and_scan_continues() {
    let mut server = mockito::Server::new();

    let _personal = mock_empty(&mut server, "/api/v4/personal_access_tokens");
    let _projects1 = server
        .mock("GET", "/api/v4/projects")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(
            r#"[
                { "id": 1, "path_with_namespace": "team/broken" },
                { "id": 2, "path_with_namespace": "team/healthy" }
            ]"#,
        )
        .create();
    let _projects2 = server
        .mock("GET", "/api/v4/projects")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    let _broken = server
        .mock("GET", "/api/v4/projects/1/access_tokens")
        .with_status(500)
        .create();
    let _healthy = server
        .mock("GET", "/api/v4/projects/2/access_tokens")
        .with_status(200)
        .with_body(project_token_body(789, &date_in(3)))
        .create();
    let _groups = mock_empty(&mut server, "/api/v4/groups");

    tokenwatch(&server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tokens_checked":1"#));
}

#[test]
fn expired_token_is_still_reported() {
    let mut server = mockito::Server::new();

    let _page1 = server
        .mock("GET", "/api/v4/personal_access_tokens")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(personal_token_body(&date_in(-10)))
        .create();
    let _page2 = server
        .mock("GET", "/api/v4/personal_access_tokens")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    let _projects = mock_empty(&mut server, "/api/v4/projects");
    let _groups = mock_empty(&mut server, "/api/v4/groups");

    tokenwatch(&server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tokens_checked":1"#));
}

#[test]
fn chat_delivery_failure_does_not_fail_the_run() {
    let mut server = mockito::Server::new();

    let _personal = mock_empty(&mut server, "/api/v4/personal_access_tokens");
    let _projects = mock_empty(&mut server, "/api/v4/projects");
    let _groups = mock_empty(&mut server, "/api/v4/groups");

    let _chat = server
        .mock("POST", "/hooks/audit")
        .with_status(500)
        .create();

    tokenwatch(&server.url())
        .env("CHAT_WEBHOOK_URL", format!("{}/hooks/audit", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"ok""#));
}

#[test]
fn missing_admin_token_is_fatal_before_any_scan() {
    let server = mockito::Server::new();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tokenwatch"));
    cmd.env_clear()
        .env("GITLAB_BASE_URL", server.url())
        .assert()
        .failure()
        .stdout(predicate::str::contains("GITLAB_ADMIN_TOKEN"));
}
