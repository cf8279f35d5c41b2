use clap::Parser;
use hub_tag_cleaner::cli::{Args, Runner};
use hub_tag_cleaner::{CleanerConfig, CleanerError, Logger};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_TOKEN: &str = "session-token";

fn parse_config(server: &MockServer, extra: &[&str]) -> CleanerConfig {
    let registry_url = format!("{}/v2", server.uri());
    let mut argv = vec!["hub-tag-cleaner", "--registry-url", registry_url.as_str()];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap().into_config().unwrap()
}

fn config(server: &MockServer, extra: &[&str]) -> CleanerConfig {
    let mut argv = vec!["--user", "acme"];
    argv.extend_from_slice(extra);
    parse_config(server, &argv)
}

fn tag(name: &str, last_updated: &str) -> Value {
    json!({ "name": name, "last_updated": last_updated, "full_size": 1024 })
}

/// Five tags, v4 newest, v0 oldest
fn five_tags() -> Vec<Value> {
    vec![
        tag("v4", "2024-05-05T00:00:00Z"),
        tag("v3", "2024-05-04T00:00:00Z"),
        tag("v2", "2024-05-03T00:00:00Z"),
        tag("v1", "2024-05-02T00:00:00Z"),
        tag("v0", "2024-05-01T00:00:00Z"),
    ]
}

async fn mount_login(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/users/login"))
        .and(body_json(json!({ "username": "acme", "password": "pat" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": SESSION_TOKEN })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_single_page(server: &MockServer, repo: &str, tags: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/repositories/acme/{}/tags", repo)))
        .and(query_param("page_size", "100"))
        .and(header("Authorization", format!("Bearer {}", SESSION_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "count": tags.len(), "next": null, "results": tags })),
        )
        .mount(server)
        .await;
}

async fn mount_delete(server: &MockServer, repo: &str, tag: &str, status: u16, expected_calls: u64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/repositories/acme/{}/tags/{}/", repo, tag)))
        .and(header("Authorization", format!("Bearer {}", SESSION_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn delete_requests(server: &MockServer) -> Vec<String> {
    let mut paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .map(|r| r.url.path().to_string())
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_keeps_newest_three_across_pages() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    // Second page holds newer tags than the first to exercise the re-sort
    let next = format!("{}/v2/repositories/acme/web/tags?page=2&page_size=100", server.uri());
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/web/tags"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "next": next,
            "results": [tag("v1", "2024-05-02T00:00:00Z"), tag("v0", "2024-05-01T00:00:00Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/web/tags"))
        .and(query_param("page", "2"))
        .and(header("Authorization", format!("Bearer {}", SESSION_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "next": null,
            "results": [
                tag("v4", "2024-05-05T00:00:00Z"),
                tag("v3", "2024-05-04T00:00:00Z"),
                tag("v2", "2024-05-03T00:00:00Z")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_delete(&server, "web", "v1", 204, 1).await;
    mount_delete(&server, "web", "v0", 204, 1).await;

    let config = config(&server, &["--repos", r#"["web"]"#, "--keep-last", "3", "--password", "pat"]);
    let summary = Runner::new(config, Logger::default()).run().await.unwrap();

    let report = &summary.reports[0];
    assert_eq!(report.total_tags, 5);
    assert_eq!(report.deleted, vec!["v1", "v0"]);
    assert_eq!(report.kept(), 3);
}

#[tokio::test]
async fn test_relative_next_cursor_keeps_base_path() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/web/tags"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": "repositories/acme/web/tags?page=2&page_size=100",
            "results": [tag("v4", "2024-05-05T00:00:00Z"), tag("v3", "2024-05-04T00:00:00Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/web/tags"))
        .and(query_param("page", "2"))
        .and(header("Authorization", format!("Bearer {}", SESSION_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "results": [tag("v2", "2024-05-03T00:00:00Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_delete(&server, "web", "v2", 204, 1).await;

    let config = config(&server, &["--repos", r#"["web"]"#, "--keep-last", "2", "--password", "pat"]);
    let summary = Runner::new(config, Logger::default()).run().await.unwrap();

    assert_eq!(summary.reports[0].total_tags, 3);
    assert_eq!(summary.reports[0].deleted, vec!["v2"]);
}

#[tokio::test]
async fn test_next_cursor_on_other_origin_is_not_followed() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/web/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": format!("{}/v2/repositories/acme/web/tags?page=2", elsewhere.uri()),
            "results": five_tags()
        })))
        .mount(&server)
        .await;

    let config = config(&server, &["--repos", r#"["web"]"#, "--keep-last", "1", "--password", "pat"]);
    let err = Runner::new(config, Logger::default()).run().await.unwrap_err();

    assert!(err.to_string().contains("different origin"));
    assert!(elsewhere.received_requests().await.unwrap_or_default().is_empty());
    assert!(delete_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_user_with_token_logs_in_with_token_as_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/users/login"))
        .and(body_json(json!({ "username": "acme", "password": "dckr_pat_x" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": SESSION_TOKEN })))
        .expect(1)
        .mount(&server)
        .await;
    mount_single_page(&server, "web", five_tags()[..2].to_vec()).await;

    let config = config(&server, &["--repos", r#"["web"]"#, "--keep-last", "3", "--token", "dckr_pat_x"]);
    Runner::new(config, Logger::default()).run().await.unwrap();
}

#[tokio::test]
async fn test_substring_filter_with_keep_two() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_single_page(
        &server,
        "web",
        vec![
            tag("v3", "2024-05-04T00:00:00Z"),
            tag("v2-rc", "2024-05-03T00:00:00Z"),
            tag("v1-rc", "2024-05-02T00:00:00Z"),
            tag("v0", "2024-05-01T00:00:00Z"),
        ],
    )
    .await;
    mount_delete(&server, "web", "v1-rc", 204, 1).await;

    let config = config(
        &server,
        &["--repos", r#"["web"]"#, "--keep-last", "2", "--substrings", r#"["-rc"]"#, "--password", "pat"],
    );
    Runner::new(config, Logger::default()).run().await.unwrap();

    assert_eq!(
        delete_requests(&server).await,
        vec!["/v2/repositories/acme/web/tags/v1-rc/"]
    );
}

#[tokio::test]
async fn test_keep_zero_without_force_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let registry_url = format!("{}/v2", server.uri());

    let result = Args::try_parse_from([
        "hub-tag-cleaner",
        "--user", "acme",
        "--repos", r#"["web"]"#,
        "--keep-last", "0",
        "--password", "pat",
        "--registry-url", registry_url.as_str(),
    ])
    .unwrap()
    .into_config();

    assert!(matches!(result, Err(CleanerError::Config(_))));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_one_failing_repository_does_not_undo_the_others() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_single_page(&server, "web", five_tags()).await;
    mount_single_page(&server, "db", five_tags()).await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/api/tags"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    for repo in ["web", "db"] {
        mount_delete(&server, repo, "v1", 204, 1).await;
        mount_delete(&server, repo, "v0", 204, 1).await;
    }

    let config = config(
        &server,
        &["--repos", r#"["web", "api", "db"]"#, "--keep-last", "3", "--password", "pat"],
    );
    let err = Runner::new(config, Logger::default()).run().await.unwrap_err();

    match err {
        CleanerError::BatchFailed { total, failed, details } => {
            assert_eq!((total, failed), (3, 1));
            assert!(details.contains("acme/api"));
            assert!(details.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(delete_requests(&server).await.len(), 4);
}

#[tokio::test]
async fn test_failed_deletion_is_reported_and_siblings_stay_deleted() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_single_page(&server, "web", five_tags()).await;
    mount_delete(&server, "web", "v1", 204, 1).await;
    mount_delete(&server, "web", "v0", 403, 1).await;

    let config = config(&server, &["--repos", r#"["web"]"#, "--keep-last", "3", "--password", "pat"]);
    let err = Runner::new(config, Logger::default()).run().await.unwrap_err();

    assert!(err.to_string().contains("Failed to delete tag v0 from acme/web"));
    assert_eq!(delete_requests(&server).await.len(), 2);
}

#[tokio::test]
async fn test_second_run_deletes_nothing() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_single_page(&server, "web", five_tags()[..3].to_vec()).await;

    let config = config(&server, &["--repos", r#"["web"]"#, "--keep-last", "3", "--password", "pat"]);
    let summary = Runner::new(config, Logger::default()).run().await.unwrap();

    assert_eq!(summary.total_deleted(), 0);
    assert!(delete_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_rejected_login_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/users/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Incorrect authentication credentials" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server, &["--repos", r#"["web", "api"]"#, "--keep-last", "3", "--password", "pat"]);
    let err = Runner::new(config, Logger::default()).run().await.unwrap_err();

    assert!(matches!(err, CleanerError::Auth(_)));
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_token_refresh_per_request_logs_in_for_every_call() {
    let server = MockServer::start().await;
    // authenticate + one listing + two deletions
    mount_login(&server, 4).await;
    mount_single_page(&server, "web", five_tags()).await;
    mount_delete(&server, "web", "v1", 204, 1).await;
    mount_delete(&server, "web", "v0", 204, 1).await;

    let config = config(
        &server,
        &["--repos", r#"["web"]"#, "--keep-last", "3", "--password", "pat", "--refresh-token-per-request"],
    );
    Runner::new(config, Logger::default()).run().await.unwrap();
}

#[tokio::test]
async fn test_pre_issued_token_skips_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/users/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/acme/web/tags"))
        .and(header("Authorization", "Bearer pre-issued"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "next": null, "results": five_tags() })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(header("Authorization", "Bearer pre-issued"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = parse_config(&server, &["--repos", r#"["acme/web"]"#, "--keep-last", "4", "--token", "pre-issued"]);
    let summary = Runner::new(config, Logger::default()).run().await.unwrap();
    assert_eq!(summary.reports[0].deleted, vec!["v0"]);
}

#[tokio::test]
async fn test_dry_run_issues_no_deletes() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_single_page(&server, "web", five_tags()).await;

    let config = config(
        &server,
        &["--repos", r#"["web"]"#, "--keep-last", "1", "--password", "pat", "--dry-run"],
    );
    let summary = Runner::new(config, Logger::default()).run().await.unwrap();

    assert_eq!(summary.reports[0].eligible, vec!["v3", "v2", "v1", "v0"]);
    assert!(summary.reports[0].deleted.is_empty());
    assert!(delete_requests(&server).await.is_empty());
}
