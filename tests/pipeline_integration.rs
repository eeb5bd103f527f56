//! End-to-end tests for `run_pipeline`.
//!
//! Redirect chains are served by a local mock server; status records and
//! index documents land in a temporary SQLite file.

mod helpers;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::{count_documents, create_test_pool_with_path, fetch_status, test_config, write_input};
use url_expander::run_pipeline;

/// Mounts `/hop/0 -> /hop/1 -> ... -> /hop/{hops}`; the last hop answers 200.
async fn mount_chain(server: &MockServer, hops: usize) {
    for i in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{}", i)))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/hop/{}", server.uri(), i + 1)),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/hop/{}", hops)))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_long_chain_truncated_and_indexed() {
    let server = MockServer::start().await;
    mount_chain(&server, 5).await;
    let start = format!("{}/hop/0", server.uri());
    let third_hop = format!("{}/hop/3", server.uri());

    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("expander.db");
    let input = write_input(&[format!(r#"{{"url": "{}"}}"#, start)]);
    let mut config = test_config(input.path(), &db_path);
    config.max_redirects = 3;
    config.commit_threshold = Some(1);

    let report = run_pipeline(config).await.expect("pipeline run");

    assert_eq!(report.total_items, 1);
    assert_eq!(report.acked, 1);
    assert_eq!(report.articles, 1);
    assert_eq!(report.indexed, 1);
    assert_eq!(report.commits, 1);
    assert_eq!(report.media, 0);

    // The URL reached after the third hop is accepted without being probed
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3);

    let pool = create_test_pool_with_path(&db_path).await;
    let (expanded, domain, status) = fetch_status(&pool, &start).await.expect("status row");
    assert_eq!(expanded.as_deref(), Some(third_hop.as_str()));
    assert_eq!(domain.as_deref(), Some("127.0.0.1"));
    assert_eq!(status, None);
    assert_eq!(count_documents(&pool).await, 1);
}

#[tokio::test]
async fn test_media_host_routed_to_media_output() {
    let server = MockServer::start().await;
    mount_chain(&server, 1).await;
    let start = format!("{}/hop/0", server.uri());

    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("expander.db");
    let media_out = dir.path().join("media.jsonl");
    let input = write_input(&[start.clone()]);
    let mut config = test_config(input.path(), &db_path);
    config.media_hosts = vec!["127.0.0.1".to_string()];
    config.media_out = Some(media_out.clone());

    let report = run_pipeline(config).await.expect("pipeline run");

    assert_eq!(report.media, 1);
    assert_eq!(report.articles, 0);

    let written = std::fs::read_to_string(&media_out).expect("media output");
    let line: serde_json::Value =
        serde_json::from_str(written.lines().next().expect("one media item")).expect("json");
    assert_eq!(line["item"]["original_url"], start.as_str());
    assert_eq!(
        line["item"]["canonical_url"],
        format!("{}/hop/1", server.uri()).as_str()
    );

    let pool = create_test_pool_with_path(&db_path).await;
    assert_eq!(count_documents(&pool).await, 0);
}

#[tokio::test]
async fn test_unreachable_url_recorded_as_failed_and_acked() {
    // Bind then drop a listener to get a port nobody is serving
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let url = format!("http://127.0.0.1:{}/gone", port);

    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("expander.db");
    let input = write_input(&[url.clone()]);
    let config = test_config(input.path(), &db_path);

    let report = run_pipeline(config).await.expect("pipeline run");

    assert_eq!(report.acked, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.media + report.articles, 0);

    let pool = create_test_pool_with_path(&db_path).await;
    let (expanded, _, status) = fetch_status(&pool, &url).await.expect("status row");
    assert_eq!(expanded, None);
    assert_eq!(status.as_deref(), Some("failed"));
}

#[tokio::test]
async fn test_unreachable_url_failed_after_redeliveries_when_strict() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let url = format!("http://127.0.0.1:{}/gone", port);

    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("expander.db");
    let input = write_input(&[url]);
    let mut config = test_config(input.path(), &db_path);
    config.fail_unresolved = true;
    config.max_redeliveries = 1;

    let report = run_pipeline(config).await.expect("pipeline run");

    assert_eq!(report.acked, 0);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_items_without_url_are_failed() {
    let server = MockServer::start().await;
    mount_chain(&server, 0).await;

    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("expander.db");
    let input = write_input(&[
        r#"{"domain": "a.com"}"#.to_string(),
        format!("{}/hop/0", server.uri()),
        "# comment".to_string(),
    ]);
    let mut config = test_config(input.path(), &db_path);
    config.max_redeliveries = 0;

    let report = run_pipeline(config).await.expect("pipeline run");

    assert_eq!(report.total_items, 2);
    assert_eq!(report.acked, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_missing_input_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir.path().join("missing.txt"), &dir.path().join("x.db"));

    let err = run_pipeline(config).await.expect_err("missing input");
    assert!(format!("{:#}", err).contains("Failed to open input file"));
}
