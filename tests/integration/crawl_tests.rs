//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full scan cycle end-to-end.

use paraxm::config::ScanConfig;
use paraxm::crawler::{run_scan, Coordinator, ScanReport};
use paraxm::extract::{Finding, Source};
use paraxm::output::build_handlers;
use paraxm::state::PageState;
use paraxm::storage::{open_storage, ScanStatus, Storage};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server root
fn create_test_config(base_url: &str) -> ScanConfig {
    let mut config = ScanConfig::new(format!("{}/", base_url));
    config.depth = 2;
    config.threads = 5;
    config.timeout = 5;
    config.max_retries = 1;
    config.retry_backoff_ms = 10;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn find<'a>(report: &'a ScanReport, url: &str, parameter: &str) -> Option<&'a Finding> {
    report
        .findings
        .iter()
        .find(|f| f.url == url && f.parameter == parameter)
}

#[tokio::test]
async fn test_form_fields_reported_against_action() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<form action="/search" method="get"><input name="query"></form>"#,
    )
    .await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();

    assert_eq!(report.findings.len(), 1, "findings: {:?}", report.findings);
    let finding = &report.findings[0];
    assert_eq!(finding.url, format!("{}/search", base_url));
    assert_eq!(finding.parameter, "query");
    assert_eq!(finding.source, Source::HtmlForm);
    assert_eq!(finding.method, "GET");
    assert_eq!(finding.status_code, 200);
}

#[tokio::test]
async fn test_script_fetch_call_parameters() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<script>fetch("/api?id=5&sort=asc").then(r => r.json());</script>"#,
    )
    .await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();
    let api = format!("{}/api", base_url);

    assert_eq!(report.findings.len(), 2, "findings: {:?}", report.findings);
    for parameter in ["id", "sort"] {
        let finding = find(&report, &api, parameter)
            .unwrap_or_else(|| panic!("missing {} in {:?}", parameter, report.findings));
        assert_eq!(finding.source, Source::JavaScript);
    }
}

#[tokio::test]
async fn test_comment_parameters() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "<!-- debug?token=XYZ --><p>Hello</p>").await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();

    let finding = find(&report, &format!("{}/", base_url), "token")
        .unwrap_or_else(|| panic!("missing token in {:?}", report.findings));
    assert_eq!(finding.source, Source::Comment);
}

#[tokio::test]
async fn test_full_crawl_follows_same_host_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/page1">Page 1</a><a href="/page2?lang=en">Page 2</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<form action="/login" method="post"><input name="username"><input name="password"></form>"#,
    )
    .await;
    mount_page(&mock_server, "/page2", "<p>Content 2</p>").await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.page_counts.get(&PageState::Processed), Some(&3));

    let lang = find(&report, &format!("{}/page2", base_url), "lang").unwrap();
    assert_eq!(lang.source, Source::HtmlLink);

    let login = format!("{}/login", base_url);
    let username = find(&report, &login, "username").unwrap();
    assert_eq!(username.source, Source::HtmlForm);
    assert_eq!(username.method, "POST");
    assert!(find(&report, &login, "password").is_some());
}

#[tokio::test]
async fn test_pages_fetched_once_and_findings_deduplicated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Every page links to every other page and repeats the same parameter.
    let body = r#"<a href="/">Home</a><a href="/a">A</a><a href="/b#top">B</a>
        <a href="/b">B again</a><a href="/search?term=x">Search</a>"#;

    for page in ["/", "/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html("<p>results</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.depth = 4;

    let report = run_scan(config).await.unwrap();

    assert_eq!(report.pages_visited, 4);
    let term: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.parameter == "term")
        .collect();
    assert_eq!(term.len(), 1);
    assert_eq!(term[0].url, format!("{}/search", base_url));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/level1">1</a>"#).await;
    mount_page(
        &mock_server,
        "/level1",
        r#"<a href="/level2?deep=1">2</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html(r#"<a href="/level3">3</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();

    assert_eq!(report.pages_visited, 2);
    // The link is still reported even though it is not followed.
    assert!(find(&report, &format!("{}/level2", base_url), "deep").is_some());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_other_hosts_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();

    // Same port, different host name.
    let body = format!(
        r#"<a href="http://localhost:{}/elsewhere">Elsewhere</a>
        <a href="https://other.invalid/track?campaign=1">Other</a>"#,
        port
    );
    mount_page(&mock_server, "/", &body).await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(html("<p>unreachable</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();

    assert_eq!(report.pages_visited, 1);
    // Parameters on external links are still findings.
    let campaign = find(&report, "https://other.invalid/track", "campaign").unwrap();
    assert_eq!(campaign.source, Source::HtmlLink);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_non_html_content_scanned_but_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/data.json">Data</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!(
                    r#"{{"next": "{}/api/items?page=2", "link": "/hidden"}}"#,
                    base_url
                ),
                "application/json",
            ),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("<p>hidden</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.depth = 3;

    let report = run_scan(config).await.unwrap();

    assert_eq!(report.page_counts.get(&PageState::Processed), Some(&1));
    assert_eq!(report.page_counts.get(&PageState::ContentMismatch), Some(&1));

    let page = find(&report, &format!("{}/api/items", base_url), "page").unwrap();
    assert_eq!(page.source, Source::UrlInContent);
    assert_eq!(page.content_type, "application/json");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_error_status_pages_are_still_scanned() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(
                r#"<html><body><a href="/home?ref=404">Home</a></body></html>"#,
                "text/html",
            ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/home", "<p>home</p>").await;

    let report = run_scan(create_test_config(&base_url)).await.unwrap();

    let finding = find(&report, &format!("{}/home", base_url), "ref").unwrap();
    assert_eq!(finding.status_code, 404);
    assert_eq!(report.pages_visited, 2);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_unreachable_links_do_not_abort_scan() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Port 1 is closed; the branch is abandoned after its retries.
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/ok?x1=1">ok</a><form action="/go"><input name="keyword"></form>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", "<p>fine</p>").await;

    let mut config = create_test_config("http://127.0.0.1:1");
    config.max_retries = 2;
    let report = run_scan(config).await.unwrap();
    assert!(report.findings.is_empty());
    assert_eq!(report.page_counts.get(&PageState::Unreachable), Some(&1));

    // The live server is unaffected by the failed scan above.
    let report = run_scan(create_test_config(&base_url)).await.unwrap();
    assert_eq!(report.page_counts.get(&PageState::Processed), Some(&2));
    assert!(find(&report, &format!("{}/go", base_url), "keyword").is_some());
    assert!(find(&report, &format!("{}/ok", base_url), "x1").is_some());
}

#[tokio::test]
async fn test_rate_limit_paces_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/p1">1</a><a href="/p2">2</a>"#,
    )
    .await;
    mount_page(&mock_server, "/p1", "<p>1</p>").await;
    mount_page(&mock_server, "/p2", "<p>2</p>").await;

    let mut config = create_test_config(&base_url);
    config.rate_limit = 2.0;
    config.threads = 1;

    let start = Instant::now();
    let report = run_scan(config).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.pages_visited, 3);
    // One immediate request, then two more at 500ms intervals.
    assert!(
        elapsed >= Duration::from_millis(900),
        "scan finished too quickly: {:?}",
        elapsed
    );
}

#[test]
fn test_coordinator_rejects_invalid_settings() {
    let mut config = ScanConfig::new("example.com");
    config.timeout = 0;

    assert!(Coordinator::new(config).is_err());
}

#[tokio::test]
async fn test_outputs_written() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<form action="/search"><input name="query"><input name="page_size"></form>"#,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let text_path = dir.path().join("params.txt");
    let summary_path = dir.path().join("report.md");
    let db_path = dir.path().join("paraxm.db");

    let mut config = create_test_config(&base_url);
    config.output_file = Some(text_path.display().to_string());
    config.summary_file = Some(summary_path.display().to_string());
    config.database = Some(db_path.display().to_string());

    let report = run_scan(config.clone()).await.unwrap();
    for handler in build_handlers(&config).unwrap() {
        handler.write_report(&report).unwrap();
    }

    let text = std::fs::read_to_string(&text_path).unwrap();
    assert_eq!(
        text,
        format!(
            "{0}/search?query=FUZZ\n{0}/search?page_size=FUZZ\n",
            base_url
        )
    );

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("# ParaXm Scan Report"));
    assert!(summary.contains("| `query` | HTML-Form | GET | 200 |"));

    let storage = open_storage(&db_path).unwrap();
    let scan = storage.get_latest_scan().unwrap().unwrap();
    assert_eq!(scan.target, format!("{}/", base_url));
    assert_eq!(scan.status, ScanStatus::Completed);
    assert_eq!(scan.config_hash, report.config_hash);
    assert_eq!(storage.count_findings(scan.id).unwrap(), 2);
}

#[tokio::test]
async fn test_timed_out_branch_does_not_affect_siblings() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(r#"<a href="/never?hidden=1">x</a>"#).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", r#"<a href="/fast/child">Child</a>"#).await;
    mount_page(
        &mock_server,
        "/fast/child",
        r#"<form action="/submit"><input name="alpha"></form>"#,
    )
    .await;

    let mut config = create_test_config(&base_url);
    config.depth = 3;
    config.timeout = 1;
    config.max_retries = 1;

    let report = run_scan(config).await.unwrap();

    assert_eq!(report.page_counts.get(&PageState::Unreachable), Some(&1));
    assert!(find(&report, &format!("{}/submit", base_url), "alpha").is_some());
    assert!(find(&report, &format!("{}/never", base_url), "hidden").is_none());
}

#[tokio::test]
async fn test_retry_recovers_from_transient_timeout() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/flaky">Flaky</a>"#).await;

    // First request times out, the retry is served promptly.
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<p>too late</p>").set_delay(Duration::from_secs(3)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html(r#"<a href="/z?beta=1">Z</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/z", "<p>z</p>").await;

    let mut config = create_test_config(&base_url);
    config.depth = 3;
    config.timeout = 1;
    config.max_retries = 1;

    let report = run_scan(config).await.unwrap();

    assert_eq!(report.page_counts.get(&PageState::Unreachable), None);
    assert_eq!(report.page_counts.get(&PageState::Processed), Some(&3));
    let beta = find(&report, &format!("{}/z", base_url), "beta").unwrap();
    assert_eq!(beta.source, Source::HtmlLink);

    mock_server.verify().await;
}
