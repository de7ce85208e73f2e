//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::common::{file_count, mount_page, test_config};
use tempfile::TempDir;
use wiki_archiver::archive::ArchiveFormat;
use wiki_archiver::crawler::{Coordinator, CrawlContext, Fetcher};
use wiki_archiver::inliner::CleanWarning;
use wiki_archiver::state::PageState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn coordinator(config: &wiki_archiver::Config) -> Coordinator {
    let fetcher = Fetcher::new(&config.http).expect("Failed to build fetcher");
    Coordinator::new(config, fetcher).expect("Failed to create coordinator")
}

/// Root links to A and B; A links to C and back to root; B links to A;
/// C links only to mail and an external site.
async fn mount_four_page_site(server: &MockServer, times: u64) {
    mount_page(
        server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/a">A</a>
            <a href="/b#section">B</a>
        </body></html>"#,
        times,
    )
    .await;
    mount_page(
        server,
        "/a",
        r#"<html><body><p>Page A</p><a href="c">C</a><a href="/">Home</a></body></html>"#,
        times,
    )
    .await;
    mount_page(
        server,
        "/b",
        r#"<html><body><p>Page B</p><a href="/a">A again</a></body></html>"#,
        times,
    )
    .await;
    mount_page(
        server,
        "/c",
        r#"<html><body><p>Page C</p>
            <a href="mailto:support@example.com">Mail</a>
            <a href="https://external.example.org/">Elsewhere</a>
        </body></html>"#,
        times,
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_visits_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_four_page_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server, dir.path(), ArchiveFormat::Html);
    let coordinator = coordinator(&config);

    let mut ctx = CrawlContext::new();
    let report = coordinator.run(&mut ctx).await;

    // Depth-first, first link first
    let expected: Vec<String> = ["/", "/a", "/c", "/b"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();
    assert_eq!(ctx.visit_order(), expected.as_slice());

    assert_eq!(report.count(PageState::Archived), 4);
    assert_eq!(report.written.len(), 4);
    assert!(report.failures.is_empty());
    assert_eq!(file_count(&config.output.pages_dir()), 4);

    // The external host and the mail link were never requested
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_pdf_archives_are_written() {
    let mock_server = MockServer::start().await;
    mount_four_page_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server, dir.path(), ArchiveFormat::Pdf);
    let coordinator = coordinator(&config);

    let report = coordinator.run(&mut CrawlContext::new()).await;

    assert_eq!(report.count(PageState::Archived), 4);
    for entry in &report.written {
        assert_eq!(entry.path.extension().unwrap(), "pdf");
        let bytes = std::fs::read(&entry.path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}

#[tokio::test]
async fn test_rerun_fetches_nothing_already_archived() {
    let mock_server = MockServer::start().await;
    mount_four_page_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server, dir.path(), ArchiveFormat::Pdf);
    let coordinator = coordinator(&config);

    let first = coordinator.run(&mut CrawlContext::new()).await;
    assert_eq!(first.count(PageState::Archived), 4);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);

    let destination = coordinator
        .archiver()
        .destination(coordinator.scope().root());
    let before = std::fs::read(&destination).unwrap();

    let mut ctx = CrawlContext::new();
    let second = coordinator.run(&mut ctx).await;

    // The root is archived, so it is neither requested nor expanded
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
    assert_eq!(ctx.visited_count(), 1);
    assert_eq!(second.count(PageState::AlreadyArchived), 1);
    assert!(second.written.is_empty());
    assert_eq!(file_count(&config.output.pages_dir()), 4);
    assert_eq!(std::fs::read(&destination).unwrap(), before);
}

#[tokio::test]
async fn test_rerun_descending_into_archived_writes_nothing_new() {
    let mock_server = MockServer::start().await;
    // Archived pages are fetched again for link discovery on the second run
    mount_four_page_site(&mock_server, 2).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&mock_server, dir.path(), ArchiveFormat::Text);
    config.crawl.descend_into_archived = true;
    let coordinator = coordinator(&config);

    let first = coordinator.run(&mut CrawlContext::new()).await;
    assert_eq!(first.count(PageState::Archived), 4);

    let second = coordinator.run(&mut CrawlContext::new()).await;
    assert_eq!(second.count(PageState::AlreadyArchived), 4);
    assert!(second.written.is_empty());
    assert_eq!(file_count(&config.output.pages_dir()), 4);
}

#[tokio::test]
async fn test_seeded_visited_set_is_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/skip">Skip</a><a href="/keep">Keep</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/skip", "<html><body>skip</body></html>", 0).await;
    mount_page(&mock_server, "/keep", "<html><body>keep</body></html>", 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server, dir.path(), ArchiveFormat::Html);
    let coordinator = coordinator(&config);

    let mut ctx = CrawlContext::with_visited([format!("{}/skip", base_url)]);
    let report = coordinator.run(&mut ctx).await;

    assert_eq!(report.count(PageState::Archived), 2);
    assert_eq!(ctx.state(&format!("{}/skip", base_url)), None);
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/broken">Broken</a>
            <a href="/manual.pdf">Manual</a>
            <a href="/ok">Ok</a>
        </body></html>"#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/manual.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/ok", "<html><body><p>Fine</p></body></html>", 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server, dir.path(), ArchiveFormat::Html);
    let coordinator = coordinator(&config);

    let mut ctx = CrawlContext::new();
    let report = coordinator.run(&mut ctx).await;

    assert_eq!(
        ctx.state(&format!("{}/broken", base_url)),
        Some(PageState::FetchFailed)
    );
    assert_eq!(
        ctx.state(&format!("{}/manual.pdf", base_url)),
        Some(PageState::FetchFailed)
    );
    assert_eq!(
        ctx.state(&format!("{}/ok", base_url)),
        Some(PageState::Archived)
    );
    assert_eq!(report.failures.len(), 2);
    assert_eq!(file_count(&config.output.pages_dir()), 2);
}

#[tokio::test]
async fn test_images_are_inlined_or_dropped() {
    let mock_server = MockServer::start().await;
    let png_bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    mount_page(
        &mock_server,
        "/",
        r#"<html><head>
            <link rel="stylesheet" href="https://fonts.googleapis.com/css?family=Roboto">
            <script>track();</script>
        </head><body>
            <img src="/img/logo.png" alt="logo">
            <img src="/img/missing.png" alt="gone">
            <input type="date" name="when">
        </body></html>"#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/img/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png_bytes)
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server, dir.path(), ArchiveFormat::Html);
    let coordinator = coordinator(&config);

    let report = coordinator.run(&mut CrawlContext::new()).await;
    assert_eq!(report.written.len(), 1);

    let html = std::fs::read_to_string(&report.written[0].path).unwrap();
    assert!(html.contains("data:image/png;base64,iVBORw0KGgo="));
    assert!(!html.contains("/img/logo.png"));
    assert!(!html.contains("missing.png"));
    assert!(!html.contains("track()"));
    assert!(!html.contains("fonts.googleapis.com"));
    assert!(!html.contains(r#"type="date""#));

    assert_eq!(report.warnings.len(), 3);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(&w.warning, CleanWarning::ImageDropped { src, .. } if src == "/img/missing.png")));
}
