//! Integration tests for release-note harvesting

use crate::common::{file_count, mount_page, test_config};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiki_archiver::archive::ArchiveFormat;
use wiki_archiver::config::Config;
use wiki_archiver::crawler::Fetcher;
use wiki_archiver::releases::{HarvestReport, ReleaseHarvester};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BODY: &[u8] = b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n%%EOF\n";

fn harvester(config: &Config) -> ReleaseHarvester {
    let fetcher = Fetcher::new(&config.http).expect("Failed to build fetcher");
    ReleaseHarvester::new(
        fetcher,
        config.output.releases_dir(),
        config.releases.clone(),
    )
}

fn index_url(config: &Config) -> Url {
    Url::parse(&config.site.release_index_url).unwrap()
}

async fn mount_download(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Index with one link of every kind
async fn mount_release_site(server: &MockServer) {
    mount_page(
        server,
        "/build-history",
        r#"<html><body>
            <a href="/files/Release-Notes-5.0.PDF">5.0</a>
            <a href="https://drive.google.com/file/d/abc_123/view?usp=sharing">5.1</a>
            <a href="/files/login.pdf">5.2</a>
            <a href="/files/secret.pdf">5.3</a>
            <a href="/files/gone.pdf">5.4</a>
            <a href="/wiki/home">Home</a>
        </body></html>"#,
        1,
    )
    .await;

    mount_download(
        server,
        "/files/Release-Notes-5.0.PDF",
        ResponseTemplate::new(200)
            .set_body_bytes(PDF_BODY.to_vec())
            .insert_header("content-type", "application/pdf"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("export", "download"))
        .and(query_param("id", "abc_123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BODY.to_vec()))
        .expect(1)
        .mount(server)
        .await;

    // A sign-in page served in place of the file
    mount_download(
        server,
        "/files/login.pdf",
        ResponseTemplate::new(200)
            .set_body_string("<html>login</html>")
            .insert_header("content-type", "text/html"),
    )
    .await;

    mount_download(server, "/files/secret.pdf", ResponseTemplate::new(403)).await;
    mount_download(server, "/files/gone.pdf", ResponseTemplate::new(404)).await;
}

fn release_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = test_config(server, dir.path(), ArchiveFormat::Pdf);
    config.releases.share_download_url = format!("{}/uc?export=download", server.uri());
    config
}

#[tokio::test]
async fn test_harvest_saves_only_verified_files() {
    let mock_server = MockServer::start().await;
    mount_release_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = release_config(&mock_server, &dir);
    let harvester = harvester(&config);

    let report = harvester.harvest(&index_url(&config)).await.unwrap();

    assert_eq!(
        report,
        HarvestReport {
            saved: 2,
            already_present: 0,
            forbidden: 1,
            rejected: 1,
            failed: 1,
            skipped: 1,
            files: report.files.clone(),
        }
    );

    // Only the two verified files exist; no temporary leftovers
    let releases_dir = config.output.releases_dir();
    assert_eq!(file_count(&releases_dir), 2);
    for file in &report.files {
        assert_eq!(std::fs::read(file).unwrap(), PDF_BODY);
        assert_eq!(file.extension().unwrap(), "pdf");
    }

    let login_url = Url::parse(&format!("{}/files/login.pdf", mock_server.uri())).unwrap();
    assert!(!harvester.destination(&login_url).exists());
}

#[tokio::test]
async fn test_second_harvest_skips_existing_files() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/build-history",
        r#"<a href="/files/notes.pdf">Notes</a>"#,
        2,
    )
    .await;
    mount_download(
        &mock_server,
        "/files/notes.pdf",
        ResponseTemplate::new(200).set_body_bytes(PDF_BODY.to_vec()),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = release_config(&mock_server, &dir);
    let harvester = harvester(&config);

    let first = harvester.harvest(&index_url(&config)).await.unwrap();
    assert_eq!(first.saved, 1);

    let second = harvester.harvest(&index_url(&config)).await.unwrap();
    assert_eq!(second.saved, 0);
    assert_eq!(second.already_present, 1);
    assert_eq!(file_count(&config.output.releases_dir()), 1);
}

#[tokio::test]
async fn test_unreachable_index_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/build-history"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = release_config(&mock_server, &dir);
    let harvester = harvester(&config);

    assert!(harvester.harvest(&index_url(&config)).await.is_err());
    assert_eq!(file_count(&config.output.releases_dir()), 0);
}

#[tokio::test]
async fn test_body_shorter_than_signature_is_rejected() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/build-history",
        r#"<a href="/files/truncated.pdf">Truncated</a>"#,
        1,
    )
    .await;
    mount_download(
        &mock_server,
        "/files/truncated.pdf",
        ResponseTemplate::new(200).set_body_bytes(b"%P".to_vec()),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = release_config(&mock_server, &dir);
    let harvester = harvester(&config);

    let report = harvester.harvest(&index_url(&config)).await.unwrap();
    assert_eq!(report.rejected, 1);
    assert_eq!(report.saved, 0);

    let truncated = Url::parse(&format!("{}/files/truncated.pdf", mock_server.uri())).unwrap();
    assert!(!harvester.destination(&truncated).exists());
    assert_eq!(file_count(&config.output.releases_dir()), 0);
}

#[tokio::test]
async fn test_download_outlasting_page_timeout_is_saved() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/build-history",
        r#"<a href="/files/slow.pdf">Slow</a>"#,
        1,
    )
    .await;
    mount_download(
        &mock_server,
        "/files/slow.pdf",
        ResponseTemplate::new(200)
            .set_body_bytes(PDF_BODY.to_vec())
            .set_delay(Duration::from_millis(1500)),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = release_config(&mock_server, &dir);
    config.http.timeout_secs = 1;
    config.http.download_timeout_secs = 3;
    let harvester = harvester(&config);

    let report = harvester.harvest(&index_url(&config)).await.unwrap();
    assert_eq!(report.saved, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_stalled_download_times_out() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/build-history",
        r#"<a href="/files/stalled.pdf">Stalled</a>"#,
        1,
    )
    .await;
    mount_download(
        &mock_server,
        "/files/stalled.pdf",
        ResponseTemplate::new(200)
            .set_body_bytes(PDF_BODY.to_vec())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = release_config(&mock_server, &dir);
    config.http.download_timeout_secs = 1;
    let harvester = harvester(&config);

    let report = harvester.harvest(&index_url(&config)).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(file_count(&config.output.releases_dir()), 0);
}
