use std::path::Path;
use wiki_archiver::archive::ArchiveFormat;
use wiki_archiver::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration pointing at the mock server
pub fn test_config(server: &MockServer, knowledge_dir: &Path, format: ArchiveFormat) -> Config {
    let mut config = Config::default();
    config.site.root_url = format!("{}/", server.uri());
    config.site.release_index_url = format!("{}/build-history", server.uri());
    config.output.knowledge_dir = knowledge_dir.to_path_buf();
    config.output.format = format;
    config.http.https_only = false;
    config.http.timeout_secs = 5;
    config.http.download_timeout_secs = 5;
    config
}

/// Serves `body` as HTML at `route`, expecting exactly `times` requests
pub async fn mount_page(server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Number of regular files in a directory
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().is_file())
                .count()
        })
        .unwrap_or(0)
}
