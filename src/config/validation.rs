use crate::config::types::{
    Config, HttpConfig, OutputConfig, ReleaseConfig, RenderConfig, SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site, config.http.https_only)?;
    validate_output_config(&config.output)?;
    validate_http_config(&config.http)?;
    validate_release_config(&config.releases)?;
    validate_render_config(&config.render)?;
    Ok(())
}

/// Validates the crawl root and the release index
fn validate_site_config(config: &SiteConfig, https_only: bool) -> Result<(), ConfigError> {
    validate_site_url("root-url", &config.root_url, https_only)?;
    validate_site_url("release-index-url", &config.release_index_url, https_only)?;
    Ok(())
}

/// Validates one configured page URL
fn validate_site_url(field: &str, value: &str, https_only: bool) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    match url.scheme() {
        "https" => {}
        "http" if !https_only => {}
        "http" => {
            return Err(ConfigError::Validation(format!(
                "{} '{}' must use HTTPS while https-only is set",
                field, value
            )))
        }
        other => {
            return Err(ConfigError::Validation(format!(
                "{} '{}' has unsupported scheme '{}'",
                field, value, other
            )))
        }
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.knowledge_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "knowledge-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.download_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "download-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates release harvesting configuration
fn validate_release_config(config: &ReleaseConfig) -> Result<(), ConfigError> {
    if config.signature.is_empty() {
        return Err(ConfigError::Validation(
            "release signature cannot be empty".to_string(),
        ));
    }

    if !config.extension.starts_with('.') || config.extension.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "release extension must look like '.pdf', got '{}'",
            config.extension
        )));
    }

    if config.share_host.is_empty() {
        return Err(ConfigError::Validation(
            "share-host cannot be empty".to_string(),
        ));
    }

    match url::Url::parse(&config.share_download_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => {
            return Err(ConfigError::InvalidUrl(format!(
                "share-download-url: {}",
                config.share_download_url
            )))
        }
    }

    Ok(())
}

/// Validates PDF layout settings against the paper size
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    let (width, height) = config.page_size.dimensions();

    if config.margin_pt.saturating_mul(4) >= width.min(height) {
        return Err(ConfigError::Validation(format!(
            "margin-pt {} leaves no room on the page",
            config.margin_pt
        )));
    }

    if !(6..=36).contains(&config.font_size_pt) {
        return Err(ConfigError::Validation(format!(
            "font-size-pt must be between 6 and 36, got {}",
            config.font_size_pt
        )));
    }

    Ok(())
}
