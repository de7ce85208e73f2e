//! Release-note harvesting
//!
//! One pass over the release index page: every anchor that points at a
//! release file (directly, or through a cloud-drive share link) is downloaded
//! into the releases directory, unless a file for it already exists.
//!
//! Downloads are streamed. The first bytes are checked against the expected
//! file signature before anything touches the disk, so login pages and other
//! HTML served in place of the file are rejected without leaving a trace.

mod links;

pub use links::{resolve_release_link, share_file_id};

use crate::config::ReleaseConfig;
use crate::crawler::{extract_hrefs, Fetcher};
use crate::url::archive_file_name;
use crate::ArchiverError;
use reqwest::Response;
use scraper::Html;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

/// Counts of what happened to each anchor on the index page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Files downloaded and verified in this pass
    pub saved: u64,
    /// Release links whose file was already on disk
    pub already_present: u64,
    /// Downloads refused with HTTP 403
    pub forbidden: u64,
    /// Downloads whose content did not start with the signature
    pub rejected: u64,
    /// Downloads that failed for any other reason
    pub failed: u64,
    /// Anchors that are not release links
    pub skipped: u64,
    /// Paths written in this pass
    pub files: Vec<PathBuf>,
}

impl HarvestReport {
    /// Number of release links seen on the index page
    pub fn release_links(&self) -> u64 {
        self.saved + self.already_present + self.forbidden + self.rejected + self.failed
    }
}

/// What happened to one release link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Saved { path: PathBuf, bytes: u64 },
    AlreadyPresent,
    Forbidden,
    Rejected,
    Failed(String),
}

/// Returns true if `prefix` starts with the expected file signature
pub fn looks_like(prefix: &[u8], signature: &[u8]) -> bool {
    prefix.starts_with(signature)
}

/// Downloads verified release files linked from an index page
#[derive(Debug, Clone)]
pub struct ReleaseHarvester {
    fetcher: Fetcher,
    releases_dir: PathBuf,
    config: ReleaseConfig,
}

impl ReleaseHarvester {
    pub fn new(fetcher: Fetcher, releases_dir: impl Into<PathBuf>, config: ReleaseConfig) -> Self {
        Self {
            fetcher,
            releases_dir: releases_dir.into(),
            config,
        }
    }

    pub fn releases_dir(&self) -> &Path {
        &self.releases_dir
    }

    /// Destination path for a download URL
    pub fn destination(&self, download_url: &Url) -> PathBuf {
        let ext = self.config.extension.trim_start_matches('.').to_ascii_lowercase();
        self.releases_dir
            .join(archive_file_name(download_url.as_str(), &ext))
    }

    /// Harvests every release linked from `index_url`
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - The index was read; per-link failures are counted
    /// * `Err(ArchiverError)` - The index page could not be fetched or the
    ///   releases directory could not be created
    pub async fn harvest(&self, index_url: &Url) -> Result<HarvestReport, ArchiverError> {
        tracing::info!("Harvesting releases from {}", index_url);
        let index = self.fetcher.get_page(index_url.as_str()).await?;
        std::fs::create_dir_all(&self.releases_dir)?;

        let hrefs = extract_hrefs(&Html::parse_document(&index.html));
        let mut report = HarvestReport::default();

        for href in hrefs {
            let Some(download_url) = resolve_release_link(index_url, &href, &self.config) else {
                report.skipped += 1;
                continue;
            };

            match self.download(&download_url).await {
                ReleaseOutcome::Saved { path, bytes } => {
                    tracing::info!(
                        "Downloaded {} ({} bytes) from {}",
                        path.display(),
                        bytes,
                        download_url
                    );
                    report.saved += 1;
                    report.files.push(path);
                }
                ReleaseOutcome::AlreadyPresent => {
                    tracing::debug!("Release already present: {}", download_url);
                    report.already_present += 1;
                }
                ReleaseOutcome::Forbidden => {
                    tracing::warn!("Skipping forbidden release: {}", download_url);
                    report.forbidden += 1;
                }
                ReleaseOutcome::Rejected => {
                    tracing::warn!(
                        "Skipping content without the {} signature at {}",
                        self.config.signature,
                        download_url
                    );
                    report.rejected += 1;
                }
                ReleaseOutcome::Failed(reason) => {
                    tracing::error!("Error downloading {}: {}", download_url, reason);
                    report.failed += 1;
                }
            }
        }

        tracing::info!("Release files downloaded: {}", report.saved);
        Ok(report)
    }

    /// Downloads one release file
    pub async fn download(&self, download_url: &Url) -> ReleaseOutcome {
        let dest = self.destination(download_url);
        if dest.exists() {
            return ReleaseOutcome::AlreadyPresent;
        }

        let mut response = match self.fetcher.open_download(download_url.as_str()).await {
            Ok(response) => response,
            Err(e) if e.is_forbidden() => return ReleaseOutcome::Forbidden,
            Err(e) => return ReleaseOutcome::Failed(e.to_string()),
        };

        match self.write_verified(download_url, &mut response, &dest).await {
            Ok(bytes) => ReleaseOutcome::Saved { path: dest, bytes },
            Err(ArchiverError::ContentMismatch { .. }) => ReleaseOutcome::Rejected,
            Err(e) => ReleaseOutcome::Failed(e.to_string()),
        }
    }

    /// Streams the body to `dest` once its leading bytes match the signature
    async fn write_verified(
        &self,
        url: &Url,
        response: &mut Response,
        dest: &Path,
    ) -> Result<u64, ArchiverError> {
        let signature = self.config.signature.as_bytes();

        // Chunks can be arbitrarily small; buffer until the signature fits
        let mut prefix = Vec::new();
        while prefix.len() < signature.len() {
            match self.fetcher.next_chunk(url.as_str(), response).await? {
                Some(chunk) => prefix.extend_from_slice(&chunk),
                None => break,
            }
        }

        if !looks_like(&prefix, signature) {
            return Err(ArchiverError::ContentMismatch {
                url: url.to_string(),
                expected: self.config.signature.clone(),
            });
        }

        let mut tmp = NamedTempFile::new_in(&self.releases_dir)?;
        tmp.write_all(&prefix)?;
        let mut written = prefix.len() as u64;

        while let Some(chunk) = self.fetcher.next_chunk(url.as_str(), response).await? {
            tmp.write_all(&chunk)?;
            written += chunk.len() as u64;
        }

        tmp.as_file().sync_all()?;
        tmp.persist(dest).map_err(|e| e.error)?;
        Ok(written)
    }
}
