//! Page archiving
//!
//! A [`PageArchiver`] maps a page URL to its deterministic destination under
//! the pages directory, skips pages whose archive already exists, and writes
//! new archives atomically: the rendered bytes go to a temporary file in the
//! same directory which is then renamed into place. A render error therefore
//! never leaves a partial file behind.

mod dimension;
mod html;
mod layout;
mod pdf;
mod text;

pub use dimension::{style_property, CssDimensionParser, DimensionParser};
pub use html::HtmlRenderer;
pub use layout::{layout, Block, PageLayout};
pub use pdf::PdfRenderer;
pub use text::TextRenderer;

use crate::config::{OutputConfig, RenderConfig};
use crate::url::archive_file_name;
use crate::RenderError;
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

/// Archival output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Paginated PDF with embedded images
    #[default]
    Pdf,
    /// Self-contained HTML with data-URI images
    Html,
    /// Plain text
    Text,
}

impl ArchiveFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// Turns cleaned HTML into archive bytes
pub trait Renderer: Send + Sync {
    fn format(&self) -> ArchiveFormat;

    fn render(&self, html: &str) -> Result<Vec<u8>, RenderError>;

    /// Whether the input must have its images inlined first
    fn needs_inlined_assets(&self) -> bool {
        true
    }
}

/// Builds the renderer for a format
pub fn renderer_for(format: ArchiveFormat, render: &RenderConfig) -> Box<dyn Renderer> {
    match format {
        ArchiveFormat::Pdf => Box::new(PdfRenderer::new(render)),
        ArchiveFormat::Html => Box::new(HtmlRenderer),
        ArchiveFormat::Text => Box::new(TextRenderer),
    }
}

/// A file written by the archiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub url: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Result of archiving one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Written(ArchiveEntry),
    AlreadyArchived,
}

/// Writes archival documents into the pages directory
pub struct PageArchiver {
    pages_dir: PathBuf,
    renderer: Box<dyn Renderer>,
}

impl PageArchiver {
    pub fn new(pages_dir: impl Into<PathBuf>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            pages_dir: pages_dir.into(),
            renderer,
        }
    }

    /// Creates an archiver for the configured format and directory
    pub fn from_config(output: &OutputConfig, render: &RenderConfig) -> Self {
        Self::new(output.pages_dir(), renderer_for(output.format, render))
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    pub fn format(&self) -> ArchiveFormat {
        self.renderer.format()
    }

    pub fn needs_inlined_assets(&self) -> bool {
        self.renderer.needs_inlined_assets()
    }

    /// Destination path for a page; depends only on the URL and format
    pub fn destination(&self, url: &Url) -> PathBuf {
        self.pages_dir
            .join(archive_file_name(url.as_str(), self.format().extension()))
    }

    /// Returns true if the page's archive exists on disk
    pub fn is_archived(&self, url: &Url) -> bool {
        self.destination(url).exists()
    }

    /// Renders `html` and writes it to the page's destination
    ///
    /// Does nothing if the destination already exists.
    pub fn archive(&self, url: &Url, html: &str) -> Result<ArchiveOutcome, RenderError> {
        let path = self.destination(url);
        if path.exists() {
            return Ok(ArchiveOutcome::AlreadyArchived);
        }

        let bytes = self.renderer.render(html)?;
        write_atomically(&self.pages_dir, &path, &bytes)?;

        tracing::info!("Archived {} -> {}", url, path.display());
        Ok(ArchiveOutcome::Written(ArchiveEntry {
            url: url.to_string(),
            path,
            bytes: bytes.len(),
        }))
    }
}

impl fmt::Debug for PageArchiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageArchiver")
            .field("pages_dir", &self.pages_dir)
            .field("format", &self.format())
            .finish()
    }
}

/// Writes `bytes` to `dest` through a temporary file in `dir`
pub(crate) fn write_atomically(dir: &Path, dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
