use super::{ArchiveFormat, Renderer};
use crate::RenderError;

/// Stores the cleaned, self-contained HTML as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Html
    }

    fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        Ok(html.as_bytes().to_vec())
    }
}
