use super::dimension::CssDimensionParser;
use super::layout::{layout, Block};
use super::{ArchiveFormat, Renderer};
use crate::RenderError;

/// Extracts the readable text of a page
///
/// Blocks are separated by blank lines. Images are left out, so the page is
/// archived from the raw HTML without fetching any assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Text
    }

    fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let page = layout(html, &CssDimensionParser);

        let sections: Vec<String> = page
            .blocks
            .into_iter()
            .filter_map(|block| match block {
                Block::Heading { text, .. } | Block::Paragraph(text) | Block::Preformatted(text) => {
                    Some(text)
                }
                Block::ListItem(text) => Some(format!("- {}", text)),
                Block::Image { .. } => None,
            })
            .collect();

        let mut text = sections.join("\n\n");
        if !text.is_empty() {
            text.push('\n');
        }
        Ok(text.into_bytes())
    }

    fn needs_inlined_assets(&self) -> bool {
        false
    }
}
