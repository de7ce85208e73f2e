//! Flattens cleaned HTML into a sequence of printable blocks
//!
//! The layout is deliberately coarse: block-level elements become paragraphs,
//! list items, headings or preformatted text, and every `<img>` becomes its own
//! image block. Inline markup is reduced to its text.

use super::dimension::{style_property, DimensionParser};
use scraper::{ElementRef, Html, Node, Selector};

/// One printable unit of a page
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    ListItem(String),
    Preformatted(String),
    /// Image source plus requested size in points (0 = intrinsic)
    Image { src: String, width: f32, height: f32 },
}

/// A page reduced to blocks
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

/// Elements whose content never reaches the archive
const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "iframe", "svg", "select", "button",
];

/// Elements that start and end a block
const BLOCK_LEVEL: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "nav", "aside", "blockquote",
    "table", "thead", "tbody", "tr", "ul", "ol", "dl", "dt", "dd", "form", "fieldset", "figure",
    "figcaption", "hr", "address", "body", "center",
];

/// Builds the block layout of an HTML document
pub fn layout(html: &str, dimensions: &dyn DimensionParser) -> PageLayout {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    });

    let mut collector = Collector {
        dimensions,
        blocks: Vec::new(),
        buffer: String::new(),
        in_list_item: false,
    };
    collector.walk(document.root_element());
    collector.flush();

    PageLayout {
        title,
        blocks: collector.blocks,
    }
}

struct Collector<'a> {
    dimensions: &'a dyn DimensionParser,
    blocks: Vec<Block>,
    buffer: String,
    in_list_item: bool,
}

impl Collector<'_> {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();

        if SKIPPED.contains(&name) {
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                let level = name[1..].parse().unwrap_or(1);
                let text = collapse_whitespace(&element.text().collect::<String>());
                if !text.is_empty() {
                    self.blocks.push(Block::Heading { level, text });
                }
            }
            "pre" => {
                self.flush();
                let text: String = element.text().collect();
                let text = text.trim_matches('\n').trim_end();
                if !text.is_empty() {
                    self.blocks.push(Block::Preformatted(text.to_string()));
                }
            }
            "li" => {
                self.flush();
                let outer = std::mem::replace(&mut self.in_list_item, true);
                self.walk(element);
                self.flush();
                self.in_list_item = outer;
            }
            "img" => {
                self.flush();
                self.push_image(element);
            }
            "br" => self.flush(),
            "td" | "th" => {
                self.push_text(" ");
                self.walk(element);
                self.push_text(" ");
            }
            _ if BLOCK_LEVEL.contains(&name) => {
                self.flush();
                self.walk(element);
                self.flush();
            }
            _ => self.walk(element),
        }
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.buffer.is_empty() && !self.buffer.ends_with(' ') {
                    self.buffer.push(' ');
                }
            } else {
                self.buffer.push(ch);
            }
        }
    }

    fn push_image(&mut self, element: ElementRef<'_>) {
        let attrs = element.value();
        let Some(src) = attrs.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
            return;
        };

        let style = attrs.attr("style").unwrap_or_default();
        let size = |name: &str| {
            attrs
                .attr(name)
                .or_else(|| style_property(style, name))
                .map(|v| self.dimensions.to_points(v))
                .unwrap_or(0.0)
        };

        let width = size("width");
        let height = size("height");
        self.blocks.push(Block::Image {
            src: src.to_string(),
            width,
            height,
        });
    }

    fn flush(&mut self) {
        let text = self.buffer.trim();
        if !text.is_empty() {
            let block = if self.in_list_item {
                Block::ListItem(text.to_string())
            } else {
                Block::Paragraph(text.to_string())
            };
            self.blocks.push(block);
        }
        self.buffer.clear();
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
