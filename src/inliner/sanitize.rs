use super::images::{is_data_uri, ImageFetch, ImageTable};
use super::{CleanWarning, CleanedPage};
use crate::config::SanitizeConfig;
use crate::RenderError;
use html_escape::decode_html_entities;
use lol_html::{doc_comments, element, HtmlRewriter, Settings};
use std::cell::RefCell;

/// Rewrites page HTML into its archival form without touching the network
///
/// `images` must hold an entry for every non-data `img[src]` in `html`;
/// sources missing from it are treated as failed fetches.
///
/// Only a failure of the HTML tokenizer itself is returned as an error.
pub fn sanitize(
    html: &str,
    images: &ImageTable,
    options: &SanitizeConfig,
) -> Result<CleanedPage, RenderError> {
    let warnings = RefCell::new(Vec::new());
    let mut output = Vec::with_capacity(html.len());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("script, noscript", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("img[src]", |el| {
                    // The table is keyed by the parsed value, lol_html hands back the raw one
                    let raw = el.get_attribute("src").unwrap_or_default();
                    let src = decode_html_entities(&raw).into_owned();
                    if is_data_uri(&src) {
                        return Ok(());
                    }

                    match images.get(&src) {
                        Some(ImageFetch::Inlined(data_uri)) => {
                            el.set_attribute("src", data_uri)?;
                        }
                        Some(ImageFetch::Failed(reason)) => {
                            el.remove();
                            warnings.borrow_mut().push(CleanWarning::ImageDropped {
                                src,
                                reason: reason.clone(),
                            });
                        }
                        None => {
                            el.remove();
                            warnings.borrow_mut().push(CleanWarning::ImageDropped {
                                src,
                                reason: "image was not fetched".to_string(),
                            });
                        }
                    }
                    Ok(())
                }),
                element!("link[rel]", |el| {
                    let rel = el.get_attribute("rel").unwrap_or_default();
                    let is_stylesheet = rel
                        .split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("stylesheet"));
                    if !is_stylesheet {
                        return Ok(());
                    }

                    let href = el.get_attribute("href").unwrap_or_default();
                    if is_blocked_stylesheet(&href, &options.blocked_stylesheet_hosts) {
                        el.remove();
                        warnings
                            .borrow_mut()
                            .push(CleanWarning::StylesheetRemoved { href });
                    }
                    Ok(())
                }),
                element!("input", |el| {
                    let input_type = el
                        .get_attribute("type")
                        .unwrap_or_else(|| "text".to_string());
                    let allowed = options
                        .allowed_input_types
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(input_type.trim()));

                    if !allowed {
                        el.set_attribute("type", "text")?;
                        warnings
                            .borrow_mut()
                            .push(CleanWarning::InputCoerced { from: input_type });
                    }
                    Ok(())
                }),
            ],
            document_content_handlers: vec![doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| RenderError::Sanitize(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| RenderError::Sanitize(e.to_string()))?;

    Ok(CleanedPage {
        html: String::from_utf8_lossy(&output).into_owned(),
        warnings: warnings.into_inner(),
    })
}

/// Returns true if a stylesheet href points at a blocked host
fn is_blocked_stylesheet(href: &str, blocked_hosts: &[String]) -> bool {
    blocked_hosts
        .iter()
        .any(|host| !host.is_empty() && href.contains(host.as_str()))
}
