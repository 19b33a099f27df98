//! Heuristic extraction of a job's description and status from a posting page.
//!
//! Two independent passes run over the same parsed document:
//!
//! - **Description**: the first `<div>` whose class contains
//!   [`DESCRIPTION_MARKER`] is flattened into text. Paragraphs, list items
//!   and line breaks start a new line; `script`, `style` and `svg` subtrees
//!   are dropped. Pages without the marker yield an empty description.
//! - **Status**: the first element carrying "status" in an attribute name or
//!   value and starting with a text child wins. Failing that, the first text
//!   node mentioning one of [`STATUS_KEYWORDS`] is used.
//!
//! All walks are iterative pre-order traversals so deeply nested or
//! malformed markup cannot exhaust the stack.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Result, ScrapeError};

/// Class fragment identifying the rich-text description container.
pub const DESCRIPTION_MARKER: &str = "description__text--rich";

/// Words that mark a text node as a status line when no element is tagged.
pub const STATUS_KEYWORDS: [&str; 5] = ["open", "closed", "applied", "pending", "rejected"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub description: String,
    /// Upper-cased raw label, not yet mapped onto the status vocabulary.
    pub status: String,
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.status.is_empty()
    }
}

/// Parse a response body. The HTML parser itself never rejects markup, so the
/// only failure is a body that is not UTF-8 text.
pub fn parse_document(body: &[u8]) -> Result<Html> {
    let text = std::str::from_utf8(body).map_err(|e| ScrapeError::Parse(e.to_string()))?;
    Ok(Html::parse_document(text))
}

pub fn extract(document: &Html) -> Extracted {
    Extracted {
        description: extract_description(document),
        status: extract_status(document),
    }
}

pub fn extract_description(document: &Html) -> String {
    let Some(container) = find_description_node(document) else {
        return String::new();
    };

    let mut raw = String::new();
    collect_text(container, &mut raw);
    normalize_whitespace(&raw)
}

pub fn extract_status(document: &Html) -> String {
    find_attribute_status(document)
        .or_else(|| find_keyword_status(document))
        .map(|status| status.trim().to_uppercase())
        .unwrap_or_default()
}

/// First marker `div` in document order.
fn find_description_node(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(&format!(r#"div[class*="{DESCRIPTION_MARKER}"]"#)).ok()?;
    // Selecting from the root element walks the tree in pre-order.
    document.root_element().select(&selector).next()
}

fn collect_text(container: ElementRef<'_>, out: &mut String) {
    let mut stack = vec![*container];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Element(el) => match el.name() {
                "script" | "style" | "svg" => continue,
                "br" | "p" | "li" => out.push('\n'),
                _ => {}
            },
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    out.push_str(text);
                    out.push(' ');
                }
            }
            _ => {}
        }
        // Reversed so the first child is popped next.
        stack.extend(node.children().rev());
    }
}

/// Drop spaces that follow a newline or another space, then trim.
fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev = None;
    for ch in raw.chars() {
        if ch == ' ' && matches!(prev, Some(' ') | Some('\n')) {
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }
    out.trim().to_string()
}

fn find_attribute_status(document: &Html) -> Option<String> {
    document.tree.root().descendants().find_map(|node| {
        let Node::Element(el) = node.value() else {
            return None;
        };
        let tagged = el.attrs().any(|(key, value)| {
            key.to_lowercase().contains("status") || value.to_lowercase().contains("status")
        });
        if !tagged {
            return None;
        }

        let Node::Text(text) = node.first_child()?.value() else {
            return None;
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

fn find_keyword_status(document: &Html) -> Option<String> {
    document.tree.root().descendants().find_map(|node| {
        let Node::Text(text) = node.value() else {
            return None;
        };
        let text = text.trim();
        let lower = text.to_lowercase();
        STATUS_KEYWORDS
            .iter()
            .any(|keyword| lower.contains(keyword))
            .then(|| text.to_string())
    })
}
