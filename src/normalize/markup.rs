//! HTML to plain text conversion for message bodies
//!
//! Message bodies arrive as HTML and are sometimes entity-escaped a second
//! time (`&lt;p&gt;...`). Conversion rules:
//! - entities are decoded
//! - `<script>` and `<style>` content is dropped
//! - `<br>` and block element boundaries become newlines
//! - runs of spaces and tabs collapse to one space, lines are trimmed and
//!   blank lines removed

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose end starts a new line
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "blockquote", "pre", "section", "article", "header", "footer", "hr",
];

/// Elements followed by a space so adjacent cells do not run together
const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Elements whose content is never text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Converts an HTML fragment to readable plain text
///
/// Escaped markup is unwrapped pass by pass until the text stops changing,
/// which makes the function idempotent: stripping its own output returns
/// that output unchanged.
///
/// # Example
///
/// ```
/// use forum_harvest::normalize::strip_markup;
///
/// let text = strip_markup("<p>Hello&nbsp;<b>world</b></p><p>Second<br>line</p>");
/// assert_eq!(text, "Hello world\nSecond\nline");
/// ```
pub fn strip_markup(html: &str) -> String {
    // A pass that changes the text also shortens it, so this terminates
    let mut current = strip_once(html);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// A single parse-and-flatten pass
fn strip_once(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let mut raw = String::with_capacity(html.len());
    collect_text(fragment.root_element(), &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                } else if CELL_ELEMENTS.contains(&name) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapses horizontal whitespace, trims lines and drops blank ones
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.split(|c: char| c.is_whitespace())
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
