//! Content classification and text extraction
//!
//! Classifies MIME types (text vs. binary, HTML vs. not) and extracts plain
//! text from HTML for the page manifest. The extracted text is a best-effort
//! free-text field, never used for archival fidelity.

use scraper::Html;

/// Maximum length of text extracted from a page for the manifest
const MAX_TEXT_LENGTH: usize = 10_000;

/// Content types treated as text and eligible for content storage
const TEXT_TYPES: &[&str] = &[
    "text/html",
    "text/plain",
    "text/xml",
    "text/css",
    "application/xml",
    "application/xhtml+xml",
    "application/json",
    "application/ld+json",
    "application/javascript",
    "text/javascript",
];

/// Checks if a content type represents text content
pub fn is_text_content(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let lower = content_type.to_lowercase();
    TEXT_TYPES.iter().any(|t| lower.contains(t))
}

/// Checks if a content type represents HTML content
pub fn is_html_content(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let lower = content_type.to_lowercase();
    lower.contains("text/html") || lower.contains("application/xhtml")
}

/// Checks if a payload starts with the gzip magic bytes
pub fn is_gzip(content: &[u8]) -> bool {
    content.len() >= 2 && content[0] == 0x1f && content[1] == 0x8b
}

/// Extracts plain text from HTML for the page manifest
///
/// Drops `<script>`/`<style>` contents, strips the remaining tags (entities
/// are decoded by the HTML parser), collapses whitespace, removes control
/// characters, and truncates to a bounded length.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    collect_text(document.root_element(), &mut text);

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    sanitize_for_json(&collapsed, MAX_TEXT_LENGTH)
}

fn collect_text(element: scraper::ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = scraper::ElementRef::wrap(child) {
            let name = child_element.value().name();
            if name == "script" || name == "style" {
                continue;
            }
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Sanitizes text for safe JSON encoding: removes control characters and
/// truncates to `max_length` characters (appending `...` when cut).
pub fn sanitize_for_json(text: &str, max_length: usize) -> String {
    let mut cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect();

    if max_length > 0 && cleaned.chars().count() > max_length {
        cleaned = cleaned.chars().take(max_length).collect::<String>() + "...";
    }

    cleaned.trim().to_string()
}
