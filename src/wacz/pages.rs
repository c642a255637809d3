//! Page manifest (`pages/pages.jsonl`)
//!
//! A header line describing the list, then one JSON record per successful
//! page. Pages whose body survived get extracted text; successful pages
//! without a recovered body get a reduced record. Error pages are left out
//! entirely.

use crate::content::{extract_text, is_html_content};
use crate::wacz::ArchiveEntry;
use rand::Rng;
use serde_json::json;

const ID_LENGTH: usize = 22;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Builds the `pages/pages.jsonl` contents
pub fn build_pages_manifest(entries: &[ArchiveEntry<'_>]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);

    lines.push(
        json!({
            "format": "json-pages-1.0",
            "id": "pages",
            "title": "All Pages",
            "hasText": true,
        })
        .to_string(),
    );

    for entry in entries {
        if !entry.page.is_successful() {
            continue;
        }

        let ts = entry.page.crawled_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

        let record = match &entry.content {
            Some(content) => {
                let text = if is_html_content(entry.page.content_type.as_deref()) {
                    extract_text(content)
                } else {
                    String::new()
                };
                json!({
                    "id": page_id(),
                    "url": entry.page.url,
                    "title": entry.page.title,
                    "ts": ts,
                    "load_state": 1,
                    "size": entry.page.content_length.unwrap_or(content.len() as u64),
                    "seed_id": 0,
                    "text": text,
                })
            }
            None => json!({
                "id": page_id(),
                "url": entry.page.url,
                "title": entry.page.title,
                "ts": ts,
                "load_state": 1,
                "size": entry.page.content_length.unwrap_or(0),
                "seed_id": 0,
                "text": "",
            }),
        };

        lines.push(record.to_string());
    }

    let mut manifest = lines.join("\n");
    manifest.push('\n');
    manifest
}

/// Random 22-character base36 page identifier
fn page_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CrawledPage, PageStatus};

    fn page(url: &str, title: &str) -> CrawledPage {
        let mut p = CrawledPage::new(url.to_string(), 0, title.to_string());
        p.status = PageStatus::Success;
        p.content_type = Some("text/html".to_string());
        p
    }

    fn entry<'a>(page: &'a CrawledPage, content: Option<&str>) -> ArchiveEntry<'a> {
        ArchiveEntry {
            page,
            content: content.map(|c| c.to_string()),
            headers: Vec::new(),
            status_code: 200,
            position: None,
        }
    }

    #[test]
    fn test_header_line() {
        let manifest = build_pages_manifest(&[]);
        let header: serde_json::Value =
            serde_json::from_str(manifest.lines().next().unwrap()).unwrap();
        assert_eq!(header["format"], "json-pages-1.0");
        assert_eq!(header["id"], "pages");
        assert_eq!(header["title"], "All Pages");
        assert_eq!(header["hasText"], true);
    }

    #[test]
    fn test_page_record_includes_extracted_text() {
        let p = page("https://example.com/", "Home");
        let entries = vec![entry(&p, Some("<html><body>Hello world</body></html>"))];
        let manifest = build_pages_manifest(&entries);

        let record: serde_json::Value =
            serde_json::from_str(manifest.lines().nth(1).unwrap()).unwrap();
        assert_eq!(record["url"], "https://example.com/");
        assert_eq!(record["title"], "Home");
        assert_eq!(record["text"], "Hello world");
        assert_eq!(record["load_state"], 1);
        assert_eq!(record["seed_id"], 0);
        assert_eq!(record["size"], 37);
        assert_eq!(record["id"].as_str().unwrap().len(), 22);
    }

    #[test]
    fn test_missing_content_gets_reduced_record() {
        let mut p = page("https://example.com/big.css", "big.css");
        p.content_length = Some(2048);
        let entries = vec![entry(&p, None)];
        let manifest = build_pages_manifest(&entries);

        let record: serde_json::Value =
            serde_json::from_str(manifest.lines().nth(1).unwrap()).unwrap();
        assert_eq!(record["size"], 2048);
        assert_eq!(record["text"], "");
    }

    #[test]
    fn test_error_pages_are_left_out() {
        let mut p = page("https://example.com/gone", "Gone");
        p.status = PageStatus::Error;
        p.error_message = Some("HTTP 404".to_string());
        let entries = vec![entry(&p, None)];
        let manifest = build_pages_manifest(&entries);

        assert_eq!(manifest.lines().count(), 1);
        assert!(!manifest.contains("/gone"));
    }

    #[test]
    fn test_size_prefers_recorded_content_length() {
        let mut p = page("https://example.com/", "Home");
        p.content_length = Some(512);
        let entries = vec![entry(&p, Some("<html>short</html>"))];
        let manifest = build_pages_manifest(&entries);

        let record: serde_json::Value =
            serde_json::from_str(manifest.lines().nth(1).unwrap()).unwrap();
        assert_eq!(record["size"], 512);
    }

    #[test]
    fn test_ids_are_unique() {
        let p1 = page("https://example.com/1", "a");
        let p2 = page("https://example.com/2", "b");
        let entries = vec![entry(&p1, Some("x")), entry(&p2, Some("y"))];
        let manifest = build_pages_manifest(&entries);

        let ids: Vec<String> = manifest
            .lines()
            .skip(1)
            .map(|l| {
                serde_json::from_str::<serde_json::Value>(l).unwrap()["id"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_ne!(ids[0], ids[1]);
    }
}
