//! CDXJ index generation
//!
//! One line per archived page: SURT key, a 17-digit timestamp, and a JSON
//! blob locating the record inside the uncompressed WARC stream. Lines are
//! sorted by key so the index is binary-searchable.

use crate::url::surt;
use crate::wacz::ArchiveEntry;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Builds the `indexes/index.cdx` contents
///
/// Pages without a WARC record (no recoverable content) are left out.
pub fn build_cdx_index(entries: &[ArchiveEntry<'_>]) -> String {
    let mut lines = Vec::new();

    for entry in entries {
        let (Some(position), Some(content)) = (&entry.position, &entry.content) else {
            continue;
        };

        let mime = entry
            .page
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_string())
            .unwrap_or_else(|| "text/html".to_string());

        let record = json!({
            "url": entry.page.url,
            "digest": format!("sha-256:{}", hex::encode(Sha256::digest(content.as_bytes()))),
            "mime": mime,
            "offset": position.offset,
            "length": position.length,
            "recordDigest": position.record_digest,
            "status": entry.status_code,
            "filename": "data.warc.gz",
        });

        lines.push(format!(
            "{} {}000 {}",
            surt(&entry.page.url),
            entry.page.crawled_at.format("%Y%m%d%H%M%S"),
            record
        ));
    }

    lines.sort();

    let mut index = lines.join("\n");
    if !index.is_empty() {
        index.push('\n');
    }
    index
}
