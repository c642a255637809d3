//! WARC/1.1 record writing
//!
//! Records are written through a single gzip stream. Offsets and lengths are
//! measured against the uncompressed stream, so `[offset, offset + length)`
//! of the inflated file is exactly one record. Lengths cover the full record
//! including its closing CRLF pair, making consecutive records contiguous.

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Byte position of one record in the uncompressed WARC stream
#[derive(Debug, Clone)]
pub struct WarcRecordPosition {
    pub offset: u64,
    pub length: u64,
    /// `sha256:<hex>` digest of the full record bytes
    pub record_digest: String,
}

/// Streaming writer for `archive/data.warc.gz`
pub struct WarcWriter {
    encoder: GzEncoder<File>,
    offset: u64,
}

impl WarcWriter {
    /// Creates the WARC file and writes the leading warcinfo record
    pub fn create(path: &Path, software: &str, created: DateTime<Utc>) -> crate::Result<Self> {
        let file = File::create(path)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = Self { encoder, offset: 0 };
        writer.write_warcinfo(software, created)?;
        Ok(writer)
    }

    fn write_warcinfo(&mut self, software: &str, created: DateTime<Utc>) -> crate::Result<()> {
        let payload = format!(
            "software: {}\ncreated: {}\noperator: WACZ Generator\nformat: WARC File Format 1.1\n",
            software,
            warc_date(created),
        );

        let mut record = Vec::new();
        record.extend_from_slice(b"WARC/1.1\r\n");
        record.extend_from_slice(b"WARC-Type: warcinfo\r\n");
        record.extend_from_slice(format!("WARC-Date: {}\r\n", warc_date(created)).as_bytes());
        record.extend_from_slice(b"WARC-Filename: data.warc.gz\r\n");
        record.extend_from_slice(format!("WARC-Record-ID: {}\r\n", record_id()).as_bytes());
        record.extend_from_slice(b"Content-Type: application/warc-fields\r\n");
        record.extend_from_slice(format!("Content-Length: {}\r\n", payload.len()).as_bytes());
        record.extend_from_slice(b"\r\n");
        record.extend_from_slice(payload.as_bytes());
        record.extend_from_slice(b"\r\n\r\n");

        self.write_record(&record)?;
        Ok(())
    }

    /// Writes one response record and returns its position
    ///
    /// The payload is a reconstructed HTTP/1.1 response: status line, the
    /// replayed headers, and the body. Encoding and length headers from the
    /// live response are dropped since the stored body is already decoded.
    pub fn write_response(
        &mut self,
        url: &str,
        status_code: u16,
        headers: &[(String, String)],
        body: &[u8],
        date: DateTime<Utc>,
    ) -> crate::Result<WarcRecordPosition> {
        let mut http_block = Vec::new();
        http_block.extend_from_slice(format!("HTTP/1.1 {} OK\r\n", status_code).as_bytes());
        for (name, value) in headers {
            if is_skipped_header(name) {
                continue;
            }
            http_block.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        http_block.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        http_block.extend_from_slice(b"\r\n");
        http_block.extend_from_slice(body);

        let mut record = Vec::new();
        record.extend_from_slice(b"WARC/1.1\r\n");
        record.extend_from_slice(b"WARC-Type: response\r\n");
        record.extend_from_slice(format!("WARC-Target-URI: {}\r\n", url).as_bytes());
        record.extend_from_slice(format!("WARC-Date: {}\r\n", warc_date(date)).as_bytes());
        record.extend_from_slice(format!("WARC-Record-ID: {}\r\n", record_id()).as_bytes());
        record.extend_from_slice(b"Content-Type: application/http; msgtype=response\r\n");
        record.extend_from_slice(format!("Content-Length: {}\r\n", http_block.len()).as_bytes());
        record.extend_from_slice(b"\r\n");
        record.extend_from_slice(&http_block);
        record.extend_from_slice(b"\r\n\r\n");

        let offset = self.offset;
        let digest = format!("sha256:{}", hex::encode(Sha256::digest(&record)));
        self.write_record(&record)?;

        Ok(WarcRecordPosition {
            offset,
            length: record.len() as u64,
            record_digest: digest,
        })
    }

    fn write_record(&mut self, record: &[u8]) -> crate::Result<()> {
        self.encoder.write_all(record)?;
        self.offset += record.len() as u64;
        Ok(())
    }

    /// Flushes the gzip stream and closes the file
    pub fn finish(self) -> crate::Result<()> {
        self.encoder.finish()?;
        Ok(())
    }
}

fn warc_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn record_id() -> String {
    format!("<urn:uuid:{}>", Uuid::new_v4())
}

fn is_skipped_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "content-encoding" | "transfer-encoding" | "content-length"
    )
}
