//! WACZ archive assembly
//!
//! Builds the package from a finished crawl: gzip WARC records with byte
//! positions tracked against the uncompressed stream, a CDXJ index, the page
//! manifest, the signed descriptor pair, and finally the ZIP container.

mod builder;
mod cdx;
mod datapackage;
mod pages;
mod warc;
mod zip_util;

pub use builder::WaczBuilder;
pub use cdx::build_cdx_index;
pub use datapackage::{build_datapackage, build_datapackage_digest, ResourceFile};
pub use pages::build_pages_manifest;
pub use warc::{WarcRecordPosition, WarcWriter};
pub use zip_util::{archive_filename, zip_directory};

use crate::model::CrawledPage;

/// A page together with the body bytes going into its WARC record
#[derive(Debug)]
pub struct ArchiveEntry<'a> {
    pub page: &'a CrawledPage,
    /// Response body, `None` when no content could be recovered
    pub content: Option<String>,
    /// Headers to replay, falling back to the page's stored headers
    pub headers: Vec<(String, String)>,
    pub status_code: u16,
    /// Filled in once the WARC record is written
    pub position: Option<WarcRecordPosition>,
}
