//! Archive assembly pipeline
//!
//! Stages the package inside a temporary directory and zips it into the
//! output directory. The temp tree is removed when the builder returns,
//! success or not.

use crate::config::Config;
use crate::content::is_text_content;
use crate::crawler::{build_http_client, fetch_url, CapturedContent, FetchResult};
use crate::model::{CrawlRequest, CrawledPage};
use crate::wacz::{
    archive_filename, build_cdx_index, build_datapackage, build_datapackage_digest,
    build_pages_manifest, zip_directory, ArchiveEntry, ResourceFile, WarcWriter,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Builds a `.wacz` file from a finished crawl
pub struct WaczBuilder<'a> {
    config: &'a Config,
}

impl<'a> WaczBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Assembles the archive and returns its path and size
    pub async fn build(
        &self,
        request: &CrawlRequest,
        pages: &[CrawledPage],
        contents: &HashMap<String, CapturedContent>,
    ) -> crate::Result<(PathBuf, u64)> {
        let staging = TempDir::new()?;
        let root = staging.path();

        fs::create_dir_all(root.join("archive"))?;
        fs::create_dir_all(root.join("indexes"))?;
        fs::create_dir_all(root.join("pages"))?;

        let mut entries = self.collect_entries(request, pages, contents).await;

        // WARC records
        let warc_path = root.join("archive/data.warc.gz");
        let mut writer = WarcWriter::create(
            &warc_path,
            &self.config.wacz.software_name,
            request.created_at,
        )?;
        for entry in &mut entries {
            let Some(content) = &entry.content else {
                continue;
            };
            let position = writer.write_response(
                &entry.page.url,
                entry.status_code,
                &entry.headers,
                content.as_bytes(),
                entry.page.crawled_at,
            )?;
            entry.position = Some(position);
        }
        writer.finish()?;

        // Index and manifest
        let cdx = build_cdx_index(&entries);
        fs::write(root.join("indexes/index.cdx"), &cdx)?;

        let manifest = build_pages_manifest(&entries);
        fs::write(root.join("pages/pages.jsonl"), &manifest)?;

        // Descriptor and signed digest
        let warc_bytes = fs::read(&warc_path)?;
        let resources = [
            ResourceFile {
                name: "pages.jsonl",
                path: "pages/pages.jsonl",
                bytes: manifest.as_bytes(),
            },
            ResourceFile {
                name: "data.warc.gz",
                path: "archive/data.warc.gz",
                bytes: &warc_bytes,
            },
            ResourceFile {
                name: "index.cdx",
                path: "indexes/index.cdx",
                bytes: cdx.as_bytes(),
            },
        ];
        let datapackage = build_datapackage(
            &resources,
            &self.config.wacz.version,
            &self.config.wacz.software_name,
            &request.title,
            request.created_at,
        );
        fs::write(root.join("datapackage.json"), &datapackage)?;

        let digest = build_datapackage_digest(&datapackage, &self.config.wacz.software_name)?;
        fs::write(root.join("datapackage-digest.json"), &digest)?;

        // Container: staged under a .part name so a failed build never
        // leaves a partial .wacz behind
        let output_dir = PathBuf::from(&self.config.output.output_dir);
        fs::create_dir_all(&output_dir)?;
        let filename = archive_filename(&request.title, request.created_at, request.id);
        let dest = output_dir.join(&filename);
        let staged = output_dir.join(format!("{}.part", filename));

        let size = match finalize_archive(root, &staged, &dest) {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&staged);
                return Err(e);
            }
        };
        info!(
            request_id = request.id,
            path = %dest.display(),
            size,
            "archive written"
        );

        Ok((dest, size))
    }

    /// Pairs each page with its body, recovering missing bodies where possible
    ///
    /// Bodies come from the crawl's in-memory captures first, then from the
    /// persisted page row, and as a last resort from a fresh fetch.
    /// Successful pages whose body cannot be recovered still get a manifest
    /// entry, just no WARC record.
    async fn collect_entries<'p>(
        &self,
        request: &CrawlRequest,
        pages: &'p [CrawledPage],
        contents: &HashMap<String, CapturedContent>,
    ) -> Vec<ArchiveEntry<'p>> {
        let mut entries = Vec::with_capacity(pages.len());
        let mut refetch_client = None;

        for page in pages {
            let mut entry = ArchiveEntry {
                page,
                content: None,
                headers: page.headers.clone(),
                status_code: page.http_status.unwrap_or(200),
                position: None,
            };

            if !page.is_successful() {
                entries.push(entry);
                continue;
            }

            if let Some(captured) = contents.get(&page.url) {
                entry.content = Some(captured.content.clone());
                entry.headers = captured.headers.clone();
                entry.status_code = captured.status_code;
            } else if let Some(content) = &page.content {
                entry.content = Some(content.clone());
            } else {
                if refetch_client.is_none() {
                    refetch_client = build_http_client(&request.user_agent).ok();
                }
                if let Some(client) = &refetch_client {
                    entry.content = refetch(client, &page.url).await;
                }
            }

            if entry.content.is_none() {
                warn!(url = %page.url, "no body recovered, page gets no archive record");
            }
            entries.push(entry);
        }

        debug!(
            request_id = request.id,
            total = entries.len(),
            with_content = entries.iter().filter(|e| e.content.is_some()).count(),
            "collected archive entries"
        );

        entries
    }
}

fn finalize_archive(root: &Path, staged: &Path, dest: &Path) -> crate::Result<u64> {
    zip_directory(root, staged)?;
    let size = fs::metadata(staged)?.len();
    fs::rename(staged, dest)?;
    Ok(size)
}

/// Last-resort re-fetch of a page body during assembly
async fn refetch(client: &reqwest::Client, url: &str) -> Option<String> {
    match fetch_url(client, url).await {
        FetchResult::Response {
            status_code,
            content_type,
            body,
            ..
        } if (200..300).contains(&status_code) && is_text_content(content_type.as_deref()) => {
            debug!(url = %url, "recovered body by re-fetching");
            Some(String::from_utf8_lossy(&body).into_owned())
        }
        _ => {
            warn!(url = %url, "re-fetch failed");
            None
        }
    }
}
