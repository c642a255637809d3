//! End-to-end archive generation tests
//!
//! These tests use wiremock to serve a small site and verify the produced
//! .wacz package member by member.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::GzDecoder;
use p384::ecdsa::signature::hazmat::PrehashVerifier;
use p384::ecdsa::{Signature, VerifyingKey};
use p384::pkcs8::DecodePublicKey;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::sync::{Arc, Mutex};
use waczgen::generator::Submission;
use waczgen::model::CrawlOptions;
use waczgen::storage::SqliteStore;
use waczgen::{Config, RequestStatus, WaczGenerator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_generator(output_dir: &str) -> WaczGenerator {
    let mut config = Config::default();
    config.output.output_dir = output_dir.to_string();
    let storage = Arc::new(Mutex::new(SqliteStore::new_in_memory().unwrap()));
    WaczGenerator::with_storage(config, storage)
}

fn submission(url: &str) -> Submission {
    Submission {
        url: url.to_string(),
        title: "Test Site".to_string(),
        description: Some("integration".to_string()),
        max_depth: 2,
        max_pages: 50,
        crawl_delay_ms: 500,
        options: CrawlOptions::default(),
    }
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html><head><title>Home</title>
                    <link rel="stylesheet" href="/style.css">
                    <script src="/app.js"></script></head>
                    <body><h1>Welcome</h1>
                    <a href="/page2">Second page</a>
                    <img src="/logo.png">
                    </body></html>"#,
                "text/html; charset=utf-8",
            ),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "<html><head><title>Second</title></head><body>More</body></html>",
                "text/html",
            ),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("body { background-image: url(/bg.png); }", "text/css"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("console.log('hi');", "application/javascript"),
        )
        .mount(server)
        .await;

    for image in ["/logo.png", "/bg.png"] {
        Mock::given(method("GET"))
            .and(path(image))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![0x89u8, 0x50, 0x4e, 0x47], "image/png"),
            )
            .mount(server)
            .await;
    }
}

fn read_member(archive: &mut zip::ZipArchive<File>, name: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    archive.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
    bytes
}

#[tokio::test]
async fn test_full_generation_produces_valid_package() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let out = tempfile::tempdir().unwrap();
    let generator = test_generator(out.path().to_str().unwrap());

    let id = generator.submit(submission(&format!("{}/", server.uri()))).unwrap();
    let request = generator.process_request(id).await.unwrap();

    assert_eq!(request.status, RequestStatus::Completed);
    let archive_path = request.file_path.clone().unwrap();
    assert!(archive_path.ends_with(".wacz"));
    assert!(std::path::Path::new(&archive_path).exists());
    assert_eq!(
        request.file_size.unwrap(),
        std::fs::metadata(&archive_path).unwrap().len()
    );

    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    for name in [
        "datapackage.json",
        "datapackage-digest.json",
        "archive/data.warc.gz",
        "indexes/index.cdx",
        "pages/pages.jsonl",
    ] {
        assert!(archive.by_name(name).is_ok(), "{} missing from package", name);
    }

    // Page manifest: header plus one record per crawled page
    let manifest = String::from_utf8(read_member(&mut archive, "pages/pages.jsonl")).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 7, "6 pages expected: {}", manifest);

    let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(header["format"], "json-pages-1.0");
    assert_eq!(header["hasText"], true);

    let seed_record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(seed_record["title"], "Home");
    assert_eq!(seed_record["id"].as_str().unwrap().len(), 22);
    assert!(seed_record["text"].as_str().unwrap().contains("Welcome"));
    let ts = seed_record["ts"].as_str().unwrap();
    assert!(ts.ends_with('Z') && ts.contains('.'), "bad ts: {}", ts);

    // CDX: only text pages get records; the two PNGs are manifest-only
    let cdx = String::from_utf8(read_member(&mut archive, "indexes/index.cdx")).unwrap();
    let cdx_lines: Vec<&str> = cdx.lines().collect();
    assert_eq!(cdx_lines.len(), 4, "cdx was: {}", cdx);
    let mut sorted = cdx_lines.clone();
    sorted.sort();
    assert_eq!(cdx_lines, sorted);

    let mut positions = HashMap::new();
    for line in &cdx_lines {
        let mut parts = line.splitn(3, ' ');
        let surt = parts.next().unwrap();
        assert!(surt.contains(")/"), "bad surt key: {}", surt);
        let ts = parts.next().unwrap();
        assert_eq!(ts.len(), 17);
        assert!(ts.ends_with("000"));

        let record: serde_json::Value = serde_json::from_str(parts.next().unwrap()).unwrap();
        assert!(record["digest"].as_str().unwrap().starts_with("sha-256:"));
        assert!(record["recordDigest"].as_str().unwrap().starts_with("sha256:"));
        assert_eq!(record["filename"], "data.warc.gz");
        assert_eq!(record["status"], 200);
        positions.insert(
            record["url"].as_str().unwrap().to_string(),
            (
                record["offset"].as_u64().unwrap(),
                record["length"].as_u64().unwrap(),
            ),
        );
    }

    // WARC: the byte range from the index re-extracts a parseable record
    let warc_gz = read_member(&mut archive, "archive/data.warc.gz");
    let mut warc = Vec::new();
    GzDecoder::new(&warc_gz[..]).read_to_end(&mut warc).unwrap();
    assert!(String::from_utf8_lossy(&warc).starts_with("WARC/1.1\r\nWARC-Type: warcinfo\r\n"));

    let seed_url = format!("{}/", server.uri());
    let (offset, length) = positions[&seed_url];
    let record =
        String::from_utf8_lossy(&warc[offset as usize..(offset + length) as usize]).into_owned();
    assert!(record.starts_with("WARC/1.1\r\nWARC-Type: response\r\n"));
    assert!(record.contains(&format!("WARC-Target-URI: {}", seed_url)));
    assert!(record.contains("HTTP/1.1 200 OK\r\n"));
    assert!(record.contains("<h1>Welcome</h1>"));

    // Descriptor: resource hashes and sizes match the actual members
    let datapackage_bytes = read_member(&mut archive, "datapackage.json");
    let descriptor: serde_json::Value = serde_json::from_slice(&datapackage_bytes).unwrap();
    assert_eq!(descriptor["profile"], "data-package");
    assert_eq!(descriptor["wacz_version"], "1.1.1");
    assert_eq!(descriptor["title"], "Test Site");

    for resource in descriptor["resources"].as_array().unwrap() {
        let member = read_member(&mut archive, resource["path"].as_str().unwrap());
        assert_eq!(resource["bytes"].as_u64().unwrap() as usize, member.len());
        assert_eq!(
            resource["hash"].as_str().unwrap(),
            format!("sha256:{}", hex::encode(Sha256::digest(&member)))
        );
    }

    // Digest: hash of the descriptor bytes, signature verifies
    let digest: serde_json::Value =
        serde_json::from_slice(&read_member(&mut archive, "datapackage-digest.json")).unwrap();
    let expected_hash = format!("sha256:{}", hex::encode(Sha256::digest(&datapackage_bytes)));
    assert_eq!(digest["hash"], expected_hash.as_str());

    let signed = &digest["signedData"];
    assert_eq!(signed["hash"], expected_hash.as_str());
    let signature =
        Signature::from_der(&BASE64.decode(signed["signature"].as_str().unwrap()).unwrap())
            .unwrap();
    let key = VerifyingKey::from_public_key_der(
        &BASE64.decode(signed["publicKey"].as_str().unwrap()).unwrap(),
    )
    .unwrap();
    let prehash = Sha256::digest(expected_hash.as_bytes());
    assert!(key.verify_prehash(&prehash, &signature).is_ok());
}

#[tokio::test]
async fn test_unreachable_pages_become_error_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<html><a href="/missing">gone</a></html>"#, "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let generator = test_generator(out.path().to_str().unwrap());

    let id = generator.submit(submission(&format!("{}/", server.uri()))).unwrap();
    let request = generator.process_request(id).await.unwrap();

    // Per-page errors are data; the request still completes
    assert_eq!(request.status, RequestStatus::Completed);

    let (_, stats) = generator.status(id).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 1);

    let mut archive =
        zip::ZipArchive::new(File::open(request.file_path.unwrap()).unwrap()).unwrap();
    let cdx = String::from_utf8(read_member(&mut archive, "indexes/index.cdx")).unwrap();
    assert_eq!(cdx.lines().count(), 1);

    // Only the successful page gets a manifest record
    let manifest = String::from_utf8(read_member(&mut archive, "pages/pages.jsonl")).unwrap();
    assert_eq!(manifest.lines().count(), 2);
    assert!(!manifest.contains("/missing"));
    assert!(manifest.contains(&format!("{}/", server.uri())));
}

#[tokio::test]
async fn test_unreachable_seed_fails_the_request() {
    let out = tempfile::tempdir().unwrap();
    let generator = test_generator(out.path().to_str().unwrap());

    // Port 1 refuses connections; the seed becomes a single error page
    let id = generator.submit(submission("http://127.0.0.1:1/")).unwrap();
    assert!(generator.process_request(id).await.is_err());

    let (request, stats) = generator.status(id).unwrap();
    assert_eq!(request.status, RequestStatus::Failed);
    assert!(!request.error_message.as_deref().unwrap().is_empty());
    assert_eq!(stats.total, 1);
    assert_eq!(stats.failed, 1);

    // No archive is left behind
    assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_excluded_seed_fails_the_request() {
    let out = tempfile::tempdir().unwrap();
    let generator = test_generator(out.path().to_str().unwrap());

    let mut s = submission("https://example.com/");
    s.options.exclude_urls = vec!["https://example.com/".to_string()];
    let id = generator.submit(s).unwrap();

    assert!(generator.process_request(id).await.is_err());

    let (request, _) = generator.status(id).unwrap();
    assert_eq!(request.status, RequestStatus::Failed);
    assert!(request.error_message.is_some());

    // No archive is written for a failed request
    assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_delete_removes_archive_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><title>Solo</title></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let generator = test_generator(out.path().to_str().unwrap());

    let id = generator.submit(submission(&format!("{}/", server.uri()))).unwrap();
    let request = generator.process_request(id).await.unwrap();
    let archive_path = request.file_path.unwrap();
    assert!(std::path::Path::new(&archive_path).exists());

    generator.delete(id).unwrap();
    assert!(!std::path::Path::new(&archive_path).exists());
    assert!(generator.status(id).is_err());
}
