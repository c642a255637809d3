//! Package descriptor and signed digest
//!
//! `datapackage.json` lists the archive's member files with sizes and
//! sha256 hashes; `datapackage-digest.json` carries a hash of the descriptor
//! itself, signed with a fresh ECDSA P-384 key. The signature covers the
//! `sha256:<hex>` hash string, prehashed with SHA-256.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use p384::ecdsa::signature::hazmat::PrehashSigner;
use p384::ecdsa::{Signature, SigningKey};
use p384::pkcs8::EncodePublicKey;
use serde_json::json;
use sha2::{Digest, Sha256};

/// One member file of the package
pub struct ResourceFile<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub bytes: &'a [u8],
}

/// Builds the `datapackage.json` contents
pub fn build_datapackage(
    resources: &[ResourceFile<'_>],
    wacz_version: &str,
    software: &str,
    title: &str,
    created: DateTime<Utc>,
) -> String {
    let resource_list: Vec<_> = resources
        .iter()
        .map(|resource| {
            json!({
                "name": resource.name,
                "path": resource.path,
                "hash": format!("sha256:{}", hex::encode(Sha256::digest(resource.bytes))),
                "bytes": resource.bytes.len(),
            })
        })
        .collect();

    json!({
        "profile": "data-package",
        "resources": resource_list,
        "wacz_version": wacz_version,
        "software": software,
        "created": created.format("%Y-%m-%dT%H:%M:%S.000Z").to_string(),
        "title": title,
        "modified": Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
    })
    .to_string()
}

/// Builds the `datapackage-digest.json` contents
///
/// A fresh signing key is generated per archive; the public key travels with
/// the signature so the package stays self-verifying.
pub fn build_datapackage_digest(datapackage: &str, software: &str) -> crate::Result<String> {
    let hash = format!("sha256:{}", hex::encode(Sha256::digest(datapackage.as_bytes())));

    let signing_key = SigningKey::random(&mut rand::thread_rng());
    let prehash = Sha256::digest(hash.as_bytes());
    let signature: Signature = signing_key
        .sign_prehash(&prehash)
        .map_err(|e| crate::WaczError::Signing(e.to_string()))?;

    let public_key = signing_key
        .verifying_key()
        .to_public_key_der()
        .map_err(|e| crate::WaczError::Signing(e.to_string()))?;

    Ok(json!({
        "path": "datapackage.json",
        "hash": hash,
        "signedData": {
            "hash": hash,
            "signature": BASE64.encode(signature.to_der().as_bytes()),
            "publicKey": BASE64.encode(public_key.as_bytes()),
            "created": Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "software": software,
        },
    })
    .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use p384::ecdsa::signature::hazmat::PrehashVerifier;
    use p384::ecdsa::VerifyingKey;
    use p384::pkcs8::DecodePublicKey;

    #[test]
    fn test_datapackage_lists_resources_with_hashes() {
        let resources = vec![
            ResourceFile {
                name: "pages.jsonl",
                path: "pages/pages.jsonl",
                bytes: b"header\n",
            },
            ResourceFile {
                name: "data.warc.gz",
                path: "archive/data.warc.gz",
                bytes: b"\x1f\x8b",
            },
        ];

        let descriptor = build_datapackage(&resources, "1.1.1", "waczgen/1.0", "Site", Utc::now());
        let value: serde_json::Value = serde_json::from_str(&descriptor).unwrap();

        assert_eq!(value["profile"], "data-package");
        assert_eq!(value["wacz_version"], "1.1.1");
        assert_eq!(value["software"], "waczgen/1.0");
        assert_eq!(value["title"], "Site");
        assert!(value["created"].as_str().unwrap().ends_with(".000Z"));

        let resources = value["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0]["path"], "pages/pages.jsonl");
        assert_eq!(resources[0]["bytes"], 7);
        let hash = resources[0]["hash"].as_str().unwrap();
        assert_eq!(
            hash,
            format!("sha256:{}", hex::encode(Sha256::digest(b"header\n")))
        );
    }

    #[test]
    fn test_digest_hash_matches_descriptor() {
        let descriptor = r#"{"profile":"data-package"}"#;
        let digest = build_datapackage_digest(descriptor, "waczgen/1.0").unwrap();
        let value: serde_json::Value = serde_json::from_str(&digest).unwrap();

        let expected = format!(
            "sha256:{}",
            hex::encode(Sha256::digest(descriptor.as_bytes()))
        );
        assert_eq!(value["path"], "datapackage.json");
        assert_eq!(value["hash"], expected.as_str());
        assert_eq!(value["signedData"]["hash"], expected.as_str());
        assert_eq!(value["signedData"]["software"], "waczgen/1.0");
    }

    #[test]
    fn test_signature_verifies_with_bundled_public_key() {
        let descriptor = r#"{"profile":"data-package"}"#;
        let digest = build_datapackage_digest(descriptor, "waczgen/1.0").unwrap();
        let value: serde_json::Value = serde_json::from_str(&digest).unwrap();

        let signed = &value["signedData"];
        let hash = signed["hash"].as_str().unwrap();
        let signature_der = BASE64.decode(signed["signature"].as_str().unwrap()).unwrap();
        let public_key_der = BASE64.decode(signed["publicKey"].as_str().unwrap()).unwrap();

        let verifying_key = VerifyingKey::from_public_key_der(&public_key_der).unwrap();
        let signature = Signature::from_der(&signature_der).unwrap();
        let prehash = Sha256::digest(hash.as_bytes());

        assert!(verifying_key.verify_prehash(&prehash, &signature).is_ok());
    }
}
