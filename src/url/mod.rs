//! URL handling: normalization, resolution, validation, and SURT keys
//!
//! All operations in this module are total: malformed input is returned
//! unchanged (or rejected by `is_valid`) rather than raised as an error, so
//! the crawler can filter candidates without aborting extraction.

mod matcher;
mod normalize;
mod surt;

pub use matcher::glob_match;
pub use normalize::{base_url, is_valid, normalize, resolve};
pub use surt::surt;

/// Schemes that can never be fetched over HTTP.
///
/// URLs with these prefixes pass through `normalize`/`resolve` unchanged and
/// are rejected by `is_valid`.
pub(crate) const NON_FETCHABLE_SCHEMES: &[&str] = &[
    "javascript:",
    "tel:",
    "mailto:",
    "ftp:",
    "file:",
    "data:",
    "blob:",
    "about:",
];

/// Fragment-only and scripted href values that never name a resource.
pub(crate) const VOID_PATTERNS: &[&str] = &["#", "void(0)", "return false"];

pub(crate) fn has_non_fetchable_scheme(url: &str) -> bool {
    let lower = url.to_lowercase();
    NON_FETCHABLE_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
