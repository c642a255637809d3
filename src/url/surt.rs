use url::Url;

/// Computes the SURT (Sort-friendly URI Reordering Transform) key for a URL.
///
/// The URL is lowercased, the host labels are reversed and joined by commas,
/// then `)` plus path, query, and fragment are appended. Unparsable input is
/// returned lowercased as-is.
///
/// # Examples
///
/// ```
/// use waczgen::url::surt;
///
/// assert_eq!(surt("https://a.b.com/x?y"), "com,b,a)/x?y");
/// ```
pub fn surt(url: &str) -> String {
    let lower = url.to_lowercase();

    let parsed = match Url::parse(&lower) {
        Ok(u) => u,
        Err(_) => return lower,
    };

    let host = match parsed.host_str() {
        Some(h) => h,
        None => return lower,
    };

    let reversed: Vec<&str> = host.split('.').rev().collect();
    let mut out = reversed.join(",");
    out.push(')');
    out.push_str(parsed.path());

    if let Some(query) = parsed.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        out.push('#');
        out.push_str(fragment);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surt_example() {
        assert_eq!(surt("https://a.b.com/x?y"), "com,b,a)/x?y");
    }

    #[test]
    fn test_surt_lowercases() {
        assert_eq!(surt("https://EXAMPLE.COM/Path"), "com,example)/path");
    }

    #[test]
    fn test_surt_root_path() {
        assert_eq!(surt("https://example.com/"), "com,example)/");
    }

    #[test]
    fn test_surt_single_label_host() {
        assert_eq!(surt("http://localhost/x"), "localhost)/x");
    }

    #[test]
    fn test_surt_with_fragment() {
        assert_eq!(surt("https://a.example.com/p#sec"), "com,example,a)/p#sec");
    }

    #[test]
    fn test_surt_unparsable() {
        assert_eq!(surt("Not A Url"), "not a url");
    }
}
