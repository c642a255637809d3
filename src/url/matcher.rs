/// Checks if a URL matches a shell-style glob pattern
///
/// Supports `*` (any run of characters, including none) and `?` (exactly one
/// character). Used for the `exclude_patterns` crawl option, e.g.
/// `https://example.com/admin/*`.
///
/// # Examples
///
/// ```
/// use waczgen::url::glob_match;
///
/// assert!(glob_match("https://example.com/admin/*", "https://example.com/admin/users"));
/// assert!(!glob_match("https://example.com/admin/*", "https://example.com/public"));
/// assert!(glob_match("*/page?", "https://example.com/page1"));
/// ```
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let c: Vec<char> = candidate.chars().collect();

    // Iterative matcher with single-star backtracking
    let (mut pi, mut ci) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ci < c.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == c[ci]) {
            pi += 1;
            ci += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ci));
            pi += 1;
        } else if let Some((star_pi, star_ci)) = star {
            pi = star_pi + 1;
            ci = star_ci + 1;
            star = Some((star_pi, star_ci + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }

    pi == p.len()
}
