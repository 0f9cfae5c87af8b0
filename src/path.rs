//! Path cleanup applied before case-insensitive rediscovery.

use std::borrow::Cow;

/// Checks whether a path is already in canonical form.
///
/// # Rules
///
/// - Must be non-empty and start with `/`
/// - Must not contain `//` or `\`
/// - Must not contain `.` or `..` segments
///
/// A trailing slash is canonical: whether `/dir/` should become `/dir` is a
/// redirect decision, not a cleanup decision.
///
/// # Examples
///
/// ```
/// use radixmux::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/about"));
/// assert!(is_valid_path("/dir/"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("about"));
/// assert!(!is_valid_path("/about//page"));
/// assert!(!is_valid_path("/about\\page"));
/// assert!(!is_valid_path("/a/../b"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path.split('/').all(|segment| segment != "." && segment != "..")
}

/// Normalizes a path to canonical form.
///
/// Returns `Cow::Borrowed` when the input is already valid (zero
/// allocations) and `Cow::Owned` otherwise (single allocation).
///
/// Cleanup performed:
/// - `.` segments are dropped, `..` segments eat their parent
/// - duplicate slashes collapse: `/path//to` → `/path/to`
/// - backslashes become slashes: `\path\to` → `/path/to`
/// - a missing leading slash is added
/// - a trailing slash is preserved; the empty path becomes `/`
///
/// # Examples
///
/// ```
/// use radixmux::path::normalize_path;
/// use std::borrow::Cow;
///
/// let path = normalize_path("/about");
/// assert!(matches!(path, Cow::Borrowed("/about")));
///
/// assert_eq!(normalize_path("/path//to///page"), "/path/to/page");
/// assert_eq!(normalize_path("/a/b/.."), "/a/");
/// assert_eq!(normalize_path("/..//Foo"), "/Foo");
/// assert_eq!(normalize_path("\\users\\123"), "/users/123");
/// assert_eq!(normalize_path("/dir/"), "/dir/");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let had_trailing_slash =
        path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");

    let unified = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Cow::Borrowed("/");
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if had_trailing_slash {
        normalized.push('/');
    }

    Cow::Owned(normalized)
}
