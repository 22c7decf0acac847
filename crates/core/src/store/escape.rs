//! Filesystem-safe names for URL-sourced objects.

/// Turn a source URL into a single path segment.
///
/// `:` becomes `-`, `/` becomes `_`, and the result is percent-encoded so
/// that only ASCII alphanumerics and `-_.~` remain literal.
pub fn escape_url(url: &str) -> String {
    let substituted = url.replace(':', "-").replace('/', "_");
    urlencoding::encode(&substituted).into_owned()
}
