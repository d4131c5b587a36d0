//! Endpoint key derivation.

/// Group a request URL under its first two path segments.
///
/// `/users/profile/42?x=1` → `/users/profile`. Paths with fewer than two
/// non-empty segments are returned as-is (without the query).
pub fn endpoint_key(url: &str) -> String {
    let path = url.split('?').next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(first), Some(second)) => format!("/{}/{}", first, second),
        _ => path.to_string(),
    }
}
