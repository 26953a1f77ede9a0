//! URL path helpers for container and resource URLs.
//!
//! Container URLs end with a trailing slash; resource URLs do not. Names
//! are percent-encoded when they become path segments and decoded when a
//! segment is turned back into a display name.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a name is embedded as a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decoded base name of a node URL.
///
/// Container URLs (trailing slash) yield the name of their final segment.
pub fn base_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Parent container URL of a node, with its trailing slash.
///
/// Returns `None` for a root URL that has no parent container.
pub fn parent_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let idx = trimmed.rfind('/')?;
    if idx > 0 && trimmed.as_bytes()[idx - 1] == b'/' {
        // The slash belongs to the scheme separator; this is already the root.
        return None;
    }
    Some(trimmed[..=idx].to_string())
}

/// Join a name onto a container URL as an encoded path segment.
pub fn child_url(container_url: &str, name: &str, container: bool) -> String {
    let base = container_url.trim_end_matches('/');
    let encoded = utf8_percent_encode(name, PATH_SEGMENT);
    if container {
        format!("{}/{}/", base, encoded)
    } else {
        format!("{}/{}", base, encoded)
    }
}

/// Return `url` with a trailing slash, adding one if missing.
pub fn ensure_container_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
