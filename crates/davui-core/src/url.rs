//! URL helpers for addressing entries of the current directory.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
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
    .add(b'|')
    .add(b'}');

/// Directory URL of a location: query and fragment dropped, trailing `/` ensured.
pub fn directory_url(href: &str) -> String {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    let mut url = href[..end].to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// URL of the entry `name` inside `directory` (which ends with `/`).
pub fn entry_url(directory: &str, name: &str) -> String {
    format!("{}{}", directory, utf8_percent_encode(name, SEGMENT))
}

/// URL of the sub-collection `name` inside `directory`, with trailing `/`.
pub fn collection_url(directory: &str, name: &str) -> String {
    format!("{}/", entry_url(directory, name))
}

/// Whether activating a link to `href` should be handled in place.
///
/// Only directory links (ending with `/`) qualify. Absolute links must stay
/// on `origin`.
pub fn is_directory_link(href: &str, origin: &str) -> bool {
    let href = href.trim();
    if !href.ends_with('/') {
        return false;
    }
    if href.starts_with("//") {
        return false;
    }
    if href.contains("://") {
        return href
            .strip_prefix(origin)
            .is_some_and(|rest| rest.starts_with('/'));
    }
    true
}
