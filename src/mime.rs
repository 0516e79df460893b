use crate::util::normalize_lower;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static EXTENSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("html", "text/html"),
        ("htm", "text/html"),
        ("css", "text/css"),
        ("csv", "text/csv"),
        ("txt", "text/plain"),
        ("text", "text/plain"),
        ("md", "text/markdown"),
        ("xml", "application/xml"),
        ("json", "application/json"),
        ("js", "text/javascript"),
        ("mjs", "text/javascript"),
        ("msgpack", "application/vnd.msgpack"),
        ("cbor", "application/cbor"),
        ("form", "application/x-www-form-urlencoded"),
        ("pdf", "application/pdf"),
        ("zip", "application/zip"),
        ("gz", "application/gzip"),
        ("wasm", "application/wasm"),
        ("bin", "application/octet-stream"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("svg", "image/svg+xml"),
        ("webp", "image/webp"),
        ("ico", "image/x-icon"),
        ("mp3", "audio/mpeg"),
        ("mp4", "video/mp4"),
        ("webm", "video/webm"),
        ("woff", "font/woff"),
        ("woff2", "font/woff2"),
    ])
});

/// Media type for a file extension, with or without the leading dot.
pub fn by_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.strip_prefix('.').unwrap_or(extension);
    EXTENSIONS.get(normalize_lower(extension).as_ref()).copied()
}

/// Resolves a negotiation offer: values containing `/` are media types,
/// anything else is looked up as an extension.
pub fn resolve_offer(offer: &str) -> Option<&str> {
    if offer.contains('/') {
        Some(offer)
    } else {
        by_extension(offer)
    }
}

/// Media type of a `Content-Type` value without parameters, lowercased.
pub(crate) fn essence(content_type: &str) -> String {
    let base = content_type.split(';').next().unwrap_or_default();
    base.trim().to_ascii_lowercase()
}

#[cfg(test)]
#[path = "mime_test.rs"]
mod mime_test;
