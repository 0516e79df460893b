use crate::constants::header;
use crate::headers::HeaderMap;
use crate::util::{equals_ignore_case, split_list, trim_ows};
use chrono::{DateTime, FixedOffset, Utc};

pub(crate) const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub(crate) fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

pub(crate) fn parse_http_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(trim_ows(value)).ok()
}

fn is_no_cache(cache_control: &str) -> bool {
    split_list(cache_control).any(|directive| equals_ignore_case(directive, "no-cache"))
}

fn opaque_tag(tag: &str) -> &str {
    let tag = trim_ows(tag);
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Weak comparison of `etag` against an `If-None-Match` list.
pub(crate) fn etag_matches(etag: &str, none_match: &str) -> bool {
    let etag = opaque_tag(etag);
    split_list(none_match).any(|candidate| opaque_tag(candidate) == etag)
}

/// Whether a cached copy described by the request validators is still
/// current for the response being built.
pub(crate) fn is_fresh(request: &HeaderMap, response: &HeaderMap) -> bool {
    let modified_since = request
        .get(header::IF_MODIFIED_SINCE)
        .map(trim_ows)
        .filter(|value| !value.is_empty());
    let none_match = request
        .get(header::IF_NONE_MATCH)
        .map(trim_ows)
        .filter(|value| !value.is_empty());

    if modified_since.is_none() && none_match.is_none() {
        return false;
    }

    if request.get(header::CACHE_CONTROL).is_some_and(is_no_cache) {
        return false;
    }

    if let Some(none_match) = none_match.filter(|value| *value != "*") {
        let Some(etag) = response.get(header::ETAG) else {
            return false;
        };
        if !etag_matches(etag, none_match) {
            return false;
        }
    }

    if let Some(since) = modified_since {
        let last_modified = response.get(header::LAST_MODIFIED).and_then(parse_http_date);
        return match (last_modified, parse_http_date(since)) {
            (Some(last_modified), Some(since)) => last_modified <= since,
            _ => false,
        };
    }

    true
}

#[cfg(test)]
#[path = "conditional_test.rs"]
mod conditional_test;
