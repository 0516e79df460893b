//! Host, scheme, client-address and subdomain derivation.
//!
//! Every function here takes `trusted` from [`TrustPolicy::is_trusted`](crate::trust::TrustPolicy::is_trusted);
//! untrusted or malformed forwarded values silently fall back to the direct
//! connection's view.

use crate::constants::{header, scheme};
use crate::headers::HeaderMap;
use crate::util::{equals_ignore_case, first_list_item, split_list};
use std::borrow::Cow;
use std::net::IpAddr;

/// Host as seen by the client, `host[:port]`.
pub(crate) fn resolve_host<'a>(trusted: bool, headers: &'a HeaderMap, uri_host: &'a str) -> &'a str {
    if trusted {
        if let Some(forwarded) = headers.get(header::X_FORWARDED_HOST) {
            let first = first_list_item(forwarded);
            if !first.is_empty() {
                return first;
            }
        }
    }
    uri_host
}

/// Removes a trailing `:port`, keeping IPv6 brackets intact.
pub(crate) fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rfind(':') {
        // A bare IPv6 literal has several colons and no port.
        Some(idx) if !host[..idx].contains(':') => &host[..idx],
        _ => host,
    }
}

pub(crate) fn resolve_scheme(tls: bool, trusted: bool, headers: &HeaderMap) -> &'static str {
    if tls {
        return scheme::HTTPS;
    }
    if !trusted {
        return scheme::HTTP;
    }

    for name in [header::X_FORWARDED_PROTO, header::X_FORWARDED_PROTOCOL] {
        if let Some(value) = headers.get(name) {
            if equals_ignore_case(first_list_item(value), scheme::HTTPS) {
                return scheme::HTTPS;
            }
        }
    }

    if headers
        .get(header::X_FORWARDED_SSL)
        .is_some_and(|value| equals_ignore_case(value.trim(), "on"))
    {
        return scheme::HTTPS;
    }

    if headers
        .get(header::X_URL_SCHEME)
        .is_some_and(|value| equals_ignore_case(value.trim(), scheme::HTTPS))
    {
        return scheme::HTTPS;
    }

    scheme::HTTP
}

pub(crate) fn is_valid_ip(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

/// Splits a forwarded-address list, dropping invalid entries when `validate` is set.
pub(crate) fn collect_ips(value: &str, validate: bool) -> Vec<String> {
    split_list(value)
        .filter(|entry| !validate || is_valid_ip(entry))
        .map(str::to_string)
        .collect()
}

/// First usable entry of a forwarded-address list.
pub(crate) fn first_ip(value: &str, validate: bool) -> Option<&str> {
    split_list(value).find(|entry| !validate || is_valid_ip(entry))
}

/// Labels of `host` left of the last `offset` ones, lowercased and IDNA-decoded.
///
/// Address literals, negative offsets and offsets covering every label yield
/// nothing; an offset of zero keeps every label.
pub(crate) fn subdomains(host: &str, offset: i64) -> Vec<String> {
    if offset < 0 {
        return Vec::new();
    }

    let hostname = strip_port(host.trim());
    if hostname.starts_with('[') || is_valid_ip(hostname) {
        return Vec::new();
    }

    let lowered = hostname.to_lowercase();
    let trimmed = lowered.strip_suffix('.').unwrap_or(&lowered);
    if trimmed.is_empty() {
        return Vec::new();
    }

    let labels: Vec<&str> = trimmed.split('.').collect();
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    if offset >= labels.len() {
        return Vec::new();
    }

    labels[..labels.len() - offset]
        .iter()
        .map(|label| decode_label(label).into_owned())
        .collect()
}

/// Decodes an `xn--` label, keeping the raw label when it is not valid punycode.
fn decode_label(label: &str) -> Cow<'_, str> {
    let punycode = label
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("xn--"));
    if label.len() <= 4 || !punycode {
        return Cow::Borrowed(label);
    }

    let (decoded, outcome) = idna::domain_to_unicode(label);
    if outcome.is_err() || decoded.is_ascii() || decoded.contains('.') {
        return Cow::Borrowed(label);
    }
    Cow::Owned(decoded)
}

#[cfg(test)]
#[path = "network_test.rs"]
mod network_test;
