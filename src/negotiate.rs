//! Accept-family negotiation (RFC 7231 §5.3).
//!
//! Header entries are ranked by quality, then specificity. Entries of equal
//! rank form a tier, and the earliest offer matching anything in the best
//! matching tier wins. Entries with `q=0` are refusals and never match.

use crate::constants::encoding;
use crate::mime::resolve_offer;
use crate::util::{equals_ignore_case, split_list, trim_ows};
use std::cmp::Ordering;

/// Header family an offer list is negotiated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    MediaType,
    Charset,
    Encoding,
    Language,
}

/// One parsed member of an `Accept*` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEntry<'a> {
    pub value: &'a str,
    pub quality: f32,
    pub params: Vec<(&'a str, &'a str)>,
    pub specificity: u8,
    pub order: usize,
}

impl AcceptEntry<'_> {
    pub fn is_refusal(&self) -> bool {
        self.quality <= 0.0
    }
}

/// Parses `header` into entries ranked by preference. Refusals are kept so
/// callers can tell "refused" from "not mentioned".
pub fn parse_accept(header: &str, family: Family) -> Vec<AcceptEntry<'_>> {
    let mut entries: Vec<AcceptEntry<'_>> = split_list(header)
        .enumerate()
        .filter_map(|(order, member)| parse_entry(member, family, order))
        .collect();

    entries.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then(b.specificity.cmp(&a.specificity))
    });
    entries
}

fn parse_entry(member: &str, family: Family, order: usize) -> Option<AcceptEntry<'_>> {
    let mut parts = member.split(';');
    let value = trim_ows(parts.next()?);
    if value.is_empty() {
        return None;
    }

    let mut quality = 1.0_f32;
    let mut params = Vec::new();
    for part in parts {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        let key = trim_ows(key);
        let raw = trim_ows(raw).trim_matches('"');
        if key.eq_ignore_ascii_case("q") {
            quality = parse_quality(raw)?;
        } else if !key.is_empty() {
            params.push((key, raw));
        }
    }

    let specificity = match family {
        Family::MediaType => media_specificity(value, !params.is_empty()),
        _ if value == "*" => 1,
        _ => 2,
    };

    Some(AcceptEntry {
        value,
        quality,
        params,
        specificity,
        order,
    })
}

fn parse_quality(raw: &str) -> Option<f32> {
    raw.parse::<f32>()
        .ok()
        .filter(|quality| (0.0..=1.0).contains(quality))
}

fn media_specificity(value: &str, has_params: bool) -> u8 {
    if value == "*/*" {
        1
    } else if value.ends_with("/*") {
        2
    } else if has_params {
        4
    } else {
        3
    }
}

/// Picks the best offer for `header`. A missing header accepts the first
/// offer; empty offers never win.
pub fn negotiate<'o>(header: Option<&str>, family: Family, offers: &[&'o str]) -> Option<&'o str> {
    let header = match header.map(trim_ows) {
        Some(value) if !value.is_empty() => value,
        _ => return offers.first().copied().filter(|offer| !offer.is_empty()),
    };

    let entries = parse_accept(header, family);
    let accepted: Vec<&AcceptEntry<'_>> = entries.iter().filter(|entry| !entry.is_refusal()).collect();
    for tier in accepted.chunk_by(|a, b| same_rank(a, b)) {
        let found = offers
            .iter()
            .copied()
            .filter(|offer| !offer.is_empty())
            .find(|offer| tier.iter().any(|entry| matches_entry(entry, offer, family)));
        if found.is_some() {
            return found;
        }
    }

    if family == Family::Encoding && identity_allowed(&entries) {
        return offers
            .iter()
            .copied()
            .find(|offer| offer.eq_ignore_ascii_case(encoding::IDENTITY));
    }

    None
}

fn same_rank(a: &AcceptEntry<'_>, b: &AcceptEntry<'_>) -> bool {
    a.quality == b.quality && a.specificity == b.specificity
}

fn matches_entry(entry: &AcceptEntry<'_>, offer: &str, family: Family) -> bool {
    match family {
        Family::MediaType => media_matches(entry, offer),
        Family::Charset | Family::Encoding => {
            entry.value == "*" || equals_ignore_case(entry.value, trim_ows(offer))
        }
        Family::Language => language_matches(entry.value, trim_ows(offer)),
    }
}

fn media_matches(entry: &AcceptEntry<'_>, offer: &str) -> bool {
    if entry.value == "*/*" && entry.params.is_empty() {
        return true;
    }

    let Some(resolved) = resolve_offer(trim_ows(offer)) else {
        return false;
    };

    let mut offer_parts = resolved.split(';');
    let offer_type = trim_ows(offer_parts.next().unwrap_or_default());
    let Some((offer_main, offer_sub)) = offer_type.split_once('/') else {
        return false;
    };
    let Some((spec_main, spec_sub)) = entry.value.split_once('/') else {
        return false;
    };

    let main_ok = spec_main == "*" || offer_main == "*" || equals_ignore_case(spec_main, offer_main);
    let sub_ok = spec_sub == "*" || offer_sub == "*" || equals_ignore_case(spec_sub, offer_sub);
    if !(main_ok && sub_ok) {
        return false;
    }

    let offer_params: Vec<(&str, &str)> = offer_parts
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| (trim_ows(key), trim_ows(value).trim_matches('"')))
        .collect();

    entry.params.iter().all(|(key, value)| {
        offer_params
            .iter()
            .any(|(offer_key, offer_value)| equals_ignore_case(key, offer_key) && offer_value == value)
    })
}

/// RFC 4647 basic filtering: range `en` matches tag `en-US`, not the reverse.
fn language_matches(range: &str, tag: &str) -> bool {
    if range == "*" {
        return true;
    }
    if range.len() > tag.len() {
        return false;
    }
    if !tag.is_char_boundary(range.len()) || !equals_ignore_case(range, &tag[..range.len()]) {
        return false;
    }
    tag.len() == range.len() || tag.as_bytes()[range.len()] == b'-'
}

fn identity_allowed(entries: &[AcceptEntry<'_>]) -> bool {
    let explicit = entries
        .iter()
        .find(|entry| entry.value.eq_ignore_ascii_case(encoding::IDENTITY));
    if let Some(entry) = explicit {
        return !entry.is_refusal();
    }

    !entries
        .iter()
        .any(|entry| entry.value == "*" && entry.is_refusal())
}

#[cfg(test)]
#[path = "negotiate_test.rs"]
mod negotiate_test;
