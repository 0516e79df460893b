use crate::util::{equals_ignore_case, normalize_lower, split_list};
use indexmap::IndexMap;
use std::borrow::Cow;

#[derive(Debug, Clone)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

/// Ordered, case-insensitive, multi-value header map.
///
/// Names keep the spelling of their first insertion; lookups fold case.
/// Clearing keeps the allocated capacity so pooled contexts can reuse it.
#[derive(Debug, Default, Clone)]
pub struct HeaderMap {
    entries: IndexMap<String, HeaderEntry>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(estimate: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(estimate.max(16)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(normalize_lower(name).as_ref())
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name)
            .and_then(|entry| entry.values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> impl Iterator<Item = &str> {
        self.entry(name)
            .into_iter()
            .flat_map(|entry| entry.values.iter().map(String::as_str))
    }

    /// Every occurrence of `name` joined with `", "`, borrowing when there is only one.
    pub fn joined(&self, name: &str) -> Option<Cow<'_, str>> {
        let entry = self.entry(name)?;
        match entry.values.as_slice() {
            [] => None,
            [single] => Some(Cow::Borrowed(single.as_str())),
            many => Some(Cow::Owned(many.join(", "))),
        }
    }

    /// Replaces all values of `name`.
    pub fn insert<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let key = normalize_lower(&name).into_owned();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.values.clear();
                entry.values.push(value);
            }
            None => {
                self.entries.insert(
                    key,
                    HeaderEntry {
                        name,
                        values: vec![value],
                    },
                );
            }
        }
    }

    /// Adds another occurrence of `name` without touching the existing ones.
    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let key = normalize_lower(&name).into_owned();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(entry) => entry.values.push(value),
            None => {
                self.entries.insert(
                    key,
                    HeaderEntry {
                        name,
                        values: vec![value],
                    },
                );
            }
        }
    }

    /// Merges comma-separated members into a single-valued list header.
    ///
    /// Members already present (compared case-insensitively) are skipped and
    /// an empty result removes the header.
    pub fn merge_list(&mut self, name: &str, value: &str) {
        let mut members: Vec<String> = self
            .get(name)
            .map(|existing| split_list(existing).map(str::to_string).collect())
            .unwrap_or_default();

        for incoming in split_list(value) {
            if members
                .iter()
                .any(|existing| equals_ignore_case(existing, incoming))
            {
                continue;
            }
            members.push(incoming.to_string());
        }

        if members.is_empty() {
            self.remove(name);
            return;
        }

        self.insert(name, members.join(", "));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries
            .shift_remove(normalize_lower(name).as_ref())
            .is_some()
    }

    /// Keeps the occurrences of `name` accepted by `keep`; the header goes
    /// away when none survive.
    pub fn retain<F>(&mut self, name: &str, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let key = normalize_lower(name);
        let Some(entry) = self.entries.get_mut(key.as_ref()) else {
            return;
        };
        entry.values.retain(|value| keep(value));
        if entry.values.is_empty() {
            self.entries.shift_remove(key.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates `(name, value)` pairs in insertion order, one per occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().flat_map(|entry| {
            entry
                .values
                .iter()
                .map(move |value| (entry.name.as_str(), value.as_str()))
        })
    }

    fn entry(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries.get(normalize_lower(name).as_ref())
    }
}

impl<N, V> FromIterator<(N, V)> for HeaderMap
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}

#[cfg(test)]
#[path = "headers_test.rs"]
mod headers_test;
