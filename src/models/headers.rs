use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header multimap keyed by canonical header name (`Content-Type` form).
///
/// Values are kept in insertion order per key. No validation is applied to
/// names or values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, Vec<String>>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the key.
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .entry(canonical_key(key))
            .or_default()
            .push(value.into());
    }

    /// Replaces every value of the key with a single one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(canonical_key(key), vec![value.into()]);
    }

    /// Replaces every value of the key. An empty list removes the key.
    pub fn set_all(&mut self, key: &str, values: Vec<String>) {
        if values.is_empty() {
            self.remove(key);
        } else {
            self.0.insert(canonical_key(key), values);
        }
    }

    /// First value of the key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0
            .get(&canonical_key(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&canonical_key(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(&canonical_key(key))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Collapses every key to one comma-joined value.
    #[must_use]
    pub fn to_single_value_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.join(",")))
            .collect()
    }

    #[must_use]
    pub fn into_multi_value_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Canonical form of a header name: the first letter and any letter following
/// a hyphen are uppercased, the rest lowercased. Names containing bytes that
/// are not valid token characters are returned unchanged.
#[must_use]
pub fn canonical_key(key: &str) -> String {
    if !key.bytes().all(is_token_byte) {
        return key.to_string();
    }

    let mut upper = true;
    key.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

const fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("content-type"), "Content-Type");
        assert_eq!(canonical_key("X-AMZN-TRACE-ID"), "X-Amzn-Trace-Id");
        assert_eq!(canonical_key("etag"), "Etag");
        assert_eq!(canonical_key("bad header"), "bad header");
    }

    #[test]
    fn test_add_and_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("set-cookie", "a=1");
        headers.add("Set-Cookie", "b=2");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("SET-COOKIE"), Some("a=1"));
        assert_eq!(headers.get_all("set-cookie"), ["a=1", "b=2"]);

        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Set-Cookie"]);
    }

    #[test]
    fn test_set_all_empty_removes() {
        let mut headers = Headers::new();
        headers.set("content-type", "text/plain");
        headers.set_all("Content-Type", Vec::new());

        assert!(headers.is_empty());
        assert!(!headers.contains_key("content-type"));
    }

    #[test]
    fn test_single_value_projection_joins_with_comma() {
        let mut headers = Headers::new();
        headers.add("vary", "Accept");
        headers.add("vary", "Origin");
        headers.set("content-type", "application/json");

        let single = headers.to_single_value_map();
        assert_eq!(single["Vary"], "Accept,Origin");
        assert_eq!(single["Content-Type"], "application/json");
    }
}
