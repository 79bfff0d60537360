//! KVP (key/value pair) query parameters.
//!
//! Parameter names are matched case-insensitively. The original spelling of
//! every name is kept so that unrecognized parameters can be carried through
//! as vendor extensions and written back verbatim.

use serde::Serialize;

use crate::error::{CodecError, CodecResult};

/// An ordered KVP parameter map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KvpParams {
    pairs: Vec<(String, String)>,
}

impl KvpParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string: `name=value` pairs joined with `&`.
    ///
    /// A leading `?` is ignored, empty segments are skipped and a segment
    /// without `=` yields an empty value. A segment with an empty name or an
    /// undecodable percent escape is malformed.
    pub fn parse(query: &str) -> CodecResult<Self> {
        let query = query.trim().trim_start_matches('?');
        let mut params = Self::new();

        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (raw_name, raw_value) = segment.split_once('=').unwrap_or((segment, ""));
            let name = decode(raw_name)?;
            if name.trim().is_empty() {
                return Err(CodecError::Malformed(format!(
                    "KVP segment '{}' has no parameter name",
                    segment
                )));
            }
            let value = decode(raw_value)?;
            params.pairs.push((name.trim().to_string(), value));
        }

        Ok(params)
    }

    /// Get a parameter value by case-insensitive name. The last occurrence wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a parameter, replacing any existing value with the same
    /// case-insensitive name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .pairs
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    /// Set a parameter only when a value is present.
    pub fn insert_opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Set a comma-separated list parameter, skipping it entirely when the
    /// list has no non-empty entries.
    pub fn insert_list(&mut self, name: &str, values: &[String]) {
        if let Some(joined) = join_list(values) {
            self.insert(name, joined);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self
            .pairs
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.pairs.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as a query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(n, v)| format!("{}={}", encode(n), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn normalized(&self) -> Vec<(String, &str)> {
        let mut pairs: Vec<(String, &str)> = self
            .pairs
            .iter()
            .map(|(n, v)| (n.to_ascii_lowercase(), v.as_str()))
            .collect();
        pairs.sort();
        pairs
    }
}

/// Equality ignores parameter order and the case of parameter names.
impl PartialEq for KvpParams {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KvpParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.pairs.push((name.into(), value.into()));
        }
        params
    }
}

/// Split a comma-separated list value, trimming entries and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join list entries with commas. `None` when there is nothing to write.
pub fn join_list(values: &[String]) -> Option<String> {
    let entries: Vec<&str> = values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if entries.is_empty() {
        None
    } else {
        Some(entries.join(","))
    }
}

fn decode(raw: &str) -> CodecResult<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| CodecError::Malformed(format!("Invalid percent-encoding in '{}': {}", raw, e)))
}

// List separators and URI punctuation stay readable.
fn encode(raw: &str) -> String {
    urlencoding::encode(raw)
        .replace("%2C", ",")
        .replace("%3A", ":")
        .replace("%2F", "/")
}
