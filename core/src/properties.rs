use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::diagnostics::Warning;
use crate::quote::quote;

pub const PAIR_DELIMITER: char = ';';
pub const KEY_VALUE_DELIMITER: char = '=';

/// Ordered `-D` properties passed to Ant.
///
/// Keys and values are quoted when inserted, not when serialized. Iteration
/// order is the order in which a key was first inserted; re-inserting a key
/// replaces its value in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropertyTable {
    entries: IndexMap<String, String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structured setter: overwrites any previous value for `key`.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(
            quote(key.trim()).into_owned(),
            quote(value.trim()).into_owned(),
        );
    }

    /// Adds every `name=value` pair in `raw` (separated by `;`) to the table.
    ///
    /// Existing entries are kept, so calling this twice accumulates both
    /// lists. Pairs that do not split into exactly two segments are dropped
    /// and reported through `diagnostics`.
    pub fn set_from_pairs(&mut self, raw: &str, diagnostics: &mut Diagnostics) {
        self.set_from_pairs_with(raw, PAIR_DELIMITER, KEY_VALUE_DELIMITER, diagnostics);
    }

    pub fn set_from_pairs_with(
        &mut self,
        raw: &str,
        pair_delimiter: char,
        kv_delimiter: char,
        diagnostics: &mut Diagnostics,
    ) {
        for pair in raw.split(pair_delimiter) {
            let segments: Vec<&str> = pair.split(kv_delimiter).collect();
            match segments.as_slice() {
                [key, value] => self.set(key, value),
                _ => diagnostics.warn(Warning::MalformedPropertyPair {
                    pair: pair.to_string(),
                }),
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the table back into `key=value;key2=value2` form.
    pub fn to_delimited_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            if !out.is_empty() {
                out.push(PAIR_DELIMITER);
            }
            out.push_str(key);
            out.push(KEY_VALUE_DELIMITER);
            out.push_str(value);
        }
        out
    }
}
