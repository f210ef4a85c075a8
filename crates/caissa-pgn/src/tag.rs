//! PGN tag-pair header codec.

use crate::PgnError;
use std::fmt;

/// A single `[Key "Value"]` header pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub key: String,
    pub value: String,
}

/// An ordered collection of tag pairs.
///
/// Order is preserved on write, unknown tags included. Lookups are by
/// key, first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags {
    pairs: Vec<TagPair>,
}

/// The seven-tag roster every archival PGN is expected to carry.
pub const SEVEN_TAG_ROSTER: [&str; 7] =
    ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

impl Tags {
    /// Creates an empty tag list.
    pub fn new() -> Self {
        Tags::default()
    }

    /// Creates the seven-tag roster with placeholder values.
    pub fn with_roster() -> Self {
        let mut tags = Tags::new();
        tags.set("Event", "?");
        tags.set("Site", "?");
        tags.set("Date", "????.??.??");
        tags.set("Round", "?");
        tags.set("White", "?");
        tags.set("Black", "?");
        tags.set("Result", "*");
        tags
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Sets a key to a value, replacing an existing pair or appending.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|p| p.key == key) {
            Some(pair) => pair.value = value.to_string(),
            None => self.pairs.push(TagPair {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Returns all pairs in order.
    pub fn pairs(&self) -> &[TagPair] {
        &self.pairs
    }

    /// Returns true if no tags are present.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the roster keys that are missing.
    pub fn missing_roster_keys(&self) -> Vec<&'static str> {
        SEVEN_TAG_ROSTER
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none())
            .collect()
    }

    /// Parses one `[Key "Value"]` header line.
    ///
    /// Values may escape quotes and backslashes with `\"` and `\\`.
    pub fn parse_line(line: &str) -> Result<TagPair, PgnError> {
        let malformed = || PgnError::InvalidPgn(line.to_string());
        let inner = line
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(malformed)?;

        let (key, rest) = inner.split_once(char::is_whitespace).ok_or_else(malformed)?;
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed());
        }

        let rest = rest.trim_start();
        let mut chars = rest.chars();
        if chars.next() != Some('"') {
            return Err(malformed());
        }

        let mut value = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped @ ('"' | '\\')) => value.push(escaped),
                    _ => return Err(malformed()),
                },
                '"' => {
                    closed = true;
                    break;
                }
                _ => value.push(c),
            }
        }
        if !closed || !chars.as_str().trim().is_empty() {
            return Err(malformed());
        }

        Ok(TagPair {
            key: key.to_string(),
            value,
        })
    }

    /// Adds a parsed header line to the collection.
    pub fn push_line(&mut self, line: &str) -> Result<(), PgnError> {
        let pair = Self::parse_line(line)?;
        self.pairs.push(pair);
        Ok(())
    }
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, "[{} \"{}\"]", self.key, escaped)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in &self.pairs {
            writeln!(f, "{}", pair)?;
        }
        Ok(())
    }
}
