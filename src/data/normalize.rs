//! Country Name Normalizer
//! Collapses heterogeneous country spellings into one join-safe key.

use std::fmt;

/// Canonical country key used to join the consumption, ratings and happiness
/// datasets and to match map feature names against them.
///
/// Construction lowercases the raw name, strips whitespace, then strips every
/// character outside `a-z`. The invariant is that two records refer to the
/// same country iff their keys are equal. Distinct names that collapse to the
/// same key are silently merged (exact string collapse, no fuzzy matching).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryKey(String);

impl CountryKey {
    /// Derive the canonical key from a raw country name.
    ///
    /// Total function: any input yields a key (possibly empty).
    pub fn from_raw(raw: &str) -> Self {
        let key: String = raw
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase())
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CountryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
