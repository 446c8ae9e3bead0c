//! Order-preserving deduplication of candidate names.

use std::collections::HashSet;

use formulary_model::MedicationRecord;

/// Keeps the first occurrence of each key, in insertion order.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    seen: HashSet<String>,
    values: Vec<String>,
    fold_case: bool,
}

impl Deduplicator {
    /// Keys compare lower-cased.
    pub fn case_insensitive() -> Self {
        Self::with_case_folding(true)
    }

    /// Keys compare byte for byte.
    pub fn exact() -> Self {
        Self::with_case_folding(false)
    }

    fn with_case_folding(fold_case: bool) -> Self {
        Self {
            seen: HashSet::new(),
            values: Vec::new(),
            fold_case,
        }
    }

    /// Returns `true` if `value` was new.
    pub fn push(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        let key = if self.fold_case {
            value.to_lowercase()
        } else {
            value.clone()
        };
        if self.seen.insert(key) {
            self.values.push(value);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }
}

impl Extend<String> for Deduplicator {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

pub fn dedupe_case_insensitive<I>(values: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut dedup = Deduplicator::case_insensitive();
    for value in values {
        dedup.push(value);
    }
    dedup.into_vec()
}

/// Turns normalized names into registry records for one `(country, payer)`.
///
/// Names are deduplicated case-insensitively again, so callers may pass the
/// concatenation of several sheets.
pub fn build_registry<I>(names: I, country_code: &str, payer: &str) -> Vec<MedicationRecord>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    dedupe_case_insensitive(names)
        .into_iter()
        .map(|dci| MedicationRecord::reimbursable(country_code, payer, dci))
        .collect()
}
