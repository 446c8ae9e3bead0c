//! Header row normalization.

use std::collections::{HashMap, HashSet};

/// Normalizes header cells into unique column names.
///
/// Names are trimmed, blank names become `Unnamed: <index>`, and repeated
/// names get the lowest `.1`, `.2`, ... suffix not already used by another
/// column of the row.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let raw: Vec<String> = raw.into_iter().map(|v| v.as_ref().trim().to_string()).collect();
    let mut taken: HashSet<String> = raw.iter().filter(|v| !v.is_empty()).cloned().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (index, trimmed) in raw.into_iter().enumerate() {
        let base = if trimmed.is_empty() {
            format!("Unnamed: {index}")
        } else {
            trimmed
        };
        let name = if emitted.contains(&base) {
            let count = counts.entry(base.clone()).or_insert(0);
            loop {
                *count += 1;
                let candidate = format!("{base}.{count}");
                if !taken.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };
        taken.insert(name.clone());
        emitted.insert(name.clone());
        columns.push(name);
    }

    columns
}
