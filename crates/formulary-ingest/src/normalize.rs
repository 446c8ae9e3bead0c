//! Candidate text normalization.

use formulary_model::record::MAX_DCI_CHARS;

/// Spreadsheet renderings of an absent value.
const NULL_LITERALS: &[&str] = &["nan", "none"];

/// Values containing this word and longer than [`LIST_HEADER_MIN_CHARS`]
/// are section titles repeated inside the sheet.
const LIST_HEADER_WORD: &str = "liste";
const LIST_HEADER_MIN_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub max_chars: usize,
    pub min_chars: Option<usize>,
    pub reject_list_headers: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::extract()
    }
}

impl NormalizeOptions {
    /// Accept anything non-empty.
    pub const fn extract() -> Self {
        Self {
            max_chars: MAX_DCI_CHARS,
            min_chars: None,
            reject_list_headers: false,
        }
    }

    /// Also drop short fragments and repeated list headers.
    pub const fn rebuild() -> Self {
        Self {
            max_chars: MAX_DCI_CHARS,
            min_chars: Some(3),
            reject_list_headers: true,
        }
    }
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    Empty,
    NullLiteral,
    TooShort,
    ListHeader,
}

impl Rejection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NullLiteral => "null literal",
            Self::TooShort => "too short",
            Self::ListHeader => "list header",
        }
    }
}

pub fn is_null_literal(value: &str) -> bool {
    let value = value.trim();
    NULL_LITERALS
        .iter()
        .any(|literal| value.eq_ignore_ascii_case(literal))
}

/// True for values that carry no name: blank or a null literal.
pub fn is_blank_or_null(value: &str) -> bool {
    value.trim().is_empty() || is_null_literal(value)
}

/// Truncates to at most `max` characters (not bytes).
pub fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Trims and bounds a raw candidate, or says why it is not a name.
pub fn normalize_candidate(raw: &str, options: &NormalizeOptions) -> Result<String, Rejection> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Rejection::Empty);
    }
    if is_null_literal(value) {
        return Err(Rejection::NullLiteral);
    }
    let char_count = value.chars().count();
    if options.min_chars.is_some_and(|min| char_count < min) {
        return Err(Rejection::TooShort);
    }
    if options.reject_list_headers
        && char_count > LIST_HEADER_MIN_CHARS
        && value.to_lowercase().contains(LIST_HEADER_WORD)
    {
        return Err(Rejection::ListHeader);
    }
    Ok(truncate_chars(value, options.max_chars).to_string())
}
