//! Heuristic selection of the substance-name column.
//!
//! Source spreadsheets have no stable schema. Selection order:
//!
//! 1. a column whose header is a known alias (exact, then case-insensitive)
//! 2. with [`SelectionPolicy::AliasOrRanked`], the column with the most
//!    non-empty values, ties going to the leftmost column
//! 3. per-row fallback: the first non-empty cell of each row

use formulary_model::{CellValue, Row, Table};

use crate::normalize::is_blank_or_null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Alias column, else first non-empty cell of each row.
    #[default]
    AliasOrRowFallback,
    /// Alias column, else most populated column, else row fallback.
    AliasOrRanked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChoice {
    Alias { index: usize, name: String },
    Ranked { index: usize, name: String, score: usize },
    RowFallback,
}

impl ColumnChoice {
    /// Column name for reporting; `None` for the row fallback.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Self::Alias { name, .. } | Self::Ranked { name, .. } => Some(name),
            Self::RowFallback => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Alias { name, .. } => format!("{name} (alias)"),
            Self::Ranked { name, score, .. } => format!("{name} ({score} values)"),
            Self::RowFallback => "first non-empty cell".to_string(),
        }
    }
}

/// Finds the first column whose trimmed header matches an alias.
pub fn find_alias_column<S: AsRef<str>>(table: &Table, aliases: &[S]) -> Option<usize> {
    let exact = table.columns.iter().position(|column| {
        let column = column.trim();
        aliases.iter().any(|alias| alias.as_ref() == column)
    });
    exact.or_else(|| {
        table.columns.iter().position(|column| {
            let column = column.trim().to_lowercase();
            aliases
                .iter()
                .any(|alias| alias.as_ref().to_lowercase() == column)
        })
    })
}

/// Number of non-empty, non-null-literal values per column.
pub fn column_scores(table: &Table) -> Vec<usize> {
    (0..table.columns.len())
        .map(|index| {
            table
                .column_values(index)
                .filter(|cell| !is_blank_or_null(cell.coerce_str()))
                .count()
        })
        .collect()
}

/// Most populated column as `(index, score)`; the first column wins ties.
pub fn best_ranked_column(table: &Table) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (index, score) in column_scores(table).into_iter().enumerate() {
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best
}

pub fn select_name_column<S: AsRef<str>>(
    table: &Table,
    aliases: &[S],
    policy: SelectionPolicy,
) -> ColumnChoice {
    if let Some(index) = find_alias_column(table, aliases) {
        return ColumnChoice::Alias {
            index,
            name: table.columns[index].clone(),
        };
    }
    if policy == SelectionPolicy::AliasOrRanked
        && let Some((index, score)) = best_ranked_column(table)
        && score > 0
    {
        return ColumnChoice::Ranked {
            index,
            name: table.columns[index].clone(),
            score,
        };
    }
    ColumnChoice::RowFallback
}

/// First non-empty, non-null-literal cell of a row, in column order.
pub fn first_non_empty_cell(row: &Row) -> Option<&str> {
    row.cells
        .iter()
        .filter_map(|cell| match cell {
            CellValue::Text(text) => Some(text.as_str()),
            CellValue::Missing => None,
        })
        .find(|text| !is_blank_or_null(text))
}

/// Raw candidate text per row according to `choice`, in row order.
///
/// Rows without any usable value under the row fallback are skipped; for a
/// chosen column every row yields its string-coerced cell.
pub fn raw_candidates<'a>(table: &'a Table, choice: &ColumnChoice) -> Vec<&'a str> {
    match choice {
        ColumnChoice::Alias { index, .. } | ColumnChoice::Ranked { index, .. } => table
            .column_values(*index)
            .map(CellValue::coerce_str)
            .collect(),
        ColumnChoice::RowFallback => table.rows.iter().filter_map(first_non_empty_cell).collect(),
    }
}
