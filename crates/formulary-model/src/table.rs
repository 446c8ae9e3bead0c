#![deny(unsafe_code)]

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Builds a cell from raw text; blank input stays textual so that the
    /// null-literal filters can see it.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// String coercion used by the column heuristics.
    ///
    /// Missing cells coerce to `"nan"`, matching how spreadsheet tooling
    /// renders absent values, so downstream filters treat both the same way.
    pub fn coerce_str(&self) -> &str {
        match self {
            Self::Text(value) => value,
            Self::Missing => "nan",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// One data row; cells are aligned with [`Table::columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Iterates the cells of one column; short rows yield [`CellValue::Missing`].
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        const MISSING: &CellValue = &CellValue::Missing;
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(MISSING))
    }
}

/// A named table as produced by a workbook decoder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

impl Sheet {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}
