//! In-memory column-addressed table used by the frontier and normalisation stages
//!
//! Cells are stringly typed as they appear in the CSV files; `None` is null.

use thiserror::Error;

use super::entity_kind::EntityKind;

pub type Cell = Option<String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("{dataset} dataset has no '{column}' column")]
    MissingColumn { dataset: EntityKind, column: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    kind: EntityKind,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Map a raw CSV field to a cell. Empty fields and the literal `NULL` are null.
pub fn cell_from_field(field: &str) -> Cell {
    if field.is_empty() || field == "NULL" {
        None
    } else {
        Some(field.to_string())
    }
}

impl Table {
    pub fn new(kind: EntityKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            rows: Vec::new(),
        }
    }

    /// Empty table with the scraped dataset header
    pub fn with_raw_schema(kind: EntityKind) -> Self {
        let columns = kind.raw_columns().iter().map(|c| (*c).to_string()).collect();
        Self::new(kind, columns)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name).ok_or_else(|| TableError::MissingColumn {
            dataset: self.kind,
            column: name.to_string(),
        })
    }

    /// Index of `name`, appending an all-null column when absent
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = value;
        }
    }

    /// Non-null values of one column in row order
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column).and_then(|c| c.as_deref()))
    }

    /// New table with exactly `columns`, in that order
    pub fn project(&self, columns: &[&str]) -> Result<Table, TableError> {
        let indices = columns
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut projected = Table::new(
            self.kind,
            columns.iter().map(|c| (*c).to_string()).collect(),
        );
        for row in &self.rows {
            projected.rows.push(indices.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(projected)
    }
}
