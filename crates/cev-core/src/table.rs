use crate::model::{PageRecord, Value};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Label(String),
    Value(Value),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Label(s) => write!(f, "{s}"),
            Cell::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Rectangular grid of cells, stored row-major.
///
/// The canonical view of a page has two rows (labels, then values) and one
/// column per field; the transposed view has one row per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    n_rows: usize,
    n_cols: usize,
    cells: Vec<Cell>,
}

impl Table {
    /// Labels on the first row, values on the second.
    pub fn canonical(record: &PageRecord) -> Self {
        let labels = record.fields.iter().map(|f| Cell::Label(f.label.clone()));
        let values = record.fields.iter().map(|f| Cell::Value(f.value.clone()));
        Table {
            n_rows: 2,
            n_cols: record.fields.len(),
            cells: labels.chain(values).collect(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.n_rows && col < self.n_cols {
            self.cells.get(row * self.n_cols + col)
        } else {
            None
        }
    }

    /// Rows as slices. A table without columns still has its rows, each
    /// empty.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        (0..self.n_rows).map(move |r| &self.cells[r * self.n_cols..(r + 1) * self.n_cols])
    }

    pub fn transpose(&self) -> Table {
        let mut cells = Vec::with_capacity(self.cells.len());
        for c in 0..self.n_cols {
            for r in 0..self.n_rows {
                cells.push(self.cells[r * self.n_cols + c].clone());
            }
        }
        Table {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            cells,
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}
