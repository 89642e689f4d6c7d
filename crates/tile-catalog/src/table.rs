//! A small columnar table for point observations.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TileError};

/// One typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
    Time(Vec<DateTime<Utc>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values widened to `f64`; `None` for text and time columns.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Self::Float(v) => Some(v.clone()),
            Self::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Text(_) | Self::Time(_) => None,
        }
    }

    /// Keep the rows where `keep` is true.
    fn filter(&self, keep: &[bool]) -> Column {
        fn pick<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            Self::Float(v) => Self::Float(pick(v, keep)),
            Self::Int(v) => Self::Int(pick(v, keep)),
            Self::Text(v) => Self::Text(pick(v, keep)),
            Self::Time(v) => Self::Time(pick(v, keep)),
        }
    }
}

/// Ordered, equally long named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointTable {
    columns: IndexMap<String, Column>,
}

impl PointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column. Its length must match the table's.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        let existing = self
            .columns
            .iter()
            .find(|(n, _)| **n != name)
            .map(|(_, c)| c.len());
        if let Some(rows) = existing {
            if column.len() != rows {
                return Err(TileError::LengthMismatch(format!(
                    "column '{}' has {} rows, table has {}",
                    name,
                    column.len(),
                    rows
                )));
            }
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Builder-style variant of [`PointTable::insert`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.insert(name, column)?;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| TileError::ColumnNotFound(name.to_string()))
    }

    /// A numeric column as `f64`.
    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .to_f64()
            .ok_or_else(|| TileError::column_type(name, "numeric"))
    }

    pub fn i64_column(&self, name: &str) -> Result<&[i64]> {
        match self.column(name)? {
            Column::Int(v) => Ok(v),
            _ => Err(TileError::column_type(name, "an integer column")),
        }
    }

    /// A copy holding only the rows where `keep` is true.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<PointTable> {
        if keep.len() != self.n_rows() {
            return Err(TileError::LengthMismatch(format!(
                "row filter has {} entries, table has {} rows",
                keep.len(),
                self.n_rows()
            )));
        }
        Ok(PointTable {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.filter(keep)))
                .collect(),
        })
    }
}
