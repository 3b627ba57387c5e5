//! Row normalization for the read surface.
//!
//! Rows leave the service as JSON objects with lower-case keys. Datetime
//! columns are rendered `YYYY-MM-DD HH:MM:SS` and numeric columns are widened
//! to floating point, except integer columns a report explicitly keeps.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

/// Rendering of datetime columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A JSON-safe output row.
pub type Record = Map<String, Value>;

/// One column value as read from the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// SQL NULL.
    Null,
    /// Integer column.
    Int(i64),
    /// Exact decimal column.
    Numeric(Decimal),
    /// Floating-point column.
    Float(f64),
    /// Character column.
    Text(String),
    /// Timestamp column.
    Timestamp(NaiveDateTime),
    /// Date column.
    Date(NaiveDate),
    /// Boolean column.
    Bool(bool),
}

/// An ordered set of named column values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    columns: Vec<(String, Cell)>,
}

impl RawRow {
    /// An empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, cell: Cell) -> Self {
        self.push(name, cell);
        self
    }

    /// Append a column in place.
    pub fn push(&mut self, name: impl Into<String>, cell: Cell) {
        self.columns.push((name.into(), cell));
    }

    /// Look up a column by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, cell)| cell)
    }

    /// Iterate over columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}

/// Converts raw rows into output records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    keep_integer: &'static [&'static str],
}

impl Normalizer {
    /// Widen every numeric column to float.
    pub const WIDEN_ALL: Self = Self { keep_integer: &[] };

    /// Keep the named integer columns as integers; widen the rest.
    #[must_use]
    pub const fn keeping_integers(columns: &'static [&'static str]) -> Self {
        Self {
            keep_integer: columns,
        }
    }

    /// Normalize a batch of rows.
    #[must_use]
    pub fn normalize(&self, rows: Vec<RawRow>) -> Vec<Record> {
        rows.into_iter().map(|row| self.normalize_row(row)).collect()
    }

    /// Normalize one row.
    #[must_use]
    pub fn normalize_row(&self, row: RawRow) -> Record {
        row.columns
            .into_iter()
            .map(|(name, cell)| {
                let key = name.to_lowercase();
                let value = self.value(&key, cell);
                (key, value)
            })
            .collect()
    }

    fn keeps(&self, key: &str) -> bool {
        self.keep_integer.contains(&key)
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(&self, key: &str, cell: Cell) -> Value {
        match cell {
            Cell::Null => Value::Null,
            Cell::Int(v) if self.keeps(key) => Value::from(v),
            Cell::Int(v) => float(v as f64),
            Cell::Numeric(d) if self.keeps(key) && d.fract().is_zero() => {
                d.to_i64().map_or_else(|| decimal(d), Value::from)
            }
            Cell::Numeric(d) => decimal(d),
            Cell::Float(v) => float(v),
            Cell::Text(s) => Value::String(s),
            Cell::Timestamp(ts) => Value::String(ts.format(DATETIME_FORMAT).to_string()),
            Cell::Date(d) => Value::String(
                d.and_hms_opt(0, 0, 0)
                    .map_or_else(|| d.to_string(), |ts| ts.format(DATETIME_FORMAT).to_string()),
            ),
            Cell::Bool(b) => Value::Bool(b),
        }
    }
}

fn decimal(d: Decimal) -> Value {
    d.to_f64().map_or(Value::Null, float)
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}
