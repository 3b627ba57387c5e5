//! PostgreSQL gateways over pooled `sqlx` connections.

mod catalog;
mod shard;

pub use catalog::PgCatalog;
pub use shard::PgShards;

use shardbank_core::Region;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

use crate::error::StoreError;
use crate::record::{Cell, RawRow};

/// Split driver errors into reachability and statement failures.
pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

/// Map a failed procedure call, keeping the database's own message.
pub(crate) fn procedure_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) => StoreError::Procedure(db.message().to_string()),
        _ => classify(err),
    }
}

pub(crate) fn parse_region(code: &str) -> Result<Region, StoreError> {
    code.parse()
        .map_err(|_| StoreError::Query(format!("unexpected region code in database: {code}")))
}

/// Convert a driver row into a `RawRow` by column type.
pub(crate) fn raw_row(row: &PgRow) -> Result<RawRow, StoreError> {
    let mut raw = RawRow::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let type_name = column.type_info().name();
        let cell = match type_name {
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)
                .map(|v| v.map(|v| Cell::Int(v.into()))),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)
                .map(|v| v.map(|v| Cell::Int(v.into()))),
            "INT8" => row.try_get::<Option<i64>, _>(idx).map(|v| v.map(Cell::Int)),
            "NUMERIC" => row
                .try_get::<Option<rust_decimal::Decimal>, _>(idx)
                .map(|v| v.map(Cell::Numeric)),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)
                .map(|v| v.map(|v| Cell::Float(v.into()))),
            "FLOAT8" => row.try_get::<Option<f64>, _>(idx).map(|v| v.map(Cell::Float)),
            "TIMESTAMP" => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(idx)
                .map(|v| v.map(Cell::Timestamp)),
            "TIMESTAMPTZ" => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)
                .map(|v| v.map(|ts| Cell::Timestamp(ts.naive_utc()))),
            "DATE" => row
                .try_get::<Option<chrono::NaiveDate>, _>(idx)
                .map(|v| v.map(Cell::Date)),
            "BOOL" => row.try_get::<Option<bool>, _>(idx).map(|v| v.map(Cell::Bool)),
            _ => row
                .try_get::<Option<String>, _>(idx)
                .map(|v| v.map(Cell::Text)),
        }
        .map_err(|e| {
            StoreError::Query(format!(
                "cannot decode column {} ({type_name}): {e}",
                column.name()
            ))
        })?;
        raw.push(column.name(), cell.unwrap_or(Cell::Null));
    }
    Ok(raw)
}
