//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! This module provides a `FromRow` trait that models can implement to
//! define how they are constructed from database rows, plus helper functions
//! for common query patterns.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use rust_decimal::Decimal;

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// This provides graceful error handling instead of panicking when the database
/// contains invalid enum values (from corruption, manual edits, etc.).
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Parse a TEXT column holding a decimal price.
fn parse_decimal(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<Decimal> {
    row.get::<_, String>(col)?.parse::<Decimal>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
///
/// Implementing this trait allows using the `query_one` and `query_all`
/// helper functions, reducing repetitive row mapping closures.
pub trait FromRow: Sized {
    /// Construct an instance from a database row.
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const OFFER_COLS: &str = "id, name, slug, description, image, state, created_at, updated_at";

pub const PRODUCT_COLS: &str =
    "id, offer_id, name, sku, image, price, state, created_at, updated_at";

pub const STAFF_COLS: &str = "id, email, name, api_key_hash, created_at";

// ============ FromRow Implementations ============

impl FromRow for Offer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Offer {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
            image: row.get(4)?,
            state: parse_enum(row, 5, "state")?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl FromRow for Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            offer_id: row.get(1)?,
            name: row.get(2)?,
            sku: row.get(3)?,
            image: row.get(4)?,
            price: parse_decimal(row, 5, "price")?,
            state: parse_enum(row, 6, "state")?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl FromRow for Staff {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Staff {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            api_key_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
