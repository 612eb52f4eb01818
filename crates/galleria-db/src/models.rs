//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use serde::{Deserialize, Serialize};

/// A persisted image metadata row.
///
/// `image_name` doubles as the object-store key the binary is stored
/// under; `category` is an opaque caller-supplied label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub image_name: String,
    pub category: String,
}

impl ImageRecord {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            image_name: row.get(1)?,
            category: row.get(2)?,
        })
    }
}
