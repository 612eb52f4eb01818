//! SQLite metadata store for galleria.
//!
//! Provides the connection pool, embedded schema migrations, row models,
//! and the query functions the upload/delete coordinator and the HTTP
//! layer use to read and write image metadata.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
