//! Galleria-Common: shared error types and small helpers.
//!
//! This crate provides the pieces used across galleria:
//!
//! - **Error Handling**: the common infrastructure [`Error`] and [`Result`]
//!   types used below the coordinator (database, I/O, validation failures)
//! - **Media Helpers**: content-type detection from object keys
//!
//! # Examples
//!
//! ```
//! use galleria_common::{Error, Result};
//! use galleria_common::media::content_type_for_key;
//!
//! assert_eq!(content_type_for_key("1717430000000-cat.png"), "image/png");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("image 42"))
//! }
//! ```

pub mod error;
pub mod media;

pub use error::{Error, Result};
