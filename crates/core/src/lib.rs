//! Sieve Core - Document model and shared types for the Sieve query engine.
//!
//! This crate provides the foundational types every other Sieve crate uses:
//!
//! - `Value`: Runtime values that appear in selectors, options and documents
//! - `Document`: An insertion-ordered map of string keys to values
//! - `ejson`: Lossless extended JSON encoding for values
//! - `Error`: Error types for Sieve operations
//!
//! # Example
//!
//! ```rust
//! use sieve_core::{ejson, Document, Value};
//!
//! let selector = Document::new()
//!     .with("status", "open")
//!     .with("created", Value::Date(1_700_000_000_000));
//!
//! let text = ejson::to_ejson_string(&Value::Document(selector.clone())).unwrap();
//! let back = ejson::from_ejson_str(&text).unwrap();
//! assert_eq!(back, Value::Document(selector));
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod document;
pub mod ejson;
mod error;
mod value;

pub use document::Document;
pub use error::{Error, Result};
pub use value::{Regex, Value};
