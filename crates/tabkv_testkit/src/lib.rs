//! # tabkv Testkit
//!
//! Test utilities for tabkv.
//!
//! This crate provides:
//! - Fixture records (`Order`, `Person`, `Book`) and their table definitions
//! - Property-based test generators using proptest
//! - Scenario helpers that run a test body on every reference backend
//! - `tracing` setup for tests
//!
//! ## Usage
//!
//! ```rust
//! use tabkv_testkit::prelude::*;
//!
//! let table = order_table();
//! for_each_backend(&table, |store| {
//!     store.write(|tx| table.put_all(tx, &sample_orders())).unwrap();
//!     let all = store.read(|tx| table.gets(tx, b"")).unwrap();
//!     assert_eq!(all.len(), 4);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod scenario;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::scenario::*;
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use scenario::*;
