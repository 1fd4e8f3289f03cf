//! # tabkv Core
//!
//! Secondary indexes over an ordered, bucketed key-value store.
//!
//! This crate provides:
//! - [`TableBuilder`] to register a record type, its primary key and its
//!   single- and multi-valued indexes
//! - index maintenance on [`Table::put`] and [`Table::delete`]
//! - equality and range queries through [`Query`] and [`RangeQuery`]
//!
//! Every operation runs on a transaction handle implementing
//! [`tabkv_storage::StorageBackend`]. The caller opens and commits
//! transactions; a table only issues reads and writes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod index;
mod query;
mod record;
mod table;

#[cfg(test)]
mod fixture;

pub use config::TableConfig;
pub use error::{CoreError, CoreResult};
pub use index::{IndexInfo, KeyFn, MultiKeyFn};
pub use query::{CompareOp, Query, QueryPlan, RangeQuery, Residual};
pub use record::{CborCodec, FnCodec, MarshalFn, RecordCodec, UnmarshalFn};
pub use table::{Table, TableBuilder};
