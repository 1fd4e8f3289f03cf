//! # tabkv Storage
//!
//! The transactional bucket boundary tabkv is written against.
//!
//! tabkv never opens a database or drives a transaction. It receives a
//! transaction handle implementing [`StorageBackend`] and issues bucket,
//! key/value and sequence operations on it. Whatever the handle commits or
//! rolls back is the caller's business.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - hierarchical buckets with per-bucket sequences
//! - [`FlatBackend`] - one ordered key space with buckets folded into a key
//!   prefix, the way hash and string key-value stores are adapted
//!
//! ## Example
//!
//! ```rust
//! use tabkv_storage::{BucketPath, InMemoryBackend, StorageBackend, StorageError};
//!
//! let store = InMemoryBackend::new();
//! let path = BucketPath::parse("shop/orders");
//! store
//!     .update(|tx| {
//!         tx.create_bucket(&path)?;
//!         tx.put(&path, b"1", b"book")
//!     })
//!     .unwrap();
//!
//! let value = store.view(|tx| tx.get(&path, b"1")).unwrap();
//! assert_eq!(value.as_deref(), Some(&b"book"[..]));
//! # Ok::<(), StorageError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod flat;
mod memory;
mod path;

pub use backend::{BucketHandle, KvPair, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use flat::{bucket_prefix, FlatBackend, FlatTxn, BUCKET_TERMINATOR};
pub use memory::{InMemoryBackend, InMemoryTxn};
pub use path::BucketPath;
