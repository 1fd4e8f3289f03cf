//! Index identity.

use std::sync::atomic::{AtomicUsize, Ordering};
use tabkv_storage::BucketPath;

/// Name, fields and location of one index.
///
/// The offset is the number of bytes the backend prepends to each physical
/// key in the index bucket. It is zero until
/// [`crate::Table::create_index_buckets`] records what the backend reports.
#[derive(Debug)]
pub struct IndexInfo {
    name: String,
    fields: Vec<String>,
    path: BucketPath,
    offset: AtomicUsize,
}

impl IndexInfo {
    pub(crate) fn new(name: impl Into<String>, fields: Vec<String>, path: BucketPath) -> Self {
        Self {
            name: name.into(),
            fields,
            path,
            offset: AtomicUsize::new(0),
        }
    }

    /// The index name (leaf of its registered path).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed fields in key order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Bucket holding the index entries.
    #[must_use]
    pub fn path(&self) -> &BucketPath {
        &self.path
    }

    /// Bytes to skip in physical keys returned by a scan.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset.load(Ordering::Acquire)
    }

    pub(crate) fn set_offset(&self, offset: usize) {
        self.offset.store(offset, Ordering::Release);
    }

    /// Position of `field` in the key, if indexed.
    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }
}
