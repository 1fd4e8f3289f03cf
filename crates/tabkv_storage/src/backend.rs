//! Storage backend trait definition.

use crate::error::StorageResult;
use crate::path::BucketPath;

/// A key/value pair returned by [`StorageBackend::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    /// The physical key as stored by the backend.
    pub key: Vec<u8>,
    /// The stored value.
    pub value: Vec<u8>,
}

impl KvPair {
    /// Creates a new pair.
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// What a backend reports after creating (or finding) a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketHandle {
    /// Bytes the backend prepends to every physical key of the bucket.
    pub prefix: Vec<u8>,
    /// Number of leading bytes to skip in a physical key returned by
    /// [`StorageBackend::scan`] to get back the logical key.
    pub offset: usize,
}

/// The operations tabkv issues against one open transaction.
///
/// Implementors are transaction handles, not databases: every call happens
/// inside whatever transaction the handle represents, and the handle owns
/// durability, isolation and conflict handling. tabkv never begins or commits.
///
/// # Invariants
///
/// - `create_bucket` is create-if-absent and returns the same handle for the
///   same path every time
/// - `scan` yields pairs in ascending physical key order, restricted to keys
///   starting with the bucket's prefix followed by `prefix`
/// - `filter` sees the physical key (including any bucket prefix)
/// - `next_sequence` increments then returns
/// - operations on a missing bucket fail with
///   [`crate::StorageError::BucketNotFound`]
///
/// # Implementors
///
/// - [`crate::InMemoryTxn`] - nested buckets, offset 0
/// - [`crate::FlatTxn`] - single ordered key space, buckets emulated by prefix
pub trait StorageBackend {
    /// Creates the bucket at `path` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the transaction is read-only.
    fn create_bucket(&mut self, path: &BucketPath) -> StorageResult<BucketHandle>;

    /// Deletes the bucket at `path`, including nested buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn delete_bucket(&mut self, path: &BucketPath) -> StorageResult<()>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn put(&mut self, path: &BucketPath, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Reads the value under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn get(&self, path: &BucketPath, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn delete(&mut self, path: &BucketPath, key: &[u8]) -> StorageResult<()>;

    /// Ascending scan of the keys sharing `prefix`, keeping those accepted by
    /// `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn scan(
        &self,
        path: &BucketPath,
        prefix: &[u8],
        filter: &dyn Fn(&[u8]) -> bool,
    ) -> StorageResult<Vec<KvPair>>;

    /// Returns the bucket's sequence without changing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn sequence(&self, path: &BucketPath) -> StorageResult<u64>;

    /// Increments the bucket's sequence and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn next_sequence(&mut self, path: &BucketPath) -> StorageResult<u64>;

    /// Overwrites the bucket's sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn set_sequence(&mut self, path: &BucketPath, seq: u64) -> StorageResult<()>;

    /// Unfiltered prefix scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist.
    fn scan_prefix(&self, path: &BucketPath, prefix: &[u8]) -> StorageResult<Vec<KvPair>> {
        self.scan(path, prefix, &|_| true)
    }
}
