//! In-memory hierarchical storage backend.

use crate::backend::{BucketHandle, KvPair, StorageBackend};
use crate::error::{StorageError, StorageResult};
use crate::path::BucketPath;
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct Bucket {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    children: BTreeMap<String, Bucket>,
    sequence: u64,
}

#[derive(Debug, Clone, Default)]
struct Tree {
    roots: BTreeMap<String, Bucket>,
}

impl Tree {
    fn open(&self, path: &BucketPath) -> StorageResult<&Bucket> {
        let (first, rest) = path
            .segments()
            .split_first()
            .ok_or_else(|| StorageError::invalid_path("empty bucket name"))?;
        let mut bucket = self
            .roots
            .get(first)
            .ok_or_else(|| StorageError::bucket_not_found(path))?;
        for segment in rest {
            bucket = bucket
                .children
                .get(segment)
                .ok_or_else(|| StorageError::bucket_not_found(path))?;
        }
        Ok(bucket)
    }

    fn open_mut(&mut self, path: &BucketPath) -> StorageResult<&mut Bucket> {
        let (first, rest) = path
            .segments()
            .split_first()
            .ok_or_else(|| StorageError::invalid_path("empty bucket name"))?;
        let mut bucket = self
            .roots
            .get_mut(first)
            .ok_or_else(|| StorageError::bucket_not_found(path))?;
        for segment in rest {
            bucket = bucket
                .children
                .get_mut(segment)
                .ok_or_else(|| StorageError::bucket_not_found(path))?;
        }
        Ok(bucket)
    }

    /// Creates the bucket and any missing parents.
    fn create(&mut self, path: &BucketPath) -> StorageResult<()> {
        path.validate()?;
        let (first, rest) = path
            .segments()
            .split_first()
            .ok_or_else(|| StorageError::invalid_path("empty bucket name"))?;
        let mut bucket = self.roots.entry(first.clone()).or_default();
        for segment in rest {
            bucket = bucket.children.entry(segment.clone()).or_default();
        }
        Ok(())
    }

    fn remove(&mut self, path: &BucketPath) -> StorageResult<()> {
        path.validate()?;
        let leaf = path.leaf().unwrap_or_default();
        let removed = if path.parent().is_empty() {
            self.roots.remove(leaf)
        } else {
            let parent = BucketPath::new(path.parent().iter().cloned());
            self.open_mut(&parent)
                .map_err(|_| StorageError::bucket_not_found(path))?
                .children
                .remove(leaf)
        };
        removed
            .map(|_| ())
            .ok_or_else(|| StorageError::bucket_not_found(path))
    }
}

/// An in-memory store with nested buckets.
///
/// Each bucket holds ordered entries, child buckets and its own sequence,
/// the same shape as a B+tree store with nested buckets. Physical keys are
/// the logical keys, so [`BucketHandle::offset`] is always 0.
///
/// Transactions are closure scoped:
/// - [`InMemoryBackend::view`] runs against the committed state and rejects
///   writes with [`StorageError::ReadOnly`]
/// - [`InMemoryBackend::update`] runs against a private copy that replaces
///   the committed state only if the closure returns `Ok`
///
/// Writers are serialised. Calling `update` from inside `view` on the same
/// backend deadlocks.
///
/// # Example
///
/// ```rust
/// use tabkv_storage::{BucketPath, InMemoryBackend, StorageBackend, StorageError};
///
/// let store = InMemoryBackend::new();
/// let path = BucketPath::parse("orders");
/// store
///     .update(|tx| {
///         tx.create_bucket(&path)?;
///         tx.put(&path, b"k", b"v")
///     })
///     .unwrap();
/// let value = store
///     .view(|tx| tx.get(&path, b"k"))
///     .unwrap();
/// assert_eq!(value.as_deref(), Some(&b"v"[..]));
/// # Ok::<(), StorageError>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tree: RwLock<Tree>,
    writer: Mutex<()>,
}

impl InMemoryBackend {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` in a read-only transaction.
    pub fn view<R, E>(&self, f: impl FnOnce(&InMemoryTxn<'_>) -> Result<R, E>) -> Result<R, E> {
        let guard = self.tree.read();
        let txn = InMemoryTxn {
            tree: Cow::Borrowed(&*guard),
            writable: false,
        };
        f(&txn)
    }

    /// Runs `f` in a read-write transaction, committing on `Ok`.
    pub fn update<R, E>(
        &self,
        f: impl FnOnce(&mut InMemoryTxn<'_>) -> Result<R, E>,
    ) -> Result<R, E> {
        let _writer = self.writer.lock();
        let snapshot = self.tree.read().clone();
        let mut txn = InMemoryTxn {
            tree: Cow::Owned(snapshot),
            writable: true,
        };
        let result = f(&mut txn)?;
        *self.tree.write() = txn.tree.into_owned();
        Ok(result)
    }

    /// Number of committed entries in a bucket, excluding child buckets.
    pub fn entry_count(&self, path: &BucketPath) -> StorageResult<usize> {
        Ok(self.tree.read().open(path)?.entries.len())
    }
}

/// A transaction on an [`InMemoryBackend`].
#[derive(Debug)]
pub struct InMemoryTxn<'a> {
    tree: Cow<'a, Tree>,
    writable: bool,
}

impl InMemoryTxn<'_> {
    /// Returns true for transactions opened with `update`.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    fn tree_mut(&mut self) -> StorageResult<&mut Tree> {
        if !self.writable {
            return Err(StorageError::ReadOnly);
        }
        Ok(self.tree.to_mut())
    }
}

impl StorageBackend for InMemoryTxn<'_> {
    fn create_bucket(&mut self, path: &BucketPath) -> StorageResult<BucketHandle> {
        self.tree_mut()?.create(path)?;
        tracing::debug!(bucket = %path, "bucket ready");
        Ok(BucketHandle::default())
    }

    fn delete_bucket(&mut self, path: &BucketPath) -> StorageResult<()> {
        self.tree_mut()?.remove(path)?;
        tracing::debug!(bucket = %path, "bucket deleted");
        Ok(())
    }

    fn put(&mut self, path: &BucketPath, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.tree_mut()?
            .open_mut(path)?
            .entries
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, path: &BucketPath, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.tree.open(path)?.entries.get(key).cloned())
    }

    fn delete(&mut self, path: &BucketPath, key: &[u8]) -> StorageResult<()> {
        self.tree_mut()?.open_mut(path)?.entries.remove(key);
        Ok(())
    }

    fn scan(
        &self,
        path: &BucketPath,
        prefix: &[u8],
        filter: &dyn Fn(&[u8]) -> bool,
    ) -> StorageResult<Vec<KvPair>> {
        let bucket = self.tree.open(path)?;
        Ok(bucket
            .entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(k, _)| filter(k))
            .map(|(k, v)| KvPair::new(k.clone(), v.clone()))
            .collect())
    }

    fn sequence(&self, path: &BucketPath) -> StorageResult<u64> {
        Ok(self.tree.open(path)?.sequence)
    }

    fn next_sequence(&mut self, path: &BucketPath) -> StorageResult<u64> {
        let bucket = self.tree_mut()?.open_mut(path)?;
        bucket.sequence = bucket
            .sequence
            .checked_add(1)
            .ok_or_else(|| StorageError::Corrupted(format!("sequence overflow in [{path}]")))?;
        Ok(bucket.sequence)
    }

    fn set_sequence(&mut self, path: &BucketPath, seq: u64) -> StorageResult<()> {
        self.tree_mut()?.open_mut(path)?.sequence = seq;
        Ok(())
    }
}
