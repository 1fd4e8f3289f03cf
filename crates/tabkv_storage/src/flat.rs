//! Flat key-space storage backend with emulated buckets.

use crate::backend::{BucketHandle, KvPair, StorageBackend};
use crate::error::{StorageError, StorageResult};
use crate::path::BucketPath;
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Terminates the bucket path inside every physical key.
pub const BUCKET_TERMINATOR: u8 = b':';

/// Namespace of the per-bucket sequence records. Starts with a NUL byte so it
/// sorts before, and never collides with, any bucket prefix.
const SEQUENCE_NAMESPACE: &[u8] = b"\x00__sequence__\x00";

type KeySpace = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory store with a single ordered key space.
///
/// Buckets are emulated the way hash or string key-value stores do it: every
/// physical key is `"<seg>/<seg>/...:" ++ key`. Scans hand the physical key
/// to the filter and return it unchanged, so callers skip
/// [`BucketHandle::offset`] bytes to get the logical key back. Sequences are
/// stored big-endian under a reserved namespace, and that record also marks
/// the bucket as existing. Path segments may not contain `/` or `:`, since
/// either would let two buckets share a physical prefix.
///
/// Transactions behave like [`crate::InMemoryBackend`]'s.
#[derive(Debug, Default)]
pub struct FlatBackend {
    keys: RwLock<KeySpace>,
    writer: Mutex<()>,
}

impl FlatBackend {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` in a read-only transaction.
    pub fn view<R, E>(&self, f: impl FnOnce(&FlatTxn<'_>) -> Result<R, E>) -> Result<R, E> {
        let guard = self.keys.read();
        let txn = FlatTxn {
            keys: Cow::Borrowed(&*guard),
            writable: false,
        };
        f(&txn)
    }

    /// Runs `f` in a read-write transaction, committing on `Ok`.
    pub fn update<R, E>(&self, f: impl FnOnce(&mut FlatTxn<'_>) -> Result<R, E>) -> Result<R, E> {
        let _writer = self.writer.lock();
        let snapshot = self.keys.read().clone();
        let mut txn = FlatTxn {
            keys: Cow::Owned(snapshot),
            writable: true,
        };
        let result = f(&mut txn)?;
        *self.keys.write() = txn.keys.into_owned();
        Ok(result)
    }

    /// Number of committed physical keys, sequence records included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// Returns a copy of every committed physical key in order.
    #[must_use]
    pub fn physical_keys(&self) -> Vec<Vec<u8>> {
        self.keys.read().keys().cloned().collect()
    }
}

/// Physical prefix of a bucket: the joined path plus the terminator.
#[must_use]
pub fn bucket_prefix(path: &BucketPath) -> Vec<u8> {
    let mut prefix = path.join(BucketPath::SEPARATOR).into_bytes();
    prefix.push(BUCKET_TERMINATOR);
    prefix
}

fn validate_flat(path: &BucketPath) -> StorageResult<()> {
    path.validate()?;
    let reserved = |c: char| c == BucketPath::SEPARATOR || c == char::from(BUCKET_TERMINATOR);
    match path.segments().iter().find(|s| s.contains(reserved)) {
        Some(segment) => Err(StorageError::invalid_path(format!(
            "segment [{segment}] of [{path}] contains a reserved character"
        ))),
        None => Ok(()),
    }
}

fn sequence_key(path: &BucketPath) -> Vec<u8> {
    let mut key = SEQUENCE_NAMESPACE.to_vec();
    key.extend_from_slice(path.join(BucketPath::SEPARATOR).as_bytes());
    key
}

fn physical_key(path: &BucketPath, key: &[u8]) -> Vec<u8> {
    let mut physical = bucket_prefix(path);
    physical.extend_from_slice(key);
    physical
}

fn decode_sequence(raw: &[u8]) -> StorageResult<u64> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| StorageError::Corrupted(format!("sequence record of {} bytes", raw.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

fn prefixed_keys(keys: &KeySpace, prefix: &[u8]) -> Vec<Vec<u8>> {
    keys.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, _)| k.clone())
        .collect()
}

/// A transaction on a [`FlatBackend`].
#[derive(Debug)]
pub struct FlatTxn<'a> {
    keys: Cow<'a, KeySpace>,
    writable: bool,
}

impl FlatTxn<'_> {
    /// Returns true for transactions opened with `update`.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    fn keys_mut(&mut self) -> StorageResult<&mut KeySpace> {
        if !self.writable {
            return Err(StorageError::ReadOnly);
        }
        Ok(self.keys.to_mut())
    }

    fn ensure_bucket(&self, path: &BucketPath) -> StorageResult<()> {
        validate_flat(path)?;
        if self.keys.contains_key(&sequence_key(path)) {
            Ok(())
        } else {
            Err(StorageError::bucket_not_found(path))
        }
    }
}

impl StorageBackend for FlatTxn<'_> {
    fn create_bucket(&mut self, path: &BucketPath) -> StorageResult<BucketHandle> {
        validate_flat(path)?;
        let keys = self.keys_mut()?;
        keys.entry(sequence_key(path))
            .or_insert_with(|| 0u64.to_be_bytes().to_vec());
        let prefix = bucket_prefix(path);
        tracing::debug!(bucket = %path, offset = prefix.len(), "flat bucket ready");
        Ok(BucketHandle {
            offset: prefix.len(),
            prefix,
        })
    }

    fn delete_bucket(&mut self, path: &BucketPath) -> StorageResult<()> {
        self.ensure_bucket(path)?;
        let joined = path.join(BucketPath::SEPARATOR);
        let keys = self.keys_mut()?;

        let mut doomed = prefixed_keys(keys, &bucket_prefix(path));
        doomed.extend(prefixed_keys(keys, format!("{joined}/").as_bytes()));
        doomed.push(sequence_key(path));
        let mut nested = SEQUENCE_NAMESPACE.to_vec();
        nested.extend_from_slice(format!("{joined}/").as_bytes());
        doomed.extend(prefixed_keys(keys, &nested));

        for key in &doomed {
            keys.remove(key);
        }
        tracing::debug!(bucket = %path, removed = doomed.len(), "flat bucket deleted");
        Ok(())
    }

    fn put(&mut self, path: &BucketPath, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.ensure_bucket(path)?;
        self.keys_mut()?
            .insert(physical_key(path, key), value.to_vec());
        Ok(())
    }

    fn get(&self, path: &BucketPath, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.ensure_bucket(path)?;
        Ok(self.keys.get(&physical_key(path, key)).cloned())
    }

    fn delete(&mut self, path: &BucketPath, key: &[u8]) -> StorageResult<()> {
        self.ensure_bucket(path)?;
        self.keys_mut()?.remove(&physical_key(path, key));
        Ok(())
    }

    fn scan(
        &self,
        path: &BucketPath,
        prefix: &[u8],
        filter: &dyn Fn(&[u8]) -> bool,
    ) -> StorageResult<Vec<KvPair>> {
        self.ensure_bucket(path)?;
        let start = physical_key(path, prefix);
        Ok(self
            .keys
            .range(start.clone()..)
            .take_while(|(k, _)| k.starts_with(&start))
            .filter(|(k, _)| filter(k))
            .map(|(k, v)| KvPair::new(k.clone(), v.clone()))
            .collect())
    }

    fn sequence(&self, path: &BucketPath) -> StorageResult<u64> {
        validate_flat(path)?;
        match self.keys.get(&sequence_key(path)) {
            Some(raw) => decode_sequence(raw),
            None => Err(StorageError::bucket_not_found(path)),
        }
    }

    fn next_sequence(&mut self, path: &BucketPath) -> StorageResult<u64> {
        let next = self
            .sequence(path)?
            .checked_add(1)
            .ok_or_else(|| StorageError::Corrupted(format!("sequence overflow in [{path}]")))?;
        self.set_sequence(path, next)?;
        Ok(next)
    }

    fn set_sequence(&mut self, path: &BucketPath, seq: u64) -> StorageResult<()> {
        self.ensure_bucket(path)?;
        self.keys_mut()?
            .insert(sequence_key(path), seq.to_be_bytes().to_vec());
        Ok(())
    }
}
