//! Bucket lifecycle.

use super::Table;
use crate::error::{CoreError, CoreResult};
use tabkv_storage::StorageBackend;

impl<T> Table<T> {
    /// Creates the data bucket (and, on hierarchical backends, its parents)
    /// if it does not exist. The sequence of a new bucket starts at 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the bucket.
    pub fn create_data_bucket<S>(&self, tx: &mut S) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        tx.create_bucket(&self.path)?;
        tracing::debug!(bucket = %self.path, "data bucket ready");
        Ok(())
    }

    /// Deletes the data bucket and everything nested in it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BucketOpenFailed`] if the bucket does not exist.
    pub fn delete_data_bucket<S>(&self, tx: &mut S) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        tx.delete_bucket(&self.path)?;
        tracing::debug!(bucket = %self.path, "data bucket deleted");
        Ok(())
    }

    /// Creates every index bucket that does not exist yet and records the
    /// key offset the backend reports for it.
    ///
    /// Call this before querying a flat backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects a bucket.
    pub fn create_index_buckets<S>(&self, tx: &mut S) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        for info in self.all_index_infos() {
            let handle = tx.create_bucket(info.path())?;
            info.set_offset(handle.offset);
            tracing::debug!(
                index = info.name(),
                bucket = %info.path(),
                offset = handle.offset,
                "index bucket ready"
            );
        }
        Ok(())
    }

    /// Deletes every index bucket. Buckets already gone, for example nested
    /// ones removed with the data bucket, are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails for another reason.
    pub fn delete_index_buckets<S>(&self, tx: &mut S) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        for info in self.all_index_infos() {
            match tx.delete_bucket(info.path()).map_err(CoreError::from) {
                Ok(()) => tracing::debug!(index = info.name(), "index bucket deleted"),
                Err(CoreError::BucketOpenFailed { .. }) => {
                    tracing::debug!(index = info.name(), "index bucket already absent");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CoreError;
    use crate::fixture::{item, item_table};
    use tabkv_storage::{BucketPath, FlatBackend, InMemoryBackend, StorageBackend};

    #[test]
    fn create_buckets_on_memory_backend() {
        let table = item_table();
        let store = InMemoryBackend::new();
        store
            .update(|tx| {
                table.create_data_bucket(tx)?;
                table.create_index_buckets(tx)?;
                table.create_index_buckets(tx)
            })
            .unwrap();

        store
            .view(|tx| {
                tx.sequence(&BucketPath::parse("shop/items/idx_Kind_Level"))?;
                tx.sequence(&BucketPath::parse("shop/items/midx_Tags"))
            })
            .unwrap();
        assert_eq!(table.index("idx_Kind_Level").unwrap().offset(), 0);
    }

    #[test]
    fn flat_backend_offsets_are_recorded() {
        let table = item_table();
        let store = FlatBackend::new();
        store
            .update(|tx| {
                table.create_data_bucket(tx)?;
                table.create_index_buckets(tx)
            })
            .unwrap();

        let info = table.index("idx_Kind_Level").unwrap();
        assert_eq!(info.offset(), "shop/items/idx_Kind_Level:".len());
        let info = table.index("midx_Tags").unwrap();
        assert_eq!(info.offset(), "shop/items/midx_Tags:".len());
    }

    #[test]
    fn delete_data_bucket_then_indexes() {
        let table = item_table();
        let store = InMemoryBackend::new();
        store
            .update(|tx| {
                table.create_data_bucket(tx)?;
                table.create_index_buckets(tx)?;
                table.put(tx, &item(1, "book", 1, &["a"]))?;
                table.delete_data_bucket(tx)?;
                table.delete_index_buckets(tx)
            })
            .unwrap();

        let err = store.view(|tx| table.get_by_key(tx, &1u32.to_be_bytes())).unwrap_err();
        assert!(matches!(err, CoreError::BucketOpenFailed { .. }));
    }

    #[test]
    fn delete_missing_data_bucket_fails() {
        let table = item_table();
        let store = InMemoryBackend::new();
        let err = store.update(|tx| table.delete_data_bucket(tx)).unwrap_err();
        assert_eq!(
            err,
            CoreError::BucketOpenFailed {
                path: "shop/items".into()
            }
        );
    }
}
