//! Keeping index entries in step with record writes.
//!
//! Writes are issued in a fixed order: stale index entries are deleted, new
//! ones inserted, and the record value written last. A failure stops the
//! sequence where it is; undoing the partial work is the transaction's job.

use super::Table;
use crate::error::CoreResult;
use tabkv_codec::append_terminal;
use tabkv_storage::StorageBackend;

fn entry_key(fragment: Vec<u8>, primary_key: &[u8]) -> Vec<u8> {
    append_terminal(fragment, primary_key)
}

impl<T> Table<T> {
    /// Inserts or replaces `record`, updating every index.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be (un)marshalled or the backend
    /// fails. Index changes made before the failure are not undone.
    pub fn put<S>(&self, tx: &mut S, record: &T) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        let key = (self.primary.key)(record);
        let value = self.codec.marshal(record)?;

        match tx.get(&self.path, &key)? {
            Some(stored) => {
                let old = self.codec.unmarshal(&stored)?;
                let mut changed = 0usize;
                for index in &self.indexes {
                    let before = (index.key)(&old);
                    let after = (index.key)(record);
                    if before == after {
                        continue;
                    }
                    tx.delete(index.info.path(), &entry_key(before, &key))?;
                    tx.put(index.info.path(), &entry_key(after, &key), &key)?;
                    changed += 1;
                }
                for mindex in &self.mindexes {
                    for fragment in (mindex.keys)(&old) {
                        tx.delete(mindex.info.path(), &entry_key(fragment, &key))?;
                    }
                }
                tracing::debug!(bucket = %self.path, changed, "record updated");
            }
            None => {
                for index in &self.indexes {
                    let fragment = (index.key)(record);
                    tx.put(index.info.path(), &entry_key(fragment, &key), &key)?;
                }
                tracing::debug!(bucket = %self.path, "record inserted");
            }
        }

        for mindex in &self.mindexes {
            for fragment in (mindex.keys)(record) {
                tx.put(mindex.info.path(), &entry_key(fragment, &key), &key)?;
            }
        }

        tx.put(&self.path, &key, &value)?;
        Ok(())
    }

    /// Puts each record in turn.
    ///
    /// # Errors
    ///
    /// Stops at the first failing record.
    pub fn put_all<'r, S, I>(&self, tx: &mut S, records: I) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
        I: IntoIterator<Item = &'r T>,
        T: 'r,
    {
        records.into_iter().try_for_each(|record| self.put(tx, record))
    }

    /// Removes the stored record with `record`'s primary key and all its
    /// index entries. Removing an absent record succeeds.
    ///
    /// Entries are derived from the stored record, not from `record`, so a
    /// caller holding a stale copy still removes the right entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored record cannot be unmarshalled or the
    /// backend fails.
    pub fn delete<S>(&self, tx: &mut S, record: &T) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        let key = (self.primary.key)(record);
        self.delete_by_key(tx, &key)
    }

    /// Like [`Table::delete`], addressing the record by primary key.
    ///
    /// # Errors
    ///
    /// See [`Table::delete`].
    pub fn delete_by_key<S>(&self, tx: &mut S, key: &[u8]) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        let Some(stored) = tx.get(&self.path, key)? else {
            return Ok(());
        };
        let old = self.codec.unmarshal(&stored)?;

        for index in &self.indexes {
            tx.delete(index.info.path(), &entry_key((index.key)(&old), key))?;
        }
        for mindex in &self.mindexes {
            for fragment in (mindex.keys)(&old) {
                tx.delete(mindex.info.path(), &entry_key(fragment, key))?;
            }
        }
        tx.delete(&self.path, key)?;
        tracing::debug!(bucket = %self.path, "record deleted");
        Ok(())
    }

    /// Deletes each record in turn.
    ///
    /// # Errors
    ///
    /// Stops at the first failure.
    pub fn delete_all<'r, S, I>(&self, tx: &mut S, records: I) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
        I: IntoIterator<Item = &'r T>,
        T: 'r,
    {
        records
            .into_iter()
            .try_for_each(|record| self.delete(tx, record))
    }

    /// Current sequence of the data bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the data bucket does not exist.
    pub fn sequence<S>(&self, tx: &S) -> CoreResult<u64>
    where
        S: StorageBackend + ?Sized,
    {
        Ok(tx.sequence(&self.path)?)
    }

    /// Increments the data bucket's sequence and returns the new value,
    /// typically to mint a primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the data bucket does not exist.
    pub fn next_sequence<S>(&self, tx: &mut S) -> CoreResult<u64>
    where
        S: StorageBackend + ?Sized,
    {
        Ok(tx.next_sequence(&self.path)?)
    }

    /// Overwrites the data bucket's sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the data bucket does not exist.
    pub fn set_sequence<S>(&self, tx: &mut S, seq: u64) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        Ok(tx.set_sequence(&self.path, seq)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::fixture::{item, item_table, Item};
    use tabkv_codec::{encode, KeyEncoder, OrderedKey};
    use tabkv_storage::{BucketPath, InMemoryBackend, KvPair};

    fn setup() -> (Table<Item>, InMemoryBackend) {
        let table = item_table();
        let store = InMemoryBackend::new();
        store
            .update(|tx| {
                table.create_data_bucket(tx)?;
                table.create_index_buckets(tx)
            })
            .unwrap();
        (table, store)
    }

    fn entries(store: &InMemoryBackend, path: &str) -> Vec<KvPair> {
        store
            .view(|tx| tx.scan_prefix(&BucketPath::parse(path), b""))
            .unwrap()
    }

    fn kind_level_key(kind: &str, level: u8, id: u32) -> Vec<u8> {
        let mut key = KeyEncoder::new();
        key.field(kind.as_bytes()).ordered(&level);
        append_terminal(key.into_bytes(), &id.to_ordered_bytes())
    }

    #[test]
    fn insert_writes_index_entries_and_value() {
        let (table, store) = setup();
        store
            .update(|tx| table.put(tx, &item(1, "book", 2, &["a", "b"])))
            .unwrap();

        let pk = 1u32.to_ordered_bytes();
        assert_eq!(
            entries(&store, "shop/items/idx_Kind_Level"),
            vec![KvPair::new(kind_level_key("book", 2, 1), pk.clone())]
        );
        let tags = entries(&store, "shop/items/midx_Tags");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].key, append_terminal(encode(&["a"]), &pk));
        assert_eq!(tags[1].value, pk);
        assert_eq!(entries(&store, "shop/items").len(), 1);
    }

    #[test]
    fn update_moves_changed_entries() {
        let (table, store) = setup();
        store
            .update(|tx| {
                table.put(tx, &item(1, "book", 2, &["a", "b"]))?;
                table.put(tx, &item(1, "fruit", 2, &["b", "c"]))
            })
            .unwrap();

        let kind = entries(&store, "shop/items/idx_Kind_Level");
        assert_eq!(kind.len(), 1);
        assert_eq!(kind[0].key, kind_level_key("fruit", 2, 1));

        let pk = 1u32.to_ordered_bytes();
        let tags: Vec<Vec<u8>> = entries(&store, "shop/items/midx_Tags")
            .into_iter()
            .map(|kv| kv.key)
            .collect();
        assert_eq!(
            tags,
            vec![
                append_terminal(encode(&["b"]), &pk),
                append_terminal(encode(&["c"]), &pk),
            ]
        );
    }

    #[test]
    fn unchanged_put_is_stable() {
        let (table, store) = setup();
        let record = item(4, "book", 1, &["x"]);
        store
            .update(|tx| {
                table.put(tx, &record)?;
                table.put(tx, &record)
            })
            .unwrap();
        assert_eq!(entries(&store, "shop/items/idx_Kind_Level").len(), 1);
        assert_eq!(entries(&store, "shop/items/midx_Tags").len(), 1);
    }

    #[test]
    fn delete_uses_stored_record() {
        let (table, store) = setup();
        store
            .update(|tx| {
                table.put(tx, &item(1, "book", 2, &["a"]))?;
                // stale copy: different kind, same identity
                table.delete(tx, &item(1, "fruit", 9, &[]))
            })
            .unwrap();
        assert!(entries(&store, "shop/items/idx_Kind_Level").is_empty());
        assert!(entries(&store, "shop/items/midx_Tags").is_empty());
        assert!(entries(&store, "shop/items").is_empty());
    }

    #[test]
    fn delete_absent_is_noop() {
        let (table, store) = setup();
        store
            .update(|tx| table.delete(tx, &item(7, "book", 1, &[])))
            .unwrap();
    }

    #[test]
    fn put_all_and_delete_all() {
        let (table, store) = setup();
        let records = vec![item(1, "a", 1, &[]), item(2, "b", 1, &[]), item(3, "c", 1, &[])];
        store.update(|tx| table.put_all(tx, &records)).unwrap();
        assert_eq!(entries(&store, "shop/items").len(), 3);

        store.update(|tx| table.delete_all(tx, &records[..2])).unwrap();
        assert_eq!(entries(&store, "shop/items").len(), 1);
    }

    #[test]
    fn delete_by_key_removes_entries() {
        let (table, store) = setup();
        store
            .update(|tx| {
                table.put(tx, &item(5, "book", 1, &["t"]))?;
                table.delete_by_key(tx, &5u32.to_ordered_bytes())
            })
            .unwrap();
        assert!(entries(&store, "shop/items/midx_Tags").is_empty());
    }

    #[test]
    fn put_without_buckets_fails() {
        let table = item_table();
        let store = InMemoryBackend::new();
        let err = store
            .update(|tx| table.put(tx, &item(1, "book", 1, &[])))
            .unwrap_err();
        assert!(matches!(err, CoreError::BucketOpenFailed { .. }));
    }

    #[test]
    fn failed_transaction_leaves_nothing() {
        let (table, store) = setup();
        let result: CoreResult<()> = store.update(|tx| {
            table.put(tx, &item(1, "book", 1, &["a"]))?;
            Err(CoreError::record("abort"))
        });
        assert!(result.is_err());
        assert!(entries(&store, "shop/items/idx_Kind_Level").is_empty());
    }

    #[test]
    fn sequence_roundtrip() {
        let (table, store) = setup();
        let (start, next, after_set) = store
            .update(|tx| {
                let start = table.sequence(tx)?;
                let next = table.next_sequence(tx)?;
                table.set_sequence(tx, 1000)?;
                Ok::<_, CoreError>((start, next, table.next_sequence(tx)?))
            })
            .unwrap();
        assert_eq!((start, next, after_set), (0, 1, 1001));
        assert_eq!(store.view(|tx| table.sequence(tx)).unwrap(), 1001);
    }
}
