//! Running queries and point reads.

use super::plan::QueryPlan;
use super::{Query, RangeQuery};
use crate::error::{CoreError, CoreResult};
use crate::table::Table;
use std::collections::HashSet;
use tabkv_storage::StorageBackend;

impl<T> Table<T> {
    /// Compiles `query` without running it.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`Table::range_query`].
    pub fn plan(&self, query: &RangeQuery) -> CoreResult<QueryPlan> {
        let index = self.find_index(query.index())?;
        QueryPlan::compile(index.info(), query)
    }

    /// Returns the records whose index entries satisfy every constraint, in
    /// index key order.
    ///
    /// Every matching entry yields a record, so a record reached through
    /// several entries of a multi-valued index appears once per entry unless
    /// [`crate::TableConfig::dedup_multi_results`] is on. Index entries
    /// pointing at a missing record are skipped.
    ///
    /// # Errors
    ///
    /// - [`CoreError::IndexNotFound`] for an unknown index (the primary key
    ///   is not queryable)
    /// - [`CoreError::IndexFieldMismatch`] for a field outside the index
    /// - [`CoreError::CompareOperatorInvalid`] for an unknown operator
    /// - storage and codec errors from the scan and record reads
    pub fn range_query<S>(&self, tx: &S, query: &RangeQuery) -> CoreResult<Vec<T>>
    where
        S: StorageBackend + ?Sized,
    {
        let index = self.find_index(query.index())?;
        let info = index.info();
        let plan = QueryPlan::compile(info, query)?;
        tracing::debug!(
            index = info.name(),
            prefix_len = plan.prefix().len(),
            residuals = plan.residuals().len(),
            "query planned"
        );

        let offset = info.offset();
        let filter = |physical: &[u8]| {
            physical
                .get(offset..)
                .is_some_and(|logical| plan.matches(logical))
        };
        let candidates = tx.scan(info.path(), plan.prefix(), &filter)?;
        if candidates.len() > self.config.scan_warning_threshold {
            tracing::warn!(
                index = info.name(),
                candidates = candidates.len(),
                threshold = self.config.scan_warning_threshold,
                "index scan exceeds warning threshold"
            );
        }

        let dedup = index.is_multi() && self.config.dedup_multi_results;
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(candidates.len());
        for entry in candidates {
            let primary_key = entry.value;
            if dedup && !seen.insert(primary_key.clone()) {
                continue;
            }
            match tx.get(&self.path, &primary_key)? {
                Some(bytes) => records.push(self.codec.unmarshal(&bytes)?),
                None => tracing::warn!(
                    index = info.name(),
                    key = ?primary_key,
                    "index entry points at missing record"
                ),
            }
        }

        tracing::debug!(index = info.name(), results = records.len(), "query done");
        Ok(records)
    }

    /// Equality-only form of [`Table::range_query`].
    ///
    /// # Errors
    ///
    /// See [`Table::range_query`].
    pub fn query<S>(&self, tx: &S, query: &Query) -> CoreResult<Vec<T>>
    where
        S: StorageBackend + ?Sized,
    {
        self.range_query(tx, &RangeQuery::from(query.clone()))
    }

    /// Reads the stored version of `record`, found by its primary key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataNotFound`] if nothing is stored under the key.
    pub fn get<S>(&self, tx: &S, record: &T) -> CoreResult<T>
    where
        S: StorageBackend + ?Sized,
    {
        self.get_by_key(tx, &(self.primary.key)(record))
    }

    /// Like [`Table::get`], decoding into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataNotFound`] if nothing is stored under the key.
    pub fn get_into<S>(&self, tx: &S, record: &T, dst: &mut T) -> CoreResult<()>
    where
        S: StorageBackend + ?Sized,
    {
        let key = (self.primary.key)(record);
        let bytes = tx.get(&self.path, &key)?.ok_or(CoreError::DataNotFound)?;
        self.codec.unmarshal_into(&bytes, dst)
    }

    /// Reads the record stored under a raw primary key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataNotFound`] if nothing is stored under the key.
    pub fn get_by_key<S>(&self, tx: &S, key: &[u8]) -> CoreResult<T>
    where
        S: StorageBackend + ?Sized,
    {
        let bytes = tx.get(&self.path, key)?.ok_or(CoreError::DataNotFound)?;
        self.codec.unmarshal(&bytes)
    }

    /// Returns every record whose primary key starts with `prefix`, in
    /// primary key order. An empty prefix returns the whole table.
    ///
    /// # Errors
    ///
    /// Returns an error if the data bucket is missing or a record fails to
    /// unmarshal.
    pub fn gets<S>(&self, tx: &S, prefix: &[u8]) -> CoreResult<Vec<T>>
    where
        S: StorageBackend + ?Sized,
    {
        tx.scan_prefix(&self.path, prefix)?
            .iter()
            .map(|entry| self.codec.unmarshal(&entry.value))
            .collect()
    }
}
