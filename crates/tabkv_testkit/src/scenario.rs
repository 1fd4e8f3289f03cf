//! Running the same scenario on every reference backend.

use std::fmt;
use tabkv_core::{CoreResult, Table};
use tabkv_storage::{FlatBackend, InMemoryBackend, StorageBackend};

/// The reference backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// [`InMemoryBackend`], nested buckets.
    Memory,
    /// [`FlatBackend`], prefix-emulated buckets.
    Flat,
}

impl BackendKind {
    /// Every backend, for looping over in tests.
    pub const ALL: [Self; 2] = [Self::Memory, Self::Flat];
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

enum Inner {
    Memory(InMemoryBackend),
    Flat(FlatBackend),
}

/// A store of either kind behind one read/write interface.
pub struct TestStore {
    inner: Inner,
}

impl TestStore {
    /// Creates an empty store of the given kind.
    #[must_use]
    pub fn new(kind: BackendKind) -> Self {
        let inner = match kind {
            BackendKind::Memory => Inner::Memory(InMemoryBackend::new()),
            BackendKind::Flat => Inner::Flat(FlatBackend::new()),
        };
        Self { inner }
    }

    /// The backend kind.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self.inner {
            Inner::Memory(_) => BackendKind::Memory,
            Inner::Flat(_) => BackendKind::Flat,
        }
    }

    /// Runs `f` in a read-only transaction.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns.
    pub fn read<R>(&self, f: impl FnOnce(&dyn StorageBackend) -> CoreResult<R>) -> CoreResult<R> {
        match &self.inner {
            Inner::Memory(store) => store.view(|tx| f(tx)),
            Inner::Flat(store) => store.view(|tx| f(tx)),
        }
    }

    /// Runs `f` in a read-write transaction, committing on `Ok`.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns; nothing is committed in that case.
    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut dyn StorageBackend) -> CoreResult<R>,
    ) -> CoreResult<R> {
        match &self.inner {
            Inner::Memory(store) => store.update(|tx| f(tx)),
            Inner::Flat(store) => store.update(|tx| f(tx)),
        }
    }
}

/// Creates a store of `kind`, creates the table's data and index buckets and
/// runs `f`.
///
/// # Panics
///
/// Panics if the buckets cannot be created.
pub fn with_table<T, R>(
    kind: BackendKind,
    table: &Table<T>,
    f: impl FnOnce(&TestStore) -> R,
) -> R {
    let store = TestStore::new(kind);
    store
        .write(|tx| {
            table.create_data_bucket(tx)?;
            table.create_index_buckets(tx)
        })
        .expect("create table buckets");
    tracing::debug!(backend = %kind, bucket = %table.path(), "scenario ready");
    f(&store)
}

/// [`with_table`] on the in-memory backend.
pub fn with_memory_table<T, R>(table: &Table<T>, f: impl FnOnce(&TestStore) -> R) -> R {
    with_table(BackendKind::Memory, table, f)
}

/// [`with_table`] on the flat backend.
pub fn with_flat_table<T, R>(table: &Table<T>, f: impl FnOnce(&TestStore) -> R) -> R {
    with_table(BackendKind::Flat, table, f)
}

/// Runs `f` once per reference backend, each time on a fresh store.
pub fn for_each_backend<T>(table: &Table<T>, mut f: impl FnMut(&TestStore)) {
    for kind in BackendKind::ALL {
        with_table(kind, table, &mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{order_table, Order};

    #[test]
    fn stores_report_kind() {
        assert_eq!(TestStore::new(BackendKind::Flat).kind(), BackendKind::Flat);
        assert_eq!(BackendKind::Memory.to_string(), "memory");
    }

    #[test]
    fn scenario_runs_on_both_backends() {
        let table = order_table();
        let mut seen = Vec::new();
        for_each_backend(&table, |store| {
            store
                .write(|tx| table.put(tx, &Order::new(1, "book", 1, "East")))
                .unwrap();
            let found = store.read(|tx| table.gets(tx, b"")).unwrap();
            assert_eq!(found.len(), 1);
            seen.push(store.kind());
        });
        assert_eq!(seen, BackendKind::ALL);
    }

    #[test]
    fn failed_write_is_discarded() {
        let table = order_table();
        with_flat_table(&table, |store| {
            let result: CoreResult<()> = store.write(|tx| {
                table.put(tx, &Order::new(1, "book", 1, "East"))?;
                Err(tabkv_core::CoreError::record("abort"))
            });
            assert!(result.is_err());
            assert!(store.read(|tx| table.gets(tx, b"")).unwrap().is_empty());
        });
    }
}
