//! Tables: a data bucket plus the indexes kept in step with it.

mod buckets;
mod builder;
mod maintain;

pub use builder::TableBuilder;

use crate::config::TableConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::{Index, IndexInfo, IndexRef, MultiIndex, PrimaryKey};
use crate::record::RecordCodec;
use std::fmt;
use tabkv_storage::BucketPath;

/// Records of type `T` stored in one bucket, with their secondary indexes.
///
/// A table holds definitions only. Every operation takes the caller's
/// transaction handle: `&S` for reads and `&mut S` for writes. Nothing is
/// committed or rolled back here.
///
/// ```
/// use tabkv_core::{CoreError, Query, Table};
/// use tabkv_codec::{encode, from_cbor, to_cbor};
/// use tabkv_storage::InMemoryBackend;
///
/// struct Order {
///     id: String,
///     kind: String,
/// }
///
/// let table = Table::<Order>::builder("orders")
///     .fields(["ID", "Type"])
///     .marshal(|o: &Order| Ok(to_cbor(&(&o.id, &o.kind))?))
///     .unmarshal(|b: &[u8]| {
///         let (id, kind): (String, String) = from_cbor(b)?;
///         Ok(Order { id, kind })
///     })
///     .primary_key("pk_ID", |o: &Order| o.id.as_bytes().to_vec())
///     .index("idx_Type", |o: &Order| encode(&[&o.kind]))
///     .build()?;
///
/// let store = InMemoryBackend::new();
/// store.update(|tx| {
///     table.create_data_bucket(tx)?;
///     table.create_index_buckets(tx)?;
///     table.put(tx, &Order { id: "1".into(), kind: "book".into() })
/// })?;
///
/// let books = store.view(|tx| table.query(tx, &Query::new("idx_Type").field("Type", "book")))?;
/// assert_eq!(books.len(), 1);
/// # Ok::<(), CoreError>(())
/// ```
pub struct Table<T> {
    pub(crate) path: BucketPath,
    pub(crate) fields: Vec<String>,
    pub(crate) codec: Box<dyn RecordCodec<T>>,
    pub(crate) primary: PrimaryKey<T>,
    pub(crate) indexes: Vec<Index<T>>,
    pub(crate) mindexes: Vec<MultiIndex<T>>,
    pub(crate) config: TableConfig,
}

impl<T> Table<T> {
    /// Starts a table definition for the data bucket at `bucket`.
    pub fn builder(bucket: impl Into<String>) -> TableBuilder<T> {
        TableBuilder::new(bucket)
    }

    /// The data bucket path.
    #[must_use]
    pub fn path(&self) -> &BucketPath {
        &self.path
    }

    /// Declared record fields.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The configuration the table was built with.
    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The primary key definition.
    #[must_use]
    pub fn primary_key(&self) -> &IndexInfo {
        &self.primary.info
    }

    /// Single-valued indexes in registration order.
    pub fn indexes(&self) -> impl Iterator<Item = &IndexInfo> {
        self.indexes.iter().map(|index| &index.info)
    }

    /// Multi-valued indexes in registration order.
    pub fn mindexes(&self) -> impl Iterator<Item = &IndexInfo> {
        self.mindexes.iter().map(|index| &index.info)
    }

    /// Looks up a single- or multi-valued index by name or path.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexInfo> {
        self.find_index(name).ok().map(IndexRef::info)
    }

    pub(crate) fn find_index(&self, name: &str) -> CoreResult<IndexRef<'_, T>> {
        let path = BucketPath::parse_with(name, self.config.path_separator);
        let leaf = path.leaf().unwrap_or_default();
        if let Some(index) = self.indexes.iter().find(|i| i.info.name() == leaf) {
            return Ok(IndexRef::Single(index));
        }
        if let Some(index) = self.mindexes.iter().find(|i| i.info.name() == leaf) {
            return Ok(IndexRef::Multi(index));
        }
        Err(CoreError::index_not_found(name))
    }

    pub(crate) fn all_index_infos(&self) -> impl Iterator<Item = &IndexInfo> {
        self.indexes().chain(self.mindexes())
    }
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("path", &self.path)
            .field("primary_key", &self.primary.info)
            .field("indexes", &self.indexes().collect::<Vec<_>>())
            .field("mindexes", &self.mindexes().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
