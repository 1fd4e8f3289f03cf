//! Index definitions.
//!
//! A table has one primary key, any number of single-valued indexes (one
//! entry per record) and multi-valued indexes (one entry per fragment the
//! callback returns). Every index entry key is the callback's fragment with
//! the primary key appended, and its value is the primary key.

mod info;
pub(crate) mod path;

pub use info::IndexInfo;

/// Callback returning one key fragment per record.
///
/// For indexes the fragment is an encoded field list, see
/// [`tabkv_codec::encode`] and [`tabkv_codec::KeyEncoder`]. For the primary
/// key it is the raw identity.
pub type KeyFn<T> = Box<dyn Fn(&T) -> Vec<u8> + Send + Sync>;

/// Callback returning any number of key fragments per record.
pub type MultiKeyFn<T> = Box<dyn Fn(&T) -> Vec<Vec<u8>> + Send + Sync>;

/// The primary key definition.
pub(crate) struct PrimaryKey<T> {
    pub(crate) info: IndexInfo,
    pub(crate) key: KeyFn<T>,
}

/// A single-valued index.
pub(crate) struct Index<T> {
    pub(crate) info: IndexInfo,
    pub(crate) key: KeyFn<T>,
}

/// A multi-valued index.
pub(crate) struct MultiIndex<T> {
    pub(crate) info: IndexInfo,
    pub(crate) keys: MultiKeyFn<T>,
}

/// Borrowed view of a registered index, as found by name.
pub(crate) enum IndexRef<'a, T> {
    Single(&'a Index<T>),
    Multi(&'a MultiIndex<T>),
}

impl<T> Clone for IndexRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IndexRef<'_, T> {}

impl<'a, T> IndexRef<'a, T> {
    pub(crate) fn info(self) -> &'a IndexInfo {
        match self {
            Self::Single(index) => &index.info,
            Self::Multi(index) => &index.info,
        }
    }

    pub(crate) fn is_multi(self) -> bool {
        matches!(self, Self::Multi(_))
    }
}
