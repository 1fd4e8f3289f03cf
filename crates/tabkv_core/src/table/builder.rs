//! Table registration.

use super::Table;
use crate::config::TableConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::path::{derive_fields, parse_path, resolve_index_path};
use crate::index::{Index, IndexInfo, KeyFn, MultiIndex, MultiKeyFn, PrimaryKey};
use crate::record::{FnCodec, MarshalFn, RecordCodec, UnmarshalFn};
use std::collections::HashSet;
use tabkv_storage::BucketPath;

struct Pending<F> {
    name: String,
    fields: Option<Vec<String>>,
    callback: F,
}

/// Collects the capabilities of a table and validates them in
/// [`TableBuilder::build`].
///
/// Nothing is checked until `build`, so registration order does not matter.
pub struct TableBuilder<T> {
    bucket: String,
    fields: Vec<String>,
    codec: Option<Box<dyn RecordCodec<T>>>,
    marshal: Option<MarshalFn<T>>,
    unmarshal: Option<UnmarshalFn<T>>,
    primary_keys: Vec<Pending<KeyFn<T>>>,
    indexes: Vec<Pending<KeyFn<T>>>,
    mindexes: Vec<Pending<MultiKeyFn<T>>>,
    config: TableConfig,
}

impl<T> TableBuilder<T> {
    /// Starts a definition for the data bucket at `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            fields: Vec::new(),
            codec: None,
            marshal: None,
            unmarshal: None,
            primary_keys: Vec::new(),
            indexes: Vec::new(),
            mindexes: Vec::new(),
            config: TableConfig::default(),
        }
    }

    /// Declares the record's field names. Index fields must come from this set.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Uses `codec` for record values. Takes precedence over
    /// [`TableBuilder::marshal`] and [`TableBuilder::unmarshal`].
    #[must_use]
    pub fn codec(mut self, codec: impl RecordCodec<T> + 'static) -> Self {
        self.codec = Some(Box::new(codec));
        self
    }

    /// Sets the record serializer.
    #[must_use]
    pub fn marshal<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> CoreResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.marshal = Some(Box::new(f));
        self
    }

    /// Sets the record deserializer.
    #[must_use]
    pub fn unmarshal<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.unmarshal = Some(Box::new(f));
        self
    }

    /// Registers the primary key. `f` returns the record's identity.
    #[must_use]
    pub fn primary_key<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> Vec<u8> + Send + Sync + 'static,
    {
        self.primary_keys.push(Pending {
            name: name.into(),
            fields: None,
            callback: Box::new(f),
        });
        self
    }

    /// Registers a single-valued index with fields derived from its name.
    #[must_use]
    pub fn index<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> Vec<u8> + Send + Sync + 'static,
    {
        self.indexes.push(Pending {
            name: name.into(),
            fields: None,
            callback: Box::new(f),
        });
        self
    }

    /// Registers a single-valued index over explicit fields.
    #[must_use]
    pub fn index_with_fields<I, S, F>(mut self, name: impl Into<String>, fields: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&T) -> Vec<u8> + Send + Sync + 'static,
    {
        self.indexes.push(Pending {
            name: name.into(),
            fields: Some(fields.into_iter().map(Into::into).collect()),
            callback: Box::new(f),
        });
        self
    }

    /// Registers a multi-valued index with fields derived from its name.
    #[must_use]
    pub fn mindex<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> Vec<Vec<u8>> + Send + Sync + 'static,
    {
        self.mindexes.push(Pending {
            name: name.into(),
            fields: None,
            callback: Box::new(f),
        });
        self
    }

    /// Registers a multi-valued index over explicit fields.
    #[must_use]
    pub fn mindex_with_fields<I, S, F>(mut self, name: impl Into<String>, fields: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&T) -> Vec<Vec<u8>> + Send + Sync + 'static,
    {
        self.mindexes.push(Pending {
            name: name.into(),
            fields: Some(fields.into_iter().map(Into::into).collect()),
            callback: Box::new(f),
        });
        self
    }

    /// Overrides the naming conventions and query limits.
    #[must_use]
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the definition and produces the table.
    ///
    /// # Errors
    ///
    /// - [`CoreError::FormatInvalid`] for a malformed bucket or index path, or
    ///   a missing marshal/unmarshal capability
    /// - [`CoreError::IndexNotFound`] if no primary key was registered
    /// - [`CoreError::IndexConflict`] for a second primary key or a repeated
    ///   index name
    /// - [`CoreError::IndexFieldMismatch`] for an empty field list or a field
    ///   outside the declared set
    pub fn build(self) -> CoreResult<Table<T>>
    where
        T: 'static,
    {
        let config = self.config;
        let path = parse_path(&self.bucket, config.path_separator)?;

        let codec: Box<dyn RecordCodec<T>> = match (self.codec, self.marshal, self.unmarshal) {
            (Some(codec), _, _) => codec,
            (None, Some(marshal), Some(unmarshal)) => {
                Box::new(FnCodec::from_boxed(marshal, unmarshal))
            }
            (None, None, _) => return Err(CoreError::format_invalid("marshal")),
            (None, Some(_), None) => return Err(CoreError::format_invalid("unmarshal")),
        };

        let registry = Registry {
            data: &path,
            config: &config,
            declared: &self.fields,
        };

        let mut primaries = self.primary_keys.into_iter();
        let primary = primaries
            .next()
            .ok_or_else(|| CoreError::index_not_found(config.primary_key_prefix))?;
        if let Some(extra) = primaries.next() {
            return Err(CoreError::index_conflict(extra.name));
        }
        let primary = PrimaryKey {
            info: registry.primary(&primary.name)?,
            key: primary.callback,
        };

        let mut seen = HashSet::new();
        let mut indexes = Vec::with_capacity(self.indexes.len());
        for pending in self.indexes {
            let info = registry.index(
                &pending.name,
                pending.fields,
                config.index_prefix,
                &mut seen,
            )?;
            indexes.push(Index {
                info,
                key: pending.callback,
            });
        }
        let mut mindexes = Vec::with_capacity(self.mindexes.len());
        for pending in self.mindexes {
            let info = registry.index(
                &pending.name,
                pending.fields,
                config.mindex_prefix,
                &mut seen,
            )?;
            mindexes.push(MultiIndex {
                info,
                keys: pending.callback,
            });
        }

        tracing::debug!(
            bucket = %path,
            indexes = indexes.len(),
            mindexes = mindexes.len(),
            "table built"
        );

        Ok(Table {
            path,
            fields: self.fields,
            codec,
            primary,
            indexes,
            mindexes,
            config,
        })
    }
}

struct Registry<'a> {
    data: &'a BucketPath,
    config: &'a TableConfig,
    declared: &'a [String],
}

impl Registry<'_> {
    fn primary(&self, name: &str) -> CoreResult<IndexInfo> {
        let leaf = self.leaf(name)?;
        let fields = derive_fields(&leaf, self.config.primary_key_prefix, self.config.field_joiner);
        self.check_fields(&leaf, &fields)?;
        Ok(IndexInfo::new(leaf, fields, self.data.clone()))
    }

    fn index(
        &self,
        name: &str,
        fields: Option<Vec<String>>,
        prefix: &str,
        seen: &mut HashSet<String>,
    ) -> CoreResult<IndexInfo> {
        let declared_path = parse_path(name, self.config.path_separator)?;
        let leaf = self.leaf(name)?;
        if !seen.insert(leaf.clone()) {
            return Err(CoreError::index_conflict(leaf));
        }

        let explicit = fields.is_some();
        let fields =
            fields.unwrap_or_else(|| derive_fields(&leaf, prefix, self.config.field_joiner));
        self.check_fields(&leaf, &fields)?;

        let path = resolve_index_path(self.data, &declared_path, explicit);
        Ok(IndexInfo::new(leaf, fields, path))
    }

    fn leaf(&self, name: &str) -> CoreResult<String> {
        let path = parse_path(name, self.config.path_separator)?;
        path.leaf()
            .map(str::to_string)
            .ok_or_else(|| CoreError::format_invalid(name))
    }

    fn check_fields(&self, index: &str, fields: &[String]) -> CoreResult<()> {
        if fields.is_empty() {
            return Err(CoreError::index_field_mismatch(index, ""));
        }
        match fields.iter().find(|f| !self.declared.contains(f)) {
            Some(field) => Err(CoreError::index_field_mismatch(index, field.as_str())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Item;
    use crate::record::CborCodec;

    fn base() -> TableBuilder<Item> {
        Table::builder("shop/items")
            .fields(["ID", "Kind", "Level", "Tags"])
            .codec(CborCodec::new())
            .primary_key("pk_ID", |i: &Item| i.id.to_be_bytes().to_vec())
    }

    fn noop(_: &Item) -> Vec<u8> {
        Vec::new()
    }

    #[test]
    fn build_minimal_table() {
        let table = base().build().unwrap();
        assert_eq!(table.path().segments(), ["shop", "items"]);
        assert_eq!(table.indexes().count(), 0);
    }

    #[test]
    fn blank_bucket_is_format_invalid() {
        let err = Table::<Item>::builder("  ")
            .codec(CborCodec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::FormatInvalid { .. }));
    }

    #[test]
    fn empty_segment_is_format_invalid() {
        let err = base().index("shop//idx_Kind", noop).build().unwrap_err();
        assert!(matches!(err, CoreError::FormatInvalid { .. }));
    }

    #[test]
    fn missing_primary_key() {
        let err = Table::<Item>::builder("items")
            .fields(["ID"])
            .codec(CborCodec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::IndexNotFound { .. }));
    }

    #[test]
    fn second_primary_key_conflicts() {
        let err = base().primary_key("pk_Kind", noop).build().unwrap_err();
        assert_eq!(err, CoreError::index_conflict("pk_Kind"));
    }

    #[test]
    fn missing_codec_names_capability() {
        let err = Table::<Item>::builder("items")
            .fields(["ID"])
            .primary_key("pk_ID", noop)
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::format_invalid("marshal"));

        let err = Table::<Item>::builder("items")
            .fields(["ID"])
            .marshal(|_: &Item| Ok(Vec::new()))
            .primary_key("pk_ID", noop)
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::format_invalid("unmarshal"));
    }

    #[test]
    fn closure_capabilities_build_a_codec() {
        let table = Table::<Item>::builder("items")
            .fields(["ID"])
            .marshal(|i: &Item| Ok(i.id.to_be_bytes().to_vec()))
            .unmarshal(|bytes: &[u8]| {
                let id = bytes
                    .try_into()
                    .map(u32::from_be_bytes)
                    .map_err(|_| CoreError::record("bad width"))?;
                Ok(Item {
                    id,
                    ..Item::default()
                })
            })
            .primary_key("pk_ID", noop)
            .build()
            .unwrap();

        let bytes = table.codec.marshal(&crate::fixture::item(9, "x", 1, &[])).unwrap();
        assert_eq!(bytes, 9u32.to_be_bytes());
        assert_eq!(table.codec.unmarshal(&bytes).unwrap().id, 9);
        assert!(table.codec.unmarshal(b"\x01").is_err());
    }

    #[test]
    fn duplicate_names_conflict_across_kinds() {
        let err = base()
            .index("idx_Kind", noop)
            .index("idx_Kind", noop)
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::index_conflict("idx_Kind"));

        let err = base()
            .index_with_fields("Tags", ["Tags"], noop)
            .mindex_with_fields("Tags", ["Tags"], |_: &Item| Vec::new())
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::index_conflict("Tags"));
    }

    #[test]
    fn unknown_field_mismatches() {
        let err = base().index("idx_Color", noop).build().unwrap_err();
        assert_eq!(err, CoreError::index_field_mismatch("idx_Color", "Color"));

        let err = base()
            .index_with_fields("by_kind", ["Kind", "Weight"], noop)
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::index_field_mismatch("by_kind", "Weight"));
    }

    #[test]
    fn empty_field_list_mismatches() {
        let err = base().index("idx_", noop).build().unwrap_err();
        assert_eq!(err, CoreError::index_field_mismatch("idx_", ""));

        let err = base()
            .index_with_fields("by_nothing", Vec::<String>::new(), noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::IndexFieldMismatch { .. }));
    }

    #[test]
    fn primary_key_field_is_checked() {
        let err = Table::<Item>::builder("items")
            .fields(["Kind"])
            .codec(CborCodec::new())
            .primary_key("pk_ID", noop)
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::index_field_mismatch("pk_ID", "ID"));
    }

    #[test]
    fn index_paths_resolve() {
        let table = base()
            .index("idx_Kind", noop)
            .index("items/idx_Level", noop)
            .index_with_fields("idx_KL", ["Kind", "Level"], noop)
            .mindex("midx_Tags", |_: &Item| Vec::new())
            .mindex("tags/midx_Tags_Kind", |_: &Item| Vec::new())
            .build()
            .unwrap();

        let path = |name: &str| table.index(name).unwrap().path().to_string();
        assert_eq!(path("idx_Kind"), "shop/items/idx_Kind");
        assert_eq!(path("idx_Level"), "shop/items/idx_Level");
        assert_eq!(path("idx_KL"), "idx_KL");
        assert_eq!(path("midx_Tags"), "shop/items/midx_Tags");
        assert_eq!(path("midx_Tags_Kind"), "tags/midx_Tags_Kind");
        assert_eq!(table.index("midx_Tags_Kind").unwrap().fields(), ["Tags", "Kind"]);
    }

    #[test]
    fn custom_config_changes_naming() {
        let table = Table::<Item>::builder("shop.items")
            .config(TableConfig::new().path_separator('.').index_prefix("ix-").field_joiner('-'))
            .fields(["ID", "Kind", "Level"])
            .codec(CborCodec::new())
            .primary_key("pk_ID", noop)
            .index("ix-Kind-Level", noop)
            .build()
            .unwrap();
        assert_eq!(table.path().segments(), ["shop", "items"]);
        assert_eq!(table.index("ix-Kind-Level").unwrap().fields(), ["Kind", "Level"]);
    }
}
