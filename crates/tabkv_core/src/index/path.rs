//! Index naming and bucket placement.

use crate::error::{CoreError, CoreResult};
use tabkv_storage::BucketPath;

/// Parses a bucket or index path, rejecting blank paths and empty segments.
pub(crate) fn parse_path(raw: &str, separator: char) -> CoreResult<BucketPath> {
    let path = BucketPath::parse_with(raw, separator);
    path.validate()
        .map_err(|_| CoreError::format_invalid(raw.trim()))?;
    Ok(path)
}

/// Derives the field list from an index leaf name.
///
/// `idx_Type_Status` with prefix `idx_` and joiner `_` gives
/// `["Type", "Status"]`. A leaf without the prefix is split as a whole.
pub(crate) fn derive_fields(leaf: &str, prefix: &str, joiner: char) -> Vec<String> {
    let rest = leaf.strip_prefix(prefix).unwrap_or(leaf);
    rest.split(joiner)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decides where an index bucket lives relative to the data bucket.
///
/// An index registered by bare name without explicit fields is nested under
/// the data bucket. So is one whose path starts with the data bucket's leaf,
/// in which case the data bucket's parents are prepended. Anything else is a
/// path of its own.
pub(crate) fn resolve_index_path(
    data: &BucketPath,
    index: &BucketPath,
    explicit_fields: bool,
) -> BucketPath {
    let data_leaf = data.leaf().unwrap_or_default();
    let parents = index.parent();
    let nested = match parents.first() {
        Some(first) => first == data_leaf,
        None => !explicit_fields,
    };
    if !nested {
        return index.clone();
    }

    let mut segments: Vec<String> = data.parent().to_vec();
    if parents.is_empty() {
        segments.push(data_leaf.to_string());
    }
    segments.extend(index.segments().iter().cloned());
    BucketPath::from(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> BucketPath {
        BucketPath::parse(s)
    }

    #[test]
    fn derive_fields_strips_prefix() {
        assert_eq!(
            derive_fields("idx_Type_Status_District", "idx_", '_'),
            vec!["Type", "Status", "District"]
        );
        assert_eq!(derive_fields("pk_ID", "pk_", '_'), vec!["ID"]);
        assert_eq!(derive_fields("midx_Tags", "midx_", '_'), vec!["Tags"]);
    }

    #[test]
    fn derive_fields_without_prefix() {
        assert_eq!(derive_fields("byType", "idx_", '_'), vec!["byType"]);
        assert!(derive_fields("idx_", "idx_", '_').is_empty());
    }

    #[test]
    fn bare_name_nests_under_data_bucket() {
        let path = resolve_index_path(&p("root/orders"), &p("idx_Type"), false);
        assert_eq!(path, p("root/orders/idx_Type"));
    }

    #[test]
    fn bare_name_with_fields_is_top_level() {
        let path = resolve_index_path(&p("root/orders"), &p("idx_Type"), true);
        assert_eq!(path, p("idx_Type"));
    }

    #[test]
    fn leading_data_leaf_nests_with_parents() {
        let path = resolve_index_path(&p("root/orders"), &p("orders/idx_Type"), true);
        assert_eq!(path, p("root/orders/idx_Type"));
    }

    #[test]
    fn foreign_parent_is_independent() {
        let path = resolve_index_path(&p("root/orders"), &p("stats/idx_Type"), false);
        assert_eq!(path, p("stats/idx_Type"));
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert_eq!(
            parse_path("  ", '/'),
            Err(CoreError::format_invalid(""))
        );
        assert!(parse_path("a//b", '/').is_err());
        assert_eq!(parse_path("a/b", '/').unwrap(), p("a/b"));
    }
}
