//! Compiling a range query against an index.

use super::operator::CompareOp;
use super::RangeQuery;
use crate::error::{CoreError, CoreResult};
use crate::index::IndexInfo;
use tabkv_codec::{decode_entry, encode};

/// A comparison checked against one decoded field of each index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residual {
    /// Field name.
    pub field: String,
    /// Position of the field in the index key.
    pub position: usize,
    /// Operator.
    pub op: CompareOp,
    /// Right-hand value.
    pub value: Vec<u8>,
}

impl Residual {
    fn check(&self, segments: &[Vec<u8>]) -> bool {
        segments
            .get(self.position)
            .is_some_and(|actual| self.op.matches(actual, &self.value))
    }
}

/// How a range query runs: a literal scan prefix plus residual comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    index: String,
    field_count: usize,
    prefix: Vec<u8>,
    prefix_fields: usize,
    residuals: Vec<Residual>,
}

impl QueryPlan {
    /// Validates `query` against `info` and splits it into prefix and
    /// residual parts.
    ///
    /// # Errors
    ///
    /// - [`CoreError::IndexFieldMismatch`] if a constrained field is not in
    ///   the index
    /// - [`CoreError::CompareOperatorInvalid`] for an unknown operator
    pub fn compile(info: &IndexInfo, query: &RangeQuery) -> CoreResult<Self> {
        let mut parsed: Vec<Vec<(CompareOp, &[u8])>> = vec![Vec::new(); info.fields().len()];
        for (field, ops) in query.predicates() {
            let position = info
                .position(field)
                .ok_or_else(|| CoreError::index_field_mismatch(info.name(), field.as_str()))?;
            for (op, value) in ops {
                parsed[position].push((CompareOp::parse(op)?, value.as_slice()));
            }
        }

        let mut prefix_values: Vec<&[u8]> = Vec::new();
        let mut residuals = Vec::new();
        let mut partial = false;

        for (position, (field, preds)) in info.fields().iter().zip(&parsed).enumerate() {
            let usable = if partial {
                None
            } else {
                preds
                    .iter()
                    .position(|(op, value)| *op == CompareOp::Eq && !value.is_empty())
            };
            match usable {
                Some(used) => prefix_values.push(preds[used].1),
                None => partial = true,
            }
            for (i, (op, value)) in preds.iter().enumerate() {
                if usable == Some(i) {
                    continue;
                }
                residuals.push(Residual {
                    field: field.clone(),
                    position,
                    op: *op,
                    value: value.to_vec(),
                });
            }
        }

        Ok(Self {
            index: info.name().to_string(),
            field_count: info.fields().len(),
            prefix: encode(&prefix_values),
            prefix_fields: prefix_values.len(),
            residuals,
        })
    }

    /// Name of the index the plan runs on.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Literal key prefix handed to the scan.
    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Number of leading fields covered by the prefix.
    #[must_use]
    pub fn prefix_fields(&self) -> usize {
        self.prefix_fields
    }

    /// Comparisons left for the scan filter.
    #[must_use]
    pub fn residuals(&self) -> &[Residual] {
        &self.residuals
    }

    /// Returns true if the prefix alone answers the query.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.residuals.is_empty()
    }

    /// Checks a logical index entry key (bucket prefix already stripped)
    /// against the residual comparisons.
    ///
    /// Keys that do not decode into the index's fields plus a primary key
    /// are rejected.
    #[must_use]
    pub fn matches(&self, key: &[u8]) -> bool {
        if self.residuals.is_empty() {
            return true;
        }
        let Ok(segments) = decode_entry(key) else {
            return false;
        };
        segments.len() == self.field_count + 1 && self.residuals.iter().all(|r| r.check(&segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabkv_codec::append_terminal;
    use tabkv_storage::BucketPath;

    fn info() -> IndexInfo {
        IndexInfo::new(
            "idx_Type_Status_District",
            vec!["Type".into(), "Status".into(), "District".into()],
            BucketPath::parse("orders/idx_Type_Status_District"),
        )
    }

    fn entry(ty: &str, status: u8, district: &str, pk: &str) -> Vec<u8> {
        append_terminal(
            encode(&[ty.as_bytes(), &[status][..], district.as_bytes()]),
            pk.as_bytes(),
        )
    }

    #[test]
    fn leading_equalities_form_prefix() {
        let q = RangeQuery::new("idx_Type_Status_District")
            .eq("Type", "book")
            .eq("Status", [1u8]);
        let plan = QueryPlan::compile(&info(), &q).unwrap();
        assert_eq!(plan.prefix(), encode(&[&b"book"[..], &[1u8][..]]).as_slice());
        assert_eq!(plan.prefix_fields(), 2);
        assert!(plan.is_exact());
    }

    #[test]
    fn gap_switches_to_partial_mode() {
        let q = RangeQuery::new("idx_Type_Status_District")
            .eq("Type", "book")
            .eq("District", "East");
        let plan = QueryPlan::compile(&info(), &q).unwrap();
        assert_eq!(plan.prefix(), b"book:");
        assert_eq!(plan.residuals().len(), 1);
        assert_eq!(plan.residuals()[0].position, 2);

        assert!(plan.matches(&entry("book", 1, "East", "1")));
        assert!(!plan.matches(&entry("book", 1, "West", "2")));
    }

    #[test]
    fn range_on_first_field_has_no_prefix() {
        let q = RangeQuery::new("idx_Type_Status_District").gt("Type", "b");
        let plan = QueryPlan::compile(&info(), &q).unwrap();
        assert!(plan.prefix().is_empty());
        assert!(plan.matches(&entry("c", 0, "x", "1")));
        assert!(!plan.matches(&entry("a", 0, "x", "1")));
    }

    #[test]
    fn empty_equality_is_residual() {
        let q = RangeQuery::new("idx_Type_Status_District").eq("Type", "");
        let plan = QueryPlan::compile(&info(), &q).unwrap();
        assert!(plan.prefix().is_empty());
        assert_eq!(plan.residuals().len(), 1);
        assert!(plan.matches(&entry("", 3, "x", "1")));
        assert!(!plan.matches(&entry("book", 3, "x", "1")));
    }

    #[test]
    fn extra_comparators_on_prefix_field_are_kept() {
        let q = RangeQuery::new("idx_Type_Status_District")
            .eq("Type", "book")
            .eq("Status", [3u8])
            .ge("Status", [3u8]);
        let plan = QueryPlan::compile(&info(), &q).unwrap();
        assert_eq!(plan.prefix_fields(), 2);
        assert_eq!(plan.residuals().len(), 1);
        assert_eq!(plan.residuals()[0].op, CompareOp::Ge);
    }

    #[test]
    fn malformed_entries_are_rejected() {
        let q = RangeQuery::new("idx_Type_Status_District").eq("District", "East");
        let plan = QueryPlan::compile(&info(), &q).unwrap();
        assert!(!plan.matches(b"book:East"));
        assert!(!plan.matches(b"book:\x01:East:1:extra"));
        assert!(!plan.matches(b"book:\x01:East:1`"));
    }

    #[test]
    fn unknown_field_is_mismatch() {
        let q = RangeQuery::new("idx_Type_Status_District").eq("Color", "red");
        assert_eq!(
            QueryPlan::compile(&info(), &q),
            Err(CoreError::index_field_mismatch("idx_Type_Status_District", "Color"))
        );
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let q = RangeQuery::new("idx_Type_Status_District").filter("Type", "!=", "book");
        assert_eq!(
            QueryPlan::compile(&info(), &q),
            Err(CoreError::compare_operator_invalid("!="))
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn op_strategy() -> impl Strategy<Value = &'static str> {
            prop::sample::select(vec!["=", "==", "<", ">", "<=", ">="])
        }

        proptest! {
            #[test]
            fn residual_filter_agrees_with_direct_comparison(
                ty in "[a-c:`]{0,3}",
                status in any::<u8>(),
                district in "[a-c]{1,2}",
                op in op_strategy(),
                bound in any::<u8>(),
            ) {
                let q = RangeQuery::new("idx_Type_Status_District").filter("Status", op, [bound]);
                let plan = QueryPlan::compile(&info(), &q).unwrap();
                let expected = CompareOp::parse(op).unwrap().matches(&[status], &[bound]);
                prop_assert_eq!(plan.matches(&entry(&ty, status, &district, "pk")), expected);
            }
        }
    }
}
