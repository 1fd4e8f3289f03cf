//! Equality and range queries over indexes.
//!
//! A query names an index and constrains some of its fields. Leading fields
//! constrained by equality become a literal scan prefix; every other
//! constraint is checked against the decoded index entry during the scan.

mod exec;
mod operator;
mod plan;

pub use operator::CompareOp;
pub use plan::{QueryPlan, Residual};

use std::collections::BTreeMap;

/// A query with arbitrary comparisons per field.
///
/// ```
/// use tabkv_core::RangeQuery;
///
/// let q = RangeQuery::new("idx_Type_Status")
///     .eq("Type", "book")
///     .ge("Status", [2u8])
///     .lt("Status", [4u8]);
/// assert_eq!(q.predicates()["Status"].len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeQuery {
    index: String,
    predicates: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl RangeQuery {
    /// Starts a query on the index named `index`.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            predicates: BTreeMap::new(),
        }
    }

    /// Adds `field op value`. The operator is validated when the query runs.
    /// Repeating an operator on a field replaces its value.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.predicates
            .entry(field.into())
            .or_default()
            .insert(op.into(), value.into());
        self
    }

    /// Adds `field = value`.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.filter(field, "=", value)
    }

    /// Adds `field < value`.
    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.filter(field, "<", value)
    }

    /// Adds `field > value`.
    #[must_use]
    pub fn gt(self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.filter(field, ">", value)
    }

    /// Adds `field <= value`.
    #[must_use]
    pub fn le(self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.filter(field, "<=", value)
    }

    /// Adds `field >= value`.
    #[must_use]
    pub fn ge(self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.filter(field, ">=", value)
    }

    /// The index name or path.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Constraints as field, then operator, to value.
    #[must_use]
    pub fn predicates(&self) -> &BTreeMap<String, BTreeMap<String, Vec<u8>>> {
        &self.predicates
    }
}

/// A query with equality constraints only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    index: String,
    equals: BTreeMap<String, Vec<u8>>,
}

impl Query {
    /// Starts a query on the index named `index`.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            equals: BTreeMap::new(),
        }
    }

    /// Requires `field` to equal `value`.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.equals.insert(field.into(), value.into());
        self
    }

    /// The index name or path.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Required field values.
    #[must_use]
    pub fn equals(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.equals
    }
}

impl From<Query> for RangeQuery {
    fn from(query: Query) -> Self {
        query
            .equals
            .into_iter()
            .fold(RangeQuery::new(query.index), |q, (field, value)| {
                q.eq(field, value)
            })
    }
}
