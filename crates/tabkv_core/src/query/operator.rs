//! Comparison operators.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// A byte-wise comparison between an indexed field value and a query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=` or `==`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Parses an operator, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CompareOperatorInvalid`] for anything else.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw.trim() {
            "=" | "==" => Ok(Self::Eq),
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            _ => Err(CoreError::compare_operator_invalid(raw)),
        }
    }

    /// Canonical spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    /// Applies the operator with `actual` on the left.
    #[must_use]
    pub fn matches(self, actual: &[u8], expected: &[u8]) -> bool {
        match self {
            Self::Eq => actual == expected,
            Self::Lt => actual < expected,
            Self::Gt => actual > expected,
            Self::Le => actual <= expected,
            Self::Ge => actual >= expected,
        }
    }
}

impl FromStr for CompareOp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
