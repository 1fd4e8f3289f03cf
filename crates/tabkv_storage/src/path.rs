//! Bucket paths.

use crate::error::{StorageError, StorageResult};
use std::fmt;

/// An ordered sequence of path segments naming a bucket.
///
/// Hierarchical backends nest one bucket per segment. Flat backends fold the
/// whole path into a key prefix. Either way the path is compared and displayed
/// segment by segment, joined by [`BucketPath::SEPARATOR`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketPath(Vec<String>);

impl BucketPath {
    /// Default separator between segments in the string form.
    pub const SEPARATOR: char = '/';

    /// Creates a path from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses `"root/to/bucket"` using the default separator.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::parse_with(path, Self::SEPARATOR)
    }

    /// Parses a path using a custom separator.
    ///
    /// Surrounding whitespace is trimmed. A blank string yields an empty path.
    #[must_use]
    pub fn parse_with(path: &str, separator: char) -> Self {
        let path = path.trim();
        if path.is_empty() {
            return Self::default();
        }
        Self(path.split(separator).map(str::to_string).collect())
    }

    /// Returns the segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the last segment.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns every segment but the last.
    #[must_use]
    pub fn parent(&self) -> &[String] {
        match self.0.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Checks that the path is non-empty and has no empty segment.
    pub fn validate(&self) -> StorageResult<()> {
        if self.0.is_empty() {
            return Err(StorageError::invalid_path("empty bucket name"));
        }
        if self.0.iter().any(|s| s.is_empty()) {
            return Err(StorageError::invalid_path(format!(
                "empty segment in [{self}]"
            )));
        }
        Ok(())
    }

    /// Joins the segments with `separator`.
    #[must_use]
    pub fn join(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for BucketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(Self::SEPARATOR))
    }
}

impl From<&str> for BucketPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<Vec<String>> for BucketPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}
