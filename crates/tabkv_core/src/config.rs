//! Table configuration.

/// Naming conventions and query limits for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Separates segments in bucket and index paths.
    pub path_separator: char,

    /// Stripped from single-valued index names when deriving fields.
    pub index_prefix: &'static str,

    /// Stripped from multi-valued index names when deriving fields.
    pub mindex_prefix: &'static str,

    /// Stripped from the primary key name when deriving fields.
    pub primary_key_prefix: &'static str,

    /// Separates field names inside an index name.
    pub field_joiner: char,

    /// Scans returning more index entries than this log a warning.
    pub scan_warning_threshold: usize,

    /// Report each record once per multi-valued index query instead of once
    /// per matching entry.
    pub dedup_multi_results: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path_separator: '/',
            index_prefix: "idx_",
            mindex_prefix: "midx_",
            primary_key_prefix: "pk_",
            field_joiner: '_',
            scan_warning_threshold: 1000,
            dedup_multi_results: false,
        }
    }
}

impl TableConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path separator.
    #[must_use]
    pub const fn path_separator(mut self, separator: char) -> Self {
        self.path_separator = separator;
        self
    }

    /// Sets the single-valued index name prefix.
    #[must_use]
    pub const fn index_prefix(mut self, prefix: &'static str) -> Self {
        self.index_prefix = prefix;
        self
    }

    /// Sets the multi-valued index name prefix.
    #[must_use]
    pub const fn mindex_prefix(mut self, prefix: &'static str) -> Self {
        self.mindex_prefix = prefix;
        self
    }

    /// Sets the primary key name prefix.
    #[must_use]
    pub const fn primary_key_prefix(mut self, prefix: &'static str) -> Self {
        self.primary_key_prefix = prefix;
        self
    }

    /// Sets the field joiner.
    #[must_use]
    pub const fn field_joiner(mut self, joiner: char) -> Self {
        self.field_joiner = joiner;
        self
    }

    /// Sets the scan size above which a warning is logged.
    #[must_use]
    pub const fn scan_warning_threshold(mut self, threshold: usize) -> Self {
        self.scan_warning_threshold = threshold;
        self
    }

    /// Sets whether multi-valued index queries report each record once.
    #[must_use]
    pub const fn dedup_multi_results(mut self, value: bool) -> Self {
        self.dedup_multi_results = value;
        self
    }
}
