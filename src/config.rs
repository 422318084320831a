use std::path::PathBuf;

/// Namespace prefix carried by author keys (`/authors/OL1A`)
pub const AUTHOR_KEY_PREFIX: &str = "/authors/";

/// Namespace prefix carried by work keys (`/works/OL1W`)
pub const WORK_KEY_PREFIX: &str = "/works/";

/// Placeholder for values that are structurally absent from the dump
pub const NOT_AVAILABLE: &str = "NA";

/// `created.value` layout, e.g. `2009-12-11T01:57:19.964652`
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f";

/// Lines mapped in parallel before their entities are persisted in order
pub const BATCH_LINES: usize = 1024;

/// Progress update interval (tick every N lines)
pub const PROGRESS_INTERVAL: u64 = 1000;

pub const DEFAULT_BOLT_URI: &str = "bolt://localhost:7687";
pub const STORE_MAX_RETRIES: u32 = 30;
pub const STORE_RETRY_DELAY_SECS: u64 = 2;

/// Inputs for a single ingestion run. A `None` dump skips that phase.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    pub author_dump: Option<PathBuf>,
    pub work_dump: Option<PathBuf>,
    /// Stop each phase after this many lines (for testing)
    pub limit: Option<u64>,
}

impl LoaderConfig {
    pub fn new(author_dump: Option<PathBuf>, work_dump: Option<PathBuf>) -> Self {
        Self {
            author_dump,
            work_dump,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }
}
