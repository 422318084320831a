use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected during an ingestion run
#[derive(Default)]
pub struct IngestStats {
    pub lines_read: AtomicU64,
    pub authors_saved: AtomicU64,
    pub books_saved: AtomicU64,
    pub malformed_lines: AtomicU64,
    pub missing_fields: AtomicU64,
    pub bad_dates: AtomicU64,
    pub unresolved_authors: AtomicU64,
    pub store_read_errors: AtomicU64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_lines(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_authors(&self) {
        self.authors_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_books(&self) {
        self.books_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed(&self) {
        self.malformed_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_missing_fields(&self) {
        self.missing_fields.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_bad_dates(&self) {
        self.bad_dates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_unresolved(&self) {
        self.unresolved_authors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_store_read_errors(&self) {
        self.store_read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lines(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn authors(&self) -> u64 {
        self.authors_saved.load(Ordering::Relaxed)
    }

    pub fn books(&self) -> u64 {
        self.books_saved.load(Ordering::Relaxed)
    }

    pub fn malformed(&self) -> u64 {
        self.malformed_lines.load(Ordering::Relaxed)
    }

    pub fn missing_fields(&self) -> u64 {
        self.missing_fields.load(Ordering::Relaxed)
    }

    pub fn bad_dates(&self) -> u64 {
        self.bad_dates.load(Ordering::Relaxed)
    }

    pub fn unresolved_authors(&self) -> u64 {
        self.unresolved_authors.load(Ordering::Relaxed)
    }

    pub fn store_read_errors(&self) -> u64 {
        self.store_read_errors.load(Ordering::Relaxed)
    }

    /// Lines dropped because of a per-line error
    pub fn skipped(&self) -> u64 {
        self.malformed() + self.missing_fields() + self.bad_dates()
    }
}
