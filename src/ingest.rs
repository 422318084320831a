use crate::author::map_author;
use crate::config::{LoaderConfig, BATCH_LINES, PROGRESS_INTERVAL};
use crate::error::{Error, Result};
use crate::models::Author;
use crate::reader::{extract_json, DumpReader};
use crate::resolve::AuthorResolver;
use crate::stats::IngestStats;
use crate::store::Store;
use crate::work::{parse_work, WorkRecord};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where a run currently is. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    NotStarted,
    IngestingAuthors,
    IngestingWorks,
    Done,
}

/// Outcome of each requested phase. `None` means the phase had no input configured.
#[derive(Debug, Default)]
pub struct RunReport {
    pub authors: Option<Result<u64>>,
    pub works: Option<Result<u64>>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        [&self.authors, &self.works]
            .into_iter()
            .all(|phase| !matches!(phase, Some(Err(_))))
    }
}

/// Drives a full pass: every author line is persisted before any work line is read.
pub struct Ingestor<'a, S> {
    config: LoaderConfig,
    store: &'a S,
    stats: IngestStats,
    phase: Phase,
}

impl<'a, S: Store> Ingestor<'a, S> {
    pub fn new(config: LoaderConfig, store: &'a S) -> Self {
        Self {
            config,
            store,
            stats: IngestStats::new(),
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Runs the authors phase, then the works phase. A phase that fails to open
    /// its file or write to the store is reported without stopping the other.
    pub async fn run(&mut self) -> RunReport {
        let mut report = RunReport::default();

        if let Some(path) = self.config.author_dump.clone() {
            let result = self.ingest_authors(&path).await;
            if let Err(e) = &result {
                error!(file = %path.display(), error = %e, "Author ingestion aborted");
            }
            report.authors = Some(result);
        }

        if let Some(path) = self.config.work_dump.clone() {
            let result = self.ingest_works(&path).await;
            if let Err(e) = &result {
                error!(file = %path.display(), error = %e, "Work ingestion aborted");
            }
            report.works = Some(result);
        }

        self.phase = Phase::Done;
        report
    }

    /// Persists every mappable author line. Returns the number of authors saved.
    pub async fn ingest_authors(&mut self, path: &Path) -> Result<u64> {
        self.advance(Phase::IngestingAuthors);
        let mut reader = DumpReader::open(path)?;
        info!(file = %path.display(), "Ingesting authors");

        let pb = make_spinner("authors");
        let mut saved = 0u64;

        while let Some(chunk) = self.next_chunk(&mut reader, &pb)? {
            let mapped: Vec<(u64, Result<Author>)> = chunk
                .par_iter()
                .map(|(line_no, line)| {
                    (*line_no, extract_json(line).map(|record| map_author(&record)))
                })
                .collect();

            for (line_no, result) in mapped {
                match result {
                    Ok(author) => {
                        self.store.save_author(&author).await?;
                        self.stats.inc_authors();
                        saved += 1;
                    }
                    Err(e) => self.skip_line(reader.path(), line_no, &e),
                }
            }
        }

        pb.finish_and_clear();
        info!(saved, skipped = self.stats.skipped(), "Author ingestion complete");
        Ok(saved)
    }

    /// Persists every mappable work line, resolving author names against the
    /// store as each book is built. Returns the number of books saved.
    pub async fn ingest_works(&mut self, path: &Path) -> Result<u64> {
        self.advance(Phase::IngestingWorks);
        let mut reader = DumpReader::open(path)?;
        info!(file = %path.display(), "Ingesting works");

        let pb = make_spinner("works");
        let resolver = AuthorResolver::new(self.store, &self.stats);
        let mut saved = 0u64;

        while let Some(chunk) = self.next_chunk(&mut reader, &pb)? {
            let parsed: Vec<(u64, Result<WorkRecord>)> = chunk
                .par_iter()
                .map(|(line_no, line)| {
                    (*line_no, extract_json(line).and_then(|record| parse_work(&record)))
                })
                .collect();

            for (line_no, result) in parsed {
                match result {
                    Ok(work) => {
                        let book = work.resolve(&resolver).await;
                        debug_assert_eq!(book.author_names.len(), book.author_ids.len());
                        self.store.save_book(&book).await?;
                        self.stats.inc_books();
                        saved += 1;
                    }
                    Err(e) => self.skip_line(reader.path(), line_no, &e),
                }
            }
        }

        pb.finish_and_clear();
        info!(
            saved,
            skipped = self.stats.skipped(),
            unresolved_authors = self.stats.unresolved_authors(),
            "Work ingestion complete"
        );
        Ok(saved)
    }

    fn advance(&mut self, next: Phase) {
        if next < self.phase {
            warn!(from = ?self.phase, to = ?next, "Phase started out of order");
        }
        self.phase = next;
    }

    /// Reads up to `BATCH_LINES` lines, honouring the configured line limit.
    /// Returns `None` once the file (or the limit) is exhausted. Lines that are
    /// not valid UTF-8 are counted as malformed and left out of the chunk.
    fn next_chunk(
        &self,
        reader: &mut DumpReader,
        pb: &ProgressBar,
    ) -> Result<Option<Vec<(u64, String)>>> {
        let mut chunk = Vec::with_capacity(BATCH_LINES);
        let mut consumed = 0usize;

        while consumed < BATCH_LINES {
            if let Some(limit) = self.config.limit {
                if reader.lines_read() >= limit {
                    break;
                }
            }
            let Some((line_no, line)) = reader.next() else {
                break;
            };

            consumed += 1;
            self.stats.inc_lines();
            if line_no % PROGRESS_INTERVAL == 0 {
                pb.set_position(line_no);
            }

            match line {
                Ok(line) => chunk.push((line_no, line)),
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(file = %reader.path().display(), line = line_no, error = %e, "Skipping line");
                    self.stats.inc_malformed();
                }
                Err(source) => {
                    return Err(Error::FileAccess {
                        path: reader.path().to_path_buf(),
                        source,
                    });
                }
            }
        }

        Ok((consumed > 0).then_some(chunk))
    }

    fn skip_line(&self, path: &Path, line_no: u64, err: &Error) {
        warn!(file = %path.display(), line = line_no, error = %err, "Skipping line");
        match err {
            Error::MalformedLine(_) => self.stats.inc_malformed(),
            Error::RequiredFieldMissing(_) => self.stats.inc_missing_fields(),
            Error::DateParse { .. } => self.stats.inc_bad_dates(),
            other => debug!(error = %other, "Unexpected error kind at line boundary"),
        }
    }
}

fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} {pos} lines")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(label.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::NotStarted < Phase::IngestingAuthors);
        assert!(Phase::IngestingAuthors < Phase::IngestingWorks);
        assert!(Phase::IngestingWorks < Phase::Done);
    }

    #[test]
    fn spinner_carries_phase_label() {
        let pb = make_spinner("works");
        assert_eq!(pb.message(), "works");
        pb.finish_and_clear();
    }

    #[test]
    fn report_without_phases_is_success() {
        assert!(RunReport::default().is_success());
    }

    #[test]
    fn report_with_failed_phase_is_failure() {
        let report = RunReport {
            authors: Some(Err(Error::MalformedLine("x".into()))),
            works: Some(Ok(3)),
        };
        assert!(!report.is_success());
    }
}
