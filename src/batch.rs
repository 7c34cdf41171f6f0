//! Batch orchestration: expand patterns, shrink files on a bounded worker pool,
//! and collect every outcome.
//!
//! The pool is a Rayon thread pool with exactly `concurrency` threads. Each thread runs
//! one admission loop that pulls the next path from a shared queue, so at most that many
//! files are in flight even when the transform itself uses Rayon: a thread blocked in
//! nested parallel work can steal nested jobs, never another file. The broadcast is the
//! join barrier: `run` never returns before every dispatched file has reported.

use crate::constants::{DEFAULT_CONCURRENCY, PROGRESS_TEMPLATE};
use crate::error::{Result, ShrinkError};
use crate::expand::{expand_patterns, ExpandOptions};
use crate::report::{ShrinkReporter, Totals};
use crate::transform::ImageTransform;
use crate::worker::{shrink_file, ProcessingError, ShrinkResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    concurrency: usize,
    pub recursive: bool,
    pub show_progress: bool,
}

impl BatchOptions {
    /// Zero concurrency is rejected rather than clamped.
    pub fn new(concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(ShrinkError::InvalidConcurrency(concurrency));
        }

        Ok(Self {
            concurrency,
            recursive: false,
            show_progress: false,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            recursive: false,
            show_progress: false,
        }
    }
}

/// Everything a batch produced. Successes are sorted by path.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<ShrinkResult>,
    pub failures: Vec<ProcessingError>,
    pub totals: Totals,
}

impl BatchOutcome {
    fn record(&mut self, outcome: std::result::Result<ShrinkResult, ProcessingError>) {
        match outcome {
            Ok(result) => {
                self.totals.add(&result);
                self.successes.push(result);
            }
            Err(e) => self.failures.push(e),
        }
    }

    fn finish(mut self) -> Self {
        // Plain string order, not component order: "a-b.jpg" sorts before "a/b.jpg".
        // Stable, so duplicate paths keep completion order among themselves.
        self.successes
            .sort_by(|a, b| a.path().as_os_str().cmp(b.path().as_os_str()));
        self.failures
            .sort_by(|a, b| a.path().as_os_str().cmp(b.path().as_os_str()));
        self
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn processed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

pub struct Shrinker {
    options: BatchOptions,
    transform: Arc<dyn ImageTransform>,
    reporter: Box<dyn ShrinkReporter>,
}

impl Shrinker {
    pub fn new(
        options: BatchOptions,
        transform: Arc<dyn ImageTransform>,
        reporter: Box<dyn ShrinkReporter>,
    ) -> Self {
        Self {
            options,
            transform,
            reporter,
        }
    }

    /// Shrinks every file the patterns resolve to and reports the successes.
    ///
    /// Fails only when a pattern is malformed, the pool cannot start, or the report
    /// cannot be written. Per-file failures are counted in the returned outcome and
    /// never abort the batch.
    pub fn run<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<BatchOutcome> {
        let expand_options = ExpandOptions {
            recursive: self.options.recursive,
        };
        let files = expand_patterns(patterns, &expand_options)?;

        debug!("Found {} files to process", files.len());

        if files.is_empty() {
            warn!("No files found matching the provided patterns");
            return Ok(BatchOutcome::default());
        }

        let outcome = self.process_files(files)?;

        if outcome.failure_count() > 0 {
            warn!("Failed to process {} files", outcome.failure_count());
        }

        if !outcome.successes.is_empty() {
            self.reporter.report(&outcome.successes, &outcome.totals)?;
        }

        Ok(outcome)
    }

    /// Runs the worker over `files` with at most `concurrency` files in flight.
    pub fn process_files(&self, files: Vec<PathBuf>) -> Result<BatchOutcome> {
        debug!(
            "Processing with concurrency level: {} ({} transform)",
            self.options.concurrency,
            self.transform.name()
        );

        let progress = self.progress_bar(files.len());
        let transform = self.transform.as_ref();

        let outcome = dispatch(files, self.options.concurrency, |path| {
            debug!("Processing file: {}", path.display());
            let outcome = shrink_file(path, transform);
            if let Err(e) = &outcome {
                error!("Failed to process {}: {}", e.path().display(), e.cause());
            }
            progress.inc(1);
            outcome
        })?;

        progress.finish_and_clear();
        Ok(outcome)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress
    }
}

/// Bounded fan-out over `files`, fan-in of every outcome.
///
/// Each file is handed to `worker` exactly once. The returned outcome holds one entry
/// per file, successes sorted by path.
pub fn dispatch<F>(files: Vec<PathBuf>, concurrency: usize, worker: F) -> Result<BatchOutcome>
where
    F: Fn(PathBuf) -> std::result::Result<ShrinkResult, ProcessingError> + Sync,
{
    if concurrency == 0 {
        return Err(ShrinkError::InvalidConcurrency(concurrency));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .thread_name(|i| format!("img-shrink-worker-{}", i))
        .build()?;

    let queue = Mutex::new(files.into_iter());

    // One admission loop per pool thread; broadcast jobs are never stolen.
    let per_thread = pool.broadcast(|_| {
        let mut outcomes = Vec::new();
        while let Some(path) = next_file(&queue) {
            outcomes.push(worker(path));
        }
        outcomes
    });

    let mut outcome = BatchOutcome::default();
    for result in per_thread.into_iter().flatten() {
        outcome.record(result);
    }

    Ok(outcome.finish())
}

fn next_file(queue: &Mutex<std::vec::IntoIter<PathBuf>>) -> Option<PathBuf> {
    // A panicking worker never holds the lock, so a poisoned queue is still consistent.
    match queue.lock() {
        Ok(mut files) => files.next(),
        Err(poisoned) => poisoned.into_inner().next(),
    }
}
