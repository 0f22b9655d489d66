use crate::{format_duration, ErrorKind};
use metrics::{increment_counter, register_counter, Counter};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Terminal state of one input URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Skipped,
    Failed(ErrorKind),
}

/// Per-run URL counters.
///
/// Published through the `metrics` facade (a no-op unless a recorder is
/// installed) and mirrored in atomics for the end-of-run summary.
pub struct Metrics {
    urls_read: Counter,
    urls_written: Counter,
    urls_skipped: Counter,
    read: AtomicUsize,
    written: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            urls_read: register_counter!("param_miner_urls_total"),
            urls_written: register_counter!("param_miner_urls_written_total"),
            urls_skipped: register_counter!("param_miner_urls_skipped_total"),
            read: AtomicUsize::new(0),
            written: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_read(&self) {
        self.urls_read.increment(1);
        self.read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: Outcome) {
        match outcome {
            Outcome::Written => {
                self.urls_written.increment(1);
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Skipped => {
                self.urls_skipped.increment(1);
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Failed(kind) => {
                increment_counter!("param_miner_urls_failed_total", "kind" => kind.as_str());
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            read: self.read.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub read: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} URLs processed in {} (written: {}, no parameters: {}, failed: {})",
            self.read,
            format_duration(self.elapsed),
            self.written,
            self.skipped,
            self.failed
        )
    }
}
