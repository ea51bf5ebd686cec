//! Per-tick interrupts collector.
//!
//! `InterruptsCollector` owns everything that must survive between ticks:
//! the open table reader, the CPU count detected on the first successful
//! read, and the record table whose slots are reused every tick. Each call
//! to `collect()` re-reads `/proc/interrupts`, refills the table and
//! publishes it into a `MetricStore`.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use crate::collector::config::{Config, InterruptsOptions};
use crate::collector::emit::{emit_per_cpu, emit_system};
use crate::collector::procfs::interrupts::InterruptTable;
use crate::collector::procfs::parser::{detect_cpu_count, parse_interrupts};
use crate::collector::procfs::reader::TableReader;
use crate::collector::traits::FileSystem;
use crate::storage::MetricStore;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// The table could not be opened or read.
    Io(std::io::Error),
    /// The table was read but held no lines.
    NoLines,
    /// The header line named no CPU columns.
    NoCpus,
}

impl CollectError {
    /// Whether the failure comes from the file rather than its format.
    pub fn is_transient(&self) -> bool {
        matches!(self, CollectError::Io(_))
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::NoLines => write!(f, "zero lines reported"),
            CollectError::NoCpus => write!(f, "cannot find the number of CPUs"),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Outcome of one tick, as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStatus {
    /// The table was parsed and published.
    Collected,
    /// Nothing was published; try again next tick.
    Retry,
}

/// Timing information for each phase of the last tick.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total tick time.
    pub total: Duration,
    /// Time to read and tokenize the table.
    pub read: Duration,
    /// Time to fill the interrupt records.
    pub parse: Duration,
    /// Time to publish the series.
    pub emit: Duration,
}

/// Collector for `/proc/interrupts`.
pub struct InterruptsCollector<F: FileSystem> {
    fs: F,
    options: InterruptsOptions,
    /// Opened lazily, dropped after a failed read.
    reader: Option<TableReader>,
    /// CPU columns, detected on the first non-empty read.
    cpus: Option<usize>,
    table: InterruptTable,
    /// Consecutive failed ticks.
    failures: u64,
    /// Timing information from the last successful tick.
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem> InterruptsCollector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Source of the per-core and filename options
    /// * `host_prefix` - Prefix of the host's `/proc` ("" for the local one)
    ///
    /// Options are read once, here. Nothing is read from `fs` until the
    /// first `collect()`.
    pub fn new(fs: F, config: &impl Config, host_prefix: &str) -> Self {
        Self::with_options(fs, InterruptsOptions::load(config, host_prefix))
    }

    /// Creates a new collector with already resolved options.
    pub fn with_options(fs: F, options: InterruptsOptions) -> Self {
        debug!(
            filename = %options.filename.display(),
            per_core = options.per_core,
            "interrupts collector configured"
        );
        Self {
            fs,
            options,
            reader: None,
            cpus: None,
            table: InterruptTable::new(),
            failures: 0,
            last_timing: None,
        }
    }

    pub fn options(&self) -> &InterruptsOptions {
        &self.options
    }

    /// Path of the table being collected.
    pub fn filename(&self) -> &Path {
        &self.options.filename
    }

    /// CPU count detected on the first read, if any read succeeded yet.
    pub fn cpus(&self) -> Option<usize> {
        self.cpus
    }

    /// Records filled by the last tick.
    pub fn table(&self) -> &InterruptTable {
        &self.table
    }

    /// Filesystem the collector reads from.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Mutable access to the filesystem, e.g. to change a mock between ticks.
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Returns timing information from the last successful tick.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Runs one tick and publishes the result into `store`.
    ///
    /// # Arguments
    /// * `store` - Where the series are published
    /// * `update_every` - Collection interval in seconds, recorded on new series
    /// * `elapsed` - Time since the previous tick, as measured by the scheduler
    ///
    /// Failures are logged and reported as [`CollectStatus::Retry`]; none of
    /// them is fatal. The first failure of a streak is logged as a warning
    /// or error, the following ones only at debug level.
    pub fn collect<S: MetricStore>(
        &mut self,
        store: &mut S,
        update_every: u32,
        elapsed: Duration,
    ) -> CollectStatus {
        trace!(elapsed_ms = elapsed.as_millis() as u64, "interrupts tick");

        match self.try_collect(store, update_every) {
            Ok(rows) => {
                if self.failures > 0 {
                    info!(
                        failures = self.failures,
                        "{} is readable again",
                        self.options.filename.display()
                    );
                }
                self.failures = 0;
                trace!(rows, timing = ?self.last_timing, "interrupts collected");
                CollectStatus::Collected
            }
            Err(e) => {
                self.failures += 1;
                if self.failures > 1 {
                    debug!(failures = self.failures, "cannot collect interrupts: {}", e);
                } else if e.is_transient() {
                    warn!("cannot read {}: {}", self.options.filename.display(), e);
                } else {
                    error!("cannot parse {}: {}", self.options.filename.display(), e);
                }
                CollectStatus::Retry
            }
        }
    }

    /// Runs one tick, returning the number of interrupts published.
    ///
    /// On error, nothing is published and the detected CPU count and table
    /// capacity are left as they were.
    pub fn try_collect<S: MetricStore>(
        &mut self,
        store: &mut S,
        update_every: u32,
    ) -> Result<usize, CollectError> {
        let total_start = Instant::now();
        let mut timing = CollectorTiming::default();

        let start = Instant::now();
        let reader = match self.reader.take() {
            Some(reader) => reader,
            None => TableReader::open(&self.fs, self.options.filename.clone())?,
        };
        let reader = self.reader.insert(reader);
        if let Err(e) = reader.read_all(&self.fs) {
            // Reopen on the next tick
            self.reader = None;
            return Err(e.into());
        }
        timing.read = start.elapsed();

        let lines = reader.line_count();
        if lines == 0 {
            return Err(CollectError::NoLines);
        }

        let cpus = *self.cpus.get_or_insert_with(|| {
            let cpus = detect_cpu_count(reader.line_words(0));
            info!(cpus, "detected CPU columns in interrupts table");
            cpus
        });
        if cpus == 0 {
            return Err(CollectError::NoCpus);
        }

        let start = Instant::now();
        self.table.ensure_capacity(lines, cpus);
        let rows = parse_interrupts(&mut self.table, reader);
        timing.parse = start.elapsed();

        let start = Instant::now();
        emit_system(store, &self.table, update_every);
        if self.options.per_core {
            emit_per_cpu(store, &self.table, update_every);
        }
        timing.emit = start.elapsed();

        timing.total = total_start.elapsed();
        self.last_timing = Some(timing);

        Ok(rows)
    }
}
