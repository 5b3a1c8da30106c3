//! Outcome reporting for one ingestion attempt.
//!
//! The pipeline calls an [`IngestionObserver`] once per dropped row and once more when the file
//! finishes (success, failure, and optionally an alert).

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::error::IngestionError;
use crate::types::RowRejection;

use super::unified::IngestionFormat;

/// How bad a failed ingestion is. Ordered, so it can be compared against an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    Info,
    /// Usable outcome that still needs attention, such as a file without valid rows.
    Warning,
    /// The file itself was unusable: bad suffix, no header, missing columns.
    Error,
    /// The file could not be read at all.
    Critical,
}

/// Which file an event is about.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Path on disk, or the uploaded file name.
    pub path: PathBuf,
    /// `None` when the suffix was not recognized.
    pub format: Option<IngestionFormat>,
}

/// Row counts for a finished file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub rows: usize,
    pub rejected: usize,
}

/// Receives ingestion events. Every method has a no-op default.
pub trait IngestionObserver: Send + Sync {
    /// The file was ingested; `stats.rows` may be zero.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// A failure at or above `IngestionOptions::alert_at_or_above`. Sent after `on_failure`.
    ///
    /// Forwards to [`Self::on_failure`] unless overridden.
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }

    /// A data row was dropped; ingestion of the file continues.
    fn on_row_rejected(&self, _ctx: &IngestionContext, _rejection: &RowRejection) {}
}

/// Forwards every event to each inner observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    inner: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(inner: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { inner }
    }

    fn each(&self, f: impl Fn(&dyn IngestionObserver)) {
        self.inner.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("inner", &self.inner.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }

    fn on_row_rejected(&self, ctx: &IngestionContext, rejection: &RowRejection) {
        self.each(|o| o.on_row_rejected(ctx, rejection));
    }
}

/// Emits file outcomes as `tracing` events.
///
/// Rejected rows are not repeated here; the row mapper already warns about each one.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        info!(
            format = ?ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            rejected = stats.rejected,
            "ingestion finished"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        warn!(?severity, format = ?ctx.format, path = %ctx.path.display(), %error, "ingestion failed");
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        error!(?severity, format = ?ctx.format, path = %ctx.path.display(), %error, "ingestion alert");
    }
}

/// Appends one line per event to a log file: `<unix secs> <kind> path=<path> <detail>`.
///
/// The file is opened per event. A log that cannot be written is skipped silently so reporting
/// never fails an ingestion.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn record(&self, kind: &str, ctx: &IngestionContext, detail: fmt::Arguments<'_>) {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{secs} {kind} path={} {detail}", ctx.path.display());
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.record(
            "ok",
            ctx,
            format_args!("rows={} rejected={}", stats.rows, stats.rejected),
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record("fail", ctx, format_args!("severity={severity:?} err={error}"));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record("ALERT", ctx, format_args!("severity={severity:?} err={error}"));
    }

    fn on_row_rejected(&self, ctx: &IngestionContext, rejection: &RowRejection) {
        self.record("skip", ctx, format_args!("{rejection}"));
    }
}
