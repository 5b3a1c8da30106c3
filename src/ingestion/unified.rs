//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`] (or [`ingest_from_bytes`] for uploaded content),
//! which runs the whole pipeline for one file:
//!
//! 1. detect the format from the file name suffix (no content sniffing)
//! 2. split the content into a header line and raw data rows
//! 3. validate the headers once against the field schema
//! 4. map every data row, in file order, keeping accepted records and collecting rejections
//!
//! Format and header problems abort the file with a single [`IngestionError`]; row problems only
//! drop their own row. If an [`super::observability::IngestionObserver`] is provided,
//! success/failure/alerts and row rejections are reported to it.

#[cfg(feature = "excel")]
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::schema::validate_headers;
use crate::types::{MachineDataSet, RawTable};

use super::mapper::map_row;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values (`.csv`).
    Csv,
    /// Office Open XML workbook (`.xlsx`).
    Xlsx,
    /// Legacy binary workbook (`.xls`).
    Xls,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Detect the format from a path or file name suffix.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ingest a machine-data file from disk.
///
/// The format is taken from the path suffix before the file is opened, so an unsupported
/// suffix fails with [`IngestionError::UnsupportedFormat`] without touching the file system.
///
/// When an observer is configured, this function reports:
///
/// - `on_row_rejected` for every dropped data row
/// - `on_success` on success, with accepted/rejected row counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// A file whose rows were all rejected (or that has no data rows) is a success with an empty
/// record list; use [`MachineDataSet::require_rows`] to turn that into
/// [`IngestionError::NoValidRows`].
///
/// # Examples
///
/// ```no_run
/// use machine_data_ingest::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), machine_data_ingest::IngestionError> {
/// let ds = ingest_from_path("machines.csv", &IngestionOptions::default())?;
/// println!("{} valid rows found", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<MachineDataSet> {
    let path = path.as_ref();
    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format: IngestionFormat::from_path(path),
    };

    let result = match ctx.format {
        Some(format) => fs::read(path)
            .map_err(IngestionError::from)
            .and_then(|bytes| run_pipeline(format, &bytes, &ctx, options)),
        None => Err(unsupported(path)),
    };

    report_outcome(&ctx, &result, options);
    result
}

/// Ingest file content that is already in memory (e.g. an upload).
///
/// `file_name` is only used for format detection and diagnostics.
///
/// ```
/// use machine_data_ingest::ingestion::{ingest_from_bytes, IngestionOptions};
///
/// let csv = "Machine ID,Temperature,Vibration Level,Pressure,Operating Hours,Last Maintenance (days ago)\n\
///            M-1,95,High,2,1200,70\n";
/// let ds = ingest_from_bytes("upload.csv", csv.as_bytes(), &IngestionOptions::default()).unwrap();
/// assert_eq!(ds.records[0].error_logs, "None");
/// ```
pub fn ingest_from_bytes(
    file_name: &str,
    bytes: &[u8],
    options: &IngestionOptions,
) -> IngestionResult<MachineDataSet> {
    let ctx = IngestionContext {
        path: PathBuf::from(file_name),
        format: IngestionFormat::from_path(file_name),
    };

    let result = match ctx.format {
        Some(format) => run_pipeline(format, bytes, &ctx, options),
        None => Err(unsupported(Path::new(file_name))),
    };

    report_outcome(&ctx, &result, options);
    result
}

fn run_pipeline(
    format: IngestionFormat,
    bytes: &[u8],
    ctx: &IngestionContext,
    options: &IngestionOptions,
) -> IngestionResult<MachineDataSet> {
    let table = split(format, bytes, ctx)?;
    debug!(
        path = %ctx.path.display(),
        headers = ?table.headers,
        data_rows = table.rows.len(),
        "split input"
    );

    validate_headers(&table.headers)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut rejected = Vec::new();
    for row in &table.rows {
        match map_row(row) {
            Ok(record) => records.push(record),
            Err(rejection) => {
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_row_rejected(ctx, &rejection);
                }
                rejected.push(rejection);
            }
        }
    }

    Ok(MachineDataSet {
        headers: table.headers,
        records,
        rejected,
    })
}

fn split(format: IngestionFormat, bytes: &[u8], ctx: &IngestionContext) -> IngestionResult<RawTable> {
    match format {
        IngestionFormat::Csv => super::csv::split_csv_from_bytes(bytes),
        IngestionFormat::Xlsx | IngestionFormat::Xls => split_excel_dispatch(format, bytes, ctx),
    }
}

fn split_excel_dispatch(
    format: IngestionFormat,
    bytes: &[u8],
    ctx: &IngestionContext,
) -> IngestionResult<RawTable> {
    // Avoid unused warnings when the feature is off.
    let _ = (format, bytes, ctx);

    #[cfg(feature = "excel")]
    {
        super::excel::split_excel_from_bytes(bytes, format)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::UnsupportedFormat {
            file: format!(
                "{} (excel ingestion not enabled; enable cargo feature 'excel')",
                ctx.path.display()
            ),
        })
    }
}

fn unsupported(path: &Path) -> IngestionError {
    IngestionError::UnsupportedFormat {
        file: path.display().to_string(),
    }
}

fn report_outcome(
    ctx: &IngestionContext,
    result: &IngestionResult<MachineDataSet>,
    options: &IngestionOptions,
) {
    if let Some(obs) = options.observer.as_ref() {
        match result {
            Ok(ds) => obs.on_success(
                ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    rejected: ds.rejected_count(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }
}

/// Severity used when reporting `e` to an observer.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        IngestionError::Excel(err) => {
            if error_chain_contains_io(err) {
                IngestionSeverity::Critical
            } else {
                IngestionSeverity::Error
            }
        }
        IngestionError::UnsupportedFormat { .. }
        | IngestionError::EmptyInput { .. }
        | IngestionError::MissingRequiredColumns { .. } => IngestionSeverity::Error,
        IngestionError::NoValidRows { .. } => IngestionSeverity::Warning,
    }
}

#[cfg(feature = "excel")]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Owned ingestion request, convenient for queuing one upload at a time.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: IngestionOptions::default(),
        }
    }

    /// Execute the request by calling [`ingest_from_path`].
    pub fn run(&self) -> IngestionResult<MachineDataSet> {
        ingest_from_path(&self.path, &self.options)
    }
}
