//! `machine-data-ingest` turns an operator-supplied spreadsheet or CSV file describing industrial
//! machines into validated, strongly-typed [`types::MachineRecord`]s.
//!
//! The primary entrypoints are [`ingestion::ingest_from_path`] and
//! [`ingestion::ingest_from_bytes`], which pick the format from the file name suffix.
//!
//! ## What you can ingest
//!
//! **File formats (detected by suffix only):**
//!
//! - **CSV**: `.csv` (comma-separated, one header line, LF or CRLF, no quoting)
//! - **Excel** (Cargo feature `excel`, on by default): `.xlsx`, `.xls` (first sheet only)
//!
//! Any other suffix fails with [`IngestionError::UnsupportedFormat`] before the content is read.
//!
//! **Columns.** Seven logical fields, each accepted under several header spellings. Headers are
//! compared after lower-casing and dropping everything but ASCII letters and digits, so
//! `"Temperature (°C)"`, `"temperature_c"` and `"Temp C"` all work:
//!
//! | Field | Required | Example headers |
//! |---|---|---|
//! | machine identifier | yes | `Machine ID`, `Asset ID` |
//! | temperature | yes | `Temperature (°C)`, `Temp C`, `Temperature` |
//! | vibration level | yes | `Vibration Level` (values `Low`/`Medium`/`High`, any case) |
//! | pressure | yes | `Pressure (bar)`, `Pressure` |
//! | operating hours | yes | `Operating Hours`, `Op Hours` |
//! | days since last maintenance | yes | `Last Maintenance (days ago)` |
//! | error log text | no | `Error Logs`, `Faults` (default `"None"`) |
//!
//! Any other column is carried through verbatim in [`types::MachineRecord::extra`].
//!
//! ## Failure model
//!
//! - Unsupported suffix, empty input, or missing required columns abort the file with one
//!   [`IngestionError`]. Missing columns are reported together in a single message.
//! - A row whose required field is missing or unparseable is dropped, logged via `tracing`,
//!   and recorded in [`types::MachineDataSet::rejected`]; ingestion continues.
//! - A file with no usable rows is still a success; [`types::MachineDataSet::require_rows`]
//!   turns it into [`IngestionError::NoValidRows`].
//!
//! ## Quick example
//!
//! ```rust
//! use machine_data_ingest::ingestion::{ingest_from_bytes, IngestionOptions};
//! use machine_data_ingest::types::VibrationLevel;
//!
//! let csv = "Machine ID,Temperature,Vibration Level,Pressure,Operating Hours,Last Maintenance (days ago),Error Logs\n\
//!            M-1,95,High,2,1200,70,Bearing warning detected\n\
//!            M-2,hot,Low,4,500,10,\n";
//!
//! let ds = ingest_from_bytes("machines.csv", csv.as_bytes(), &IngestionOptions::default()).unwrap();
//! assert_eq!(ds.row_count(), 1);
//! assert_eq!(ds.records[0].vibration_level, VibrationLevel::High);
//! assert_eq!(ds.rejected[0].field, "Temperature (°C)");
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified ingestion entrypoints, format splitting, row mapping, observers
//! - [`schema`]: the field table, header normalization and alias resolution
//! - [`types`]: raw and validated data model
//! - [`prediction`]: boundary to the external maintenance-prediction service
//! - [`error`]: error types used across ingestion

pub mod error;
pub mod ingestion;
pub mod prediction;
pub mod schema;
pub mod types;

pub use error::{IngestionError, IngestionResult};
