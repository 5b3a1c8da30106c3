//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_from_bytes`] (from [`unified`]) which:
//!
//! - detect the format from the file name suffix (`.csv`, `.xlsx`, `.xls`)
//! - split the content, validate headers, and map rows into [`crate::types::MachineRecord`]s
//! - optionally report success/failure/alerts/rejected rows to an [`IngestionObserver`]
//!
//! Format-specific splitting is available under [`csv`] and (feature `excel`) `excel`; row
//! mapping under [`mapper`].

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod mapper;
pub mod observability;
pub mod unified;

pub use mapper::map_row;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use unified::{
    ingest_from_bytes, ingest_from_path, severity_for_error, IngestionFormat, IngestionOptions, IngestionRequest,
};
