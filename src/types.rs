//! Core data model types for machine-data ingestion.
//!
//! Raw input flows through [`RawTable`] / [`RawRow`] (original headers, untyped [`Value`] cells)
//! and comes out as validated [`MachineRecord`]s collected in a [`MachineDataSet`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};

/// A single raw scalar as read from a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent cell (e.g. a short delimited-text line).
    Null,
    /// Boolean cell.
    Bool(bool),
    /// 64-bit signed integer cell.
    Int64(i64),
    /// 64-bit float cell.
    Float64(f64),
    /// UTF-8 text cell.
    Utf8(String),
}

impl Value {
    /// Text form of the cell, or `None` when absent.
    ///
    /// Numbers render without a trailing `.0` for integral values.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Utf8(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// One data row keyed by the file's original (non-normalized) headers, in source column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based row number as the end user sees it.
    pub number: usize,
    /// `(original header, cell)` pairs.
    pub cells: Vec<(String, Value)>,
}

impl RawRow {
    pub fn new(number: usize, cells: Vec<(String, Value)>) -> Self {
        Self { number, cells }
    }

    /// Iterate original headers in source order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    /// Find the cell for the first alias that matches one of this row's headers.
    ///
    /// See [`crate::schema::resolve_alias`] for the matching rules.
    pub fn resolve(&self, aliases: &[&str]) -> Option<(&str, &Value)> {
        let idx = crate::schema::resolve_alias(self.headers(), aliases)?;
        self.cells.get(idx).map(|(h, v)| (h.as_str(), v))
    }
}

/// A file split into its header line and data rows, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Headers exactly as detected (trimmed), in source order.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Vibration level, the only enumerated machine attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VibrationLevel {
    Low,
    Medium,
    High,
}

impl VibrationLevel {
    /// Case-insensitive match against `low` / `medium` / `high` (surrounding whitespace ignored).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for VibrationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated machine record.
///
/// The seven canonical fields are typed; columns that matched no known alias are kept verbatim
/// in [`MachineRecord::extra`] under their original header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    pub machine_id: String,
    /// Degrees Celsius.
    pub temperature: f64,
    pub vibration_level: VibrationLevel,
    /// Bar.
    pub pressure: f64,
    pub operating_hours: i64,
    pub last_maintenance_days: i64,
    /// Free text; `"None"` when the file had no value.
    pub error_logs: String,
    /// Passthrough columns.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A data row dropped because a required field was missing or unparseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// 1-based row number as the end user sees it.
    pub row: usize,
    /// Preferred display name of the offending field.
    pub field: String,
    /// Offending raw value (empty when the cell was absent).
    pub raw: String,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: required field '{}' is missing, empty, or has an invalid format (raw value: '{}')",
            self.row, self.field, self.raw
        )
    }
}

/// Result of ingesting one file.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineDataSet {
    /// Headers exactly as detected in the file.
    pub headers: Vec<String>,
    /// Accepted records, in file order.
    pub records: Vec<MachineRecord>,
    /// Rows dropped during mapping, in file order.
    pub rejected: Vec<RowRejection>,
}

impl MachineDataSet {
    /// Number of accepted records.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// First record with the given machine identifier.
    pub fn find(&self, machine_id: &str) -> Option<&MachineRecord> {
        self.records.iter().find(|r| r.machine_id == machine_id)
    }

    /// Accepted records, or [`IngestionError::NoValidRows`] when there are none.
    pub fn require_rows(&self) -> IngestionResult<&[MachineRecord]> {
        if self.records.is_empty() {
            return Err(IngestionError::NoValidRows {
                rejected: self.rejected.len(),
            });
        }
        Ok(&self.records)
    }
}
