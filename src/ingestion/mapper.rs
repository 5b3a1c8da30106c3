//! Raw row → [`MachineRecord`] mapping.

use std::collections::BTreeMap;

use tracing::warn;

use crate::schema::{is_known_header, FieldDescriptor, FieldKey, FieldValue, FIELD_SCHEMA};
use crate::types::{MachineRecord, RawRow, RowRejection, Value, VibrationLevel};

/// Map one raw row into a validated record.
///
/// Fields are processed in [`FIELD_SCHEMA`] order. The first required field that is missing or
/// unparseable rejects the whole row (remaining fields are not looked at) and a warning naming
/// the row number, the field's preferred name and the raw value is logged. Optional fields fall
/// back to their default.
///
/// Columns whose header matches no schema alias are copied verbatim into
/// [`MachineRecord::extra`], including a blank header (kept under `""`). For duplicate headers
/// the first column wins.
pub fn map_row(row: &RawRow) -> Result<MachineRecord, RowRejection> {
    let mut partial = PartialRecord::default();

    for descriptor in &FIELD_SCHEMA {
        let raw = row
            .resolve(descriptor.aliases)
            .map(|(_, value)| value)
            .unwrap_or(&Value::Null);

        let value = match (descriptor.parse)(raw) {
            Some(value) => value,
            None if descriptor.required => return Err(reject(row, descriptor, raw)),
            None => match descriptor.default {
                Some(default) => default(),
                None => continue,
            },
        };
        partial.set(descriptor.key, value);
    }

    partial
        .finish(passthrough_columns(row))
        .map_err(|key| reject(row, key.descriptor(), &Value::Null))
}

fn reject(row: &RawRow, descriptor: &FieldDescriptor, raw: &Value) -> RowRejection {
    warn!(
        row = row.number,
        field = descriptor.display_name(),
        raw = %raw,
        "required field is missing, empty, or has an invalid format; skipping row"
    );
    RowRejection {
        row: row.number,
        field: descriptor.display_name().to_string(),
        raw: raw.to_string(),
    }
}

fn passthrough_columns(row: &RawRow) -> BTreeMap<String, Value> {
    let mut extra = BTreeMap::new();
    for (header, value) in &row.cells {
        if is_known_header(header) {
            continue;
        }
        extra
            .entry(header.clone())
            .or_insert_with(|| value.clone());
    }
    extra
}

#[derive(Default)]
struct PartialRecord {
    machine_id: Option<String>,
    temperature: Option<f64>,
    vibration_level: Option<VibrationLevel>,
    pressure: Option<f64>,
    operating_hours: Option<i64>,
    last_maintenance_days: Option<i64>,
    error_logs: Option<String>,
}

impl PartialRecord {
    // Each parser in `FIELD_SCHEMA` yields exactly one shape for its key.
    fn set(&mut self, key: FieldKey, value: FieldValue) {
        match (key, value) {
            (FieldKey::MachineId, FieldValue::Text(s)) => self.machine_id = Some(s),
            (FieldKey::Temperature, FieldValue::Float(v)) => self.temperature = Some(v),
            (FieldKey::VibrationLevel, FieldValue::Vibration(v)) => self.vibration_level = Some(v),
            (FieldKey::Pressure, FieldValue::Float(v)) => self.pressure = Some(v),
            (FieldKey::OperatingHours, FieldValue::Integer(v)) => self.operating_hours = Some(v),
            (FieldKey::LastMaintenanceDays, FieldValue::Integer(v)) => {
                self.last_maintenance_days = Some(v)
            }
            (FieldKey::ErrorLogs, FieldValue::Text(s)) => self.error_logs = Some(s),
            (key, value) => unreachable!("parser for {key:?} produced {value:?}"),
        }
    }

    fn finish(self, extra: BTreeMap<String, Value>) -> Result<MachineRecord, FieldKey> {
        Ok(MachineRecord {
            machine_id: self.machine_id.ok_or(FieldKey::MachineId)?,
            temperature: self.temperature.ok_or(FieldKey::Temperature)?,
            vibration_level: self.vibration_level.ok_or(FieldKey::VibrationLevel)?,
            pressure: self.pressure.ok_or(FieldKey::Pressure)?,
            operating_hours: self.operating_hours.ok_or(FieldKey::OperatingHours)?,
            last_maintenance_days: self
                .last_maintenance_days
                .ok_or(FieldKey::LastMaintenanceDays)?,
            error_logs: self.error_logs.ok_or(FieldKey::ErrorLogs)?,
            extra,
        })
    }
}
