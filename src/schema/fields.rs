//! The static machine-data field table.
//!
//! Each [`FieldDescriptor`] keeps its aliases, required flag and parser together; adding a field
//! means adding one entry to [`FIELD_SCHEMA`] (plus its slot on [`crate::types::MachineRecord`]).

use std::fmt;

use crate::types::{MachineRecord, Value, VibrationLevel};

/// Value used for the error-log field when the file has none.
pub const DEFAULT_ERROR_LOGS: &str = "None";

/// Canonical identity of a machine attribute, independent of source spelling.
///
/// Declaration order is processing order and matches [`FIELD_SCHEMA`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    MachineId,
    Temperature,
    VibrationLevel,
    Pressure,
    OperatingHours,
    LastMaintenanceDays,
    ErrorLogs,
}

impl FieldKey {
    /// The schema entry for this key. Variants are declared in [`FIELD_SCHEMA`] order.
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        &FIELD_SCHEMA[*self as usize]
    }
}

/// A successfully parsed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Integer(i64),
    Vibration(VibrationLevel),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Vibration(v) => write!(f, "{v}"),
        }
    }
}

/// Parser for one field: `None` means unparseable.
pub type FieldParser = fn(&Value) -> Option<FieldValue>;

/// Static description of one target field.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub key: FieldKey,
    /// Accepted source headers, most preferred first. Never empty.
    pub aliases: &'static [&'static str],
    pub required: bool,
    pub parse: FieldParser,
    /// Value used when an optional field is absent or unparseable.
    pub default: Option<fn() -> FieldValue>,
}

impl FieldDescriptor {
    /// Preferred name used in every user-facing message about this field.
    pub fn display_name(&self) -> &'static str {
        self.aliases[0]
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("aliases", &self.aliases)
            .field("required", &self.required)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// Every target field, in processing order.
pub static FIELD_SCHEMA: [FieldDescriptor; 7] = [
    FieldDescriptor {
        key: FieldKey::MachineId,
        aliases: &["Machine ID", "Machine_ID", "ID", "Asset ID"],
        required: true,
        parse: parse_machine_id,
        default: None,
    },
    FieldDescriptor {
        key: FieldKey::Temperature,
        aliases: &[
            "Temperature (°C)",
            "Temperature(°C)",
            "Temp C",
            "Temperature C",
            "Temperature_C",
            "Temperature",
        ],
        required: true,
        parse: parse_float_field,
        default: None,
    },
    FieldDescriptor {
        key: FieldKey::VibrationLevel,
        aliases: &["Vibration Level", "Vibration_Level", "Vibration"],
        required: true,
        parse: parse_vibration,
        default: None,
    },
    FieldDescriptor {
        key: FieldKey::Pressure,
        aliases: &[
            "Pressure (bar)",
            "Pressure(bar)",
            "Pressure bar",
            "Pressure_bar",
            "Pressure",
        ],
        required: true,
        parse: parse_float_field,
        default: None,
    },
    FieldDescriptor {
        key: FieldKey::OperatingHours,
        aliases: &["Operating Hours", "Operating_Hours", "Op Hours", "Total Hours"],
        required: true,
        parse: parse_integer_field,
        default: None,
    },
    FieldDescriptor {
        key: FieldKey::LastMaintenanceDays,
        aliases: &[
            "Last Maintenance (days ago)",
            "Last_Maintenance_Days",
            "Last Maintenance Days",
            "Days Since Last Maintenance",
            "Last Maintenance Days Ago",
        ],
        required: true,
        parse: parse_integer_field,
        default: None,
    },
    FieldDescriptor {
        key: FieldKey::ErrorLogs,
        aliases: &["Error Logs", "Error_Logs", "Logs", "Errors", "Faults"],
        required: false,
        parse: parse_error_logs,
        default: Some(default_error_logs),
    },
];

impl MachineRecord {
    /// The typed value of one canonical field.
    pub fn field(&self, key: FieldKey) -> FieldValue {
        match key {
            FieldKey::MachineId => FieldValue::Text(self.machine_id.clone()),
            FieldKey::Temperature => FieldValue::Float(self.temperature),
            FieldKey::VibrationLevel => FieldValue::Vibration(self.vibration_level),
            FieldKey::Pressure => FieldValue::Float(self.pressure),
            FieldKey::OperatingHours => FieldValue::Integer(self.operating_hours),
            FieldKey::LastMaintenanceDays => FieldValue::Integer(self.last_maintenance_days),
            FieldKey::ErrorLogs => FieldValue::Text(self.error_logs.clone()),
        }
    }
}

fn parse_machine_id(raw: &Value) -> Option<FieldValue> {
    let text = raw.as_text()?;
    let id = text.trim();
    (!id.is_empty()).then(|| FieldValue::Text(id.to_string()))
}

fn parse_float_field(raw: &Value) -> Option<FieldValue> {
    parse_float(raw).map(FieldValue::Float)
}

fn parse_integer_field(raw: &Value) -> Option<FieldValue> {
    parse_integer(raw).map(FieldValue::Integer)
}

fn parse_vibration(raw: &Value) -> Option<FieldValue> {
    let text = raw.as_text()?;
    VibrationLevel::from_label(&text).map(FieldValue::Vibration)
}

fn parse_error_logs(raw: &Value) -> Option<FieldValue> {
    let text = raw.as_text()?;
    let logs = text.trim();
    (!logs.is_empty()).then(|| FieldValue::Text(logs.to_string()))
}

fn default_error_logs() -> FieldValue {
    FieldValue::Text(DEFAULT_ERROR_LOGS.to_string())
}

/// Parse a cell as a floating point number.
///
/// Numeric cells are taken as-is; text uses its longest leading numeric prefix (`"95 C"` is
/// `95.0`). Text without a numeric prefix, booleans and NaN are unparseable.
pub fn parse_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Float64(v) => (!v.is_nan()).then_some(*v),
        Value::Int64(i) => Some(*i as f64),
        Value::Utf8(s) => leading_float(s),
        Value::Bool(_) | Value::Null => None,
    }
}

/// Parse a cell as an integer.
///
/// Fractional numeric cells are truncated; text uses its longest leading integer prefix
/// (`"12.7"` is `12`).
pub fn parse_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Int64(i) => Some(*i),
        Value::Float64(v) => v.is_finite().then(|| v.trunc() as i64),
        Value::Utf8(s) => leading_integer(s),
        Value::Bool(_) | Value::Null => None,
    }
}

fn leading_float(text: &str) -> Option<f64> {
    let s = text.trim();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn leading_integer(text: &str) -> Option<i64> {
    let s = text.trim();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_float, parse_integer, FieldKey, FieldValue, DEFAULT_ERROR_LOGS, FIELD_SCHEMA};
    use crate::types::{Value, VibrationLevel};

    fn text(s: &str) -> Value {
        Value::Utf8(s.to_string())
    }

    fn parse(key: FieldKey, raw: &Value) -> Option<FieldValue> {
        (key.descriptor().parse)(raw)
    }

    #[test]
    fn every_descriptor_has_aliases_and_a_unique_key() {
        for (i, d) in FIELD_SCHEMA.iter().enumerate() {
            assert!(!d.aliases.is_empty(), "{:?}", d.key);
            assert!(FIELD_SCHEMA[i + 1..].iter().all(|o| o.key != d.key));
            // Optional fields must carry a default.
            assert!(d.required || d.default.is_some(), "{:?}", d.key);
        }
        assert_eq!(FieldKey::Pressure.descriptor().display_name(), "Pressure (bar)");
    }

    #[test]
    fn descriptor_lookup_returns_the_entry_for_that_key() {
        for key in [
            FieldKey::MachineId,
            FieldKey::Temperature,
            FieldKey::VibrationLevel,
            FieldKey::Pressure,
            FieldKey::OperatingHours,
            FieldKey::LastMaintenanceDays,
            FieldKey::ErrorLogs,
        ] {
            assert_eq!(key.descriptor().key, key);
        }
    }

    #[test]
    fn machine_id_is_trimmed_and_must_be_non_empty() {
        assert_eq!(
            parse(FieldKey::MachineId, &text("  M-1 ")),
            Some(FieldValue::Text("M-1".to_string()))
        );
        assert_eq!(parse(FieldKey::MachineId, &text("   ")), None);
        assert_eq!(parse(FieldKey::MachineId, &Value::Null), None);
        assert_eq!(
            parse(FieldKey::MachineId, &Value::Float64(17.0)),
            Some(FieldValue::Text("17".to_string()))
        );
    }

    #[test]
    fn floats_accept_numeric_cells_and_leading_numeric_text() {
        assert_eq!(parse_float(&text("95")), Some(95.0));
        assert_eq!(parse_float(&text(" -3.5 ")), Some(-3.5));
        assert_eq!(parse_float(&text("2.5e2")), Some(250.0));
        assert_eq!(parse_float(&text("95 C")), Some(95.0));
        assert_eq!(parse_float(&text(".5")), Some(0.5));
        assert_eq!(parse_float(&text("7.")), Some(7.0));
        assert_eq!(parse_float(&text("1e")), Some(1.0));
        assert_eq!(parse_float(&Value::Int64(4)), Some(4.0));
        assert_eq!(parse_float(&Value::Float64(2.25)), Some(2.25));
    }

    #[test]
    fn floats_reject_non_numeric_input() {
        assert_eq!(parse_float(&text("hot")), None);
        assert_eq!(parse_float(&text("")), None);
        assert_eq!(parse_float(&text("NaN")), None);
        assert_eq!(parse_float(&text("-")), None);
        assert_eq!(parse_float(&text(".")), None);
        assert_eq!(parse_float(&Value::Float64(f64::NAN)), None);
        assert_eq!(parse_float(&Value::Bool(true)), None);
        assert_eq!(parse_float(&Value::Null), None);
    }

    #[test]
    fn integers_truncate_and_use_leading_digits() {
        assert_eq!(parse_integer(&text("1200")), Some(1200));
        assert_eq!(parse_integer(&text("12.7")), Some(12));
        assert_eq!(parse_integer(&text("+30 days")), Some(30));
        assert_eq!(parse_integer(&Value::Float64(1200.9)), Some(1200));
        assert_eq!(parse_integer(&Value::Int64(-4)), Some(-4));
        assert_eq!(parse_integer(&text("about 5")), None);
        assert_eq!(parse_integer(&Value::Float64(f64::INFINITY)), None);
        assert_eq!(parse_integer(&text("99999999999999999999")), None);
    }

    #[test]
    fn vibration_is_case_insensitive_and_title_cased() {
        assert_eq!(
            parse(FieldKey::VibrationLevel, &text(" hIGh ")),
            Some(FieldValue::Vibration(VibrationLevel::High))
        );
        assert_eq!(
            parse(FieldKey::VibrationLevel, &text("medium")),
            Some(FieldValue::Vibration(VibrationLevel::Medium))
        );
        assert_eq!(parse(FieldKey::VibrationLevel, &text("extreme")), None);
        assert_eq!(parse(FieldKey::VibrationLevel, &Value::Int64(1)), None);
        assert_eq!(VibrationLevel::Low.to_string(), "Low");
    }

    #[test]
    fn error_logs_fall_back_to_default() {
        let d = FieldKey::ErrorLogs.descriptor();
        assert!(!d.required);
        assert_eq!(
            (d.parse)(&text(" Bearing warning ")),
            Some(FieldValue::Text("Bearing warning".to_string()))
        );
        assert_eq!((d.parse)(&text("  ")), None);
        let default = d.default.map(|f| f());
        assert_eq!(default, Some(FieldValue::Text(DEFAULT_ERROR_LOGS.to_string())));
    }
}
