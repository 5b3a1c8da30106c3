use std::collections::BTreeMap;

use machine_data_ingest::ingestion::csv::{split_csv_from_bytes, split_csv_from_reader};
use machine_data_ingest::ingestion::{ingest_from_bytes, ingest_from_path, map_row, IngestionOptions};
use machine_data_ingest::types::{Value, VibrationLevel};
use machine_data_ingest::IngestionError;

fn opts() -> IngestionOptions {
    IngestionOptions::default()
}

#[test]
fn ingest_csv_basic_file() {
    let ds = ingest_from_path("tests/fixtures/machines.csv", &opts()).unwrap();

    assert_eq!(ds.row_count(), 2);
    assert!(ds.rejected.is_empty());

    let m1 = ds.find("M-1").unwrap();
    assert_eq!(m1.temperature, 95.0);
    assert_eq!(m1.vibration_level, VibrationLevel::High);
    assert_eq!(m1.pressure, 2.0);
    assert_eq!(m1.operating_hours, 1200);
    assert_eq!(m1.last_maintenance_days, 70);
    assert_eq!(m1.error_logs, "Bearing warning detected");

    let m2 = ds.find("M-2").unwrap();
    assert_eq!(m2.vibration_level, VibrationLevel::Low);
    assert_eq!(m2.error_logs, "None");
}

#[test]
fn ingest_csv_drops_bad_rows_and_keeps_the_rest() {
    let ds = ingest_from_path("tests/fixtures/machines_mixed.csv", &opts()).unwrap();

    let ids: Vec<&str> = ds.records.iter().map(|r| r.machine_id.as_str()).collect();
    assert_eq!(ids, vec!["M-10", "M-12"]);

    assert_eq!(ds.rejected.len(), 2);
    assert_eq!(ds.rejected[0].row, 3);
    assert_eq!(ds.rejected[0].field, "Temperature (°C)");
    assert_eq!(ds.rejected[0].raw, "hot");
    // The blank line is discarded before rows are numbered.
    assert_eq!(ds.rejected[1].row, 5);
    assert_eq!(ds.rejected[1].field, "Vibration Level");
    assert_eq!(ds.rejected[1].raw, "vibrating");

    let m12 = ds.find("M-12").unwrap();
    assert_eq!(m12.vibration_level, VibrationLevel::Low);
    assert_eq!(m12.error_logs, "None");
    assert_eq!(m12.pressure, 4.1);
}

#[test]
fn ingest_csv_passthrough_equals_extra_columns() {
    let ds = ingest_from_path("tests/fixtures/machines_mixed.csv", &opts()).unwrap();

    let expected: BTreeMap<String, Value> =
        [("Location".to_string(), Value::Utf8("Hall 1".to_string()))].into_iter().collect();
    assert_eq!(ds.records[0].extra, expected);
}

#[test]
fn ingest_csv_resolves_alias_headers() {
    let ds = ingest_from_path("tests/fixtures/machines_aliases.csv", &opts()).unwrap();

    assert_eq!(ds.row_count(), 2);
    let a2 = ds.find("A-2").unwrap();
    assert_eq!(a2.temperature, 101.0);
    assert_eq!(a2.vibration_level, VibrationLevel::High);
    assert_eq!(a2.operating_hours, 2100);
    assert_eq!(a2.last_maintenance_days, 95);
    assert_eq!(a2.error_logs, "Pump cavitation");
    assert!(a2.extra.is_empty());
    assert_eq!(ds.find("A-1").unwrap().error_logs, "None");
}

#[test]
fn ingest_csv_reports_every_missing_column_at_once() {
    let err = ingest_from_path("tests/fixtures/machines_missing_columns.csv", &opts()).unwrap_err();
    match &err {
        IngestionError::MissingRequiredColumns { missing, detected } => {
            assert_eq!(missing.len(), 4);
            assert_eq!(detected, &vec!["Machine ID", "Vibration Level", "Error Logs"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let msg = err.to_string();
    for name in [
        "Temperature (°C)",
        "Pressure (bar)",
        "Operating Hours",
        "Last Maintenance (days ago)",
    ] {
        assert!(msg.contains(name), "{msg}");
    }
}

#[test]
fn ingest_csv_header_only_is_empty_not_error() {
    let ds = ingest_from_path("tests/fixtures/machines_header_only.csv", &opts()).unwrap();
    assert_eq!(ds.row_count(), 0);
    assert!(matches!(
        ds.require_rows(),
        Err(IngestionError::NoValidRows { rejected: 0 })
    ));
}

#[test]
fn ingest_csv_all_rows_rejected_is_no_valid_rows() {
    let input = "Machine ID,Temperature,Vibration Level,Pressure,Operating Hours,Last Maintenance (days ago)\n\
                 ,95,High,2,1200,70\n\
                 M-2,95,High,2,lots,70\n";
    let ds = ingest_from_bytes("machines.csv", input.as_bytes(), &opts()).unwrap();
    assert_eq!(ds.row_count(), 0);
    assert_eq!(ds.rejected_count(), 2);
    let err = ds.require_rows().unwrap_err();
    assert!(err.to_string().contains("no valid machine data"));
}

#[test]
fn ingest_csv_same_file_twice_is_deep_equal() {
    let a = ingest_from_path("tests/fixtures/machines_mixed.csv", &opts()).unwrap();
    let b = ingest_from_path("tests/fixtures/machines_mixed.csv", &opts()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn ingest_csv_empty_file_is_empty_input() {
    let err = ingest_from_bytes("empty.csv", b"\n  \n", &opts()).unwrap_err();
    assert!(matches!(err, IngestionError::EmptyInput { .. }));
}

#[test]
fn split_and_map_from_custom_reader() {
    let input = "ID;Temperature;Vibration;Pressure;Total Hours;Last Maintenance Days\nX-9;50;medium;3;10;1\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let table = split_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(table.headers.len(), 6);

    let record = map_row(&table.rows[0]).unwrap();
    assert_eq!(record.machine_id, "X-9");
    assert_eq!(record.vibration_level, VibrationLevel::Medium);
}

#[test]
fn split_keeps_extra_cells_out_of_rows() {
    let table = split_csv_from_bytes(b"a,b\n1,2,3\n").unwrap();
    assert_eq!(table.rows[0].cells.len(), 2);
}

const HEADER: &str =
    "Machine ID,Temperature (°C),Vibration Level,Pressure (bar),Operating Hours,Last Maintenance (days ago),Error Logs";

#[test]
fn ingest_csv_stray_carriage_return_does_not_split_the_row() {
    let input = format!("{HEADER}\r\nM-1,95,High,2,1200,70,Bearing\rwarning\r\nM-2,70,Low,4,500,10,\r\n");
    let ds = ingest_from_bytes("machines.csv", input.as_bytes(), &opts()).unwrap();

    assert_eq!(ds.row_count(), 2);
    assert!(ds.rejected.is_empty());
    assert_eq!(ds.find("M-1").unwrap().error_logs, "Bearing\rwarning");
    assert_eq!(ds.find("M-2").unwrap().error_logs, "None");
}

#[test]
fn ingest_csv_blank_header_column_passes_through() {
    let input = format!("{HEADER},\nM-1,95,High,2,1200,70,x,extra-cell\n");
    let ds = ingest_from_bytes("machines.csv", input.as_bytes(), &opts()).unwrap();

    let m1 = ds.find("M-1").unwrap();
    assert_eq!(m1.error_logs, "x");
    assert_eq!(m1.extra.get(""), Some(&Value::Utf8("extra-cell".to_string())));
    assert_eq!(m1.extra.len(), 1);
}

#[test]
fn ingest_csv_integer_beyond_i64_rejects_the_row() {
    let input = format!("{HEADER}\nM-1,95,High,2,99999999999999999999,70,\nM-2,70,Low,4,500,10,\n");
    let ds = ingest_from_bytes("machines.csv", input.as_bytes(), &opts()).unwrap();

    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.rejected[0].row, 2);
    assert_eq!(ds.rejected[0].field, "Operating Hours");
    assert_eq!(ds.rejected[0].raw, "99999999999999999999");
}
