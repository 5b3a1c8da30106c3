//! Delimited-text (CSV) splitting.
//!
//! Input is comma-separated with one header line. Quoting is not interpreted, record widths may
//! vary, and both LF and CRLF line endings are accepted. A bare `\r` inside a line is cell
//! content, not a line break.

use std::io::Read;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{RawRow, RawTable, Value};

/// Split CSV bytes into a header line and raw data rows.
///
/// Rules:
///
/// - Lines that are empty after trimming are discarded.
/// - The first remaining line is the header; every later line is one data row.
/// - Headers and cells are trimmed; a row shorter than the header leaves the trailing cells
///   absent ([`Value::Null`]); cells beyond the header width are ignored.
/// - Row numbers count the header as row 1.
///
/// Fails with [`IngestionError::EmptyInput`] when no line remains. A header with no data rows
/// is not an error.
pub fn split_csv_from_bytes(input: &[u8]) -> IngestionResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(b',')
        // Records end at `\n` only; the `\r` of a CRLF ending is removed by the cell trim.
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(input);
    split_csv_from_reader(&mut rdr)
}

/// Split CSV data from an existing reader (which must be configured with `has_headers(false)`).
pub fn split_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<RawTable> {
    let mut lines: Vec<Vec<String>> = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let fields: Vec<String> = record
            .iter()
            .map(|f| String::from_utf8_lossy(f).trim().to_string())
            .collect();
        if fields.len() <= 1 && fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        lines.push(fields);
    }

    let mut lines = lines.into_iter();
    let mut headers = lines.next().ok_or_else(|| IngestionError::EmptyInput {
        message: "csv file contains no data or headers after removing empty lines".to_string(),
    })?;
    if let Some(first) = headers.first_mut() {
        *first = first.trim_start_matches('\u{feff}').trim().to_string();
    }

    let rows = lines
        .enumerate()
        .map(|(idx0, values)| {
            // 1-based for users; +1 again because the header is row 1.
            let number = idx0 + 2;
            let cells = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = values
                        .get(i)
                        .map(|v| Value::Utf8(v.clone()))
                        .unwrap_or(Value::Null);
                    (header.clone(), value)
                })
                .collect();
            RawRow::new(number, cells)
        })
        .collect();

    Ok(RawTable { headers, rows })
}
