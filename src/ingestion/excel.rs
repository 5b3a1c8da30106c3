#![cfg(feature = "excel")]

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Sheets, Xls, Xlsx};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{RawRow, RawTable, Value};

use super::unified::IngestionFormat;

/// Split a spreadsheet held in memory into a header line and raw data rows.
///
/// `format` selects the binary variant (`Xls` for legacy `.xls`, anything else is read as
/// `.xlsx`); the content is not sniffed.
pub fn split_excel_from_bytes(bytes: &[u8], format: IngestionFormat) -> IngestionResult<RawTable> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Sheets<Cursor<&[u8]>> = match format {
        IngestionFormat::Xls => Sheets::Xls(Xls::new(cursor).map_err(calamine::Error::from)?),
        _ => Sheets::Xlsx(Xlsx::new(cursor).map_err(calamine::Error::from)?),
    };
    split_first_sheet(&mut workbook)
}

/// Behavior:
/// - Uses the first sheet only
/// - Detects the first non-empty row as the header row
/// - Skips fully blank data rows; empty cells become empty strings
/// - Row numbers are the sheet's own 1-based row numbers
fn split_first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> IngestionResult<RawTable> {
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestionError::EmptyInput {
            message: "excel file contains no sheets".to_string(),
        })?;
    let range = workbook.worksheet_range(&sheet)?;
    split_sheet_range(&sheet, &range)
}

fn split_sheet_range(sheet: &str, range: &Range<Data>) -> IngestionResult<RawTable> {
    let row_offset = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut header: Option<(usize, Vec<String>)> = None;
    for (idx0, row) in range.rows().enumerate() {
        if row.iter().any(|c| !is_blank_cell(c)) {
            let cells = row
                .iter()
                .map(|c| cell_to_value(c).to_string().trim().to_string())
                .collect();
            header = Some((idx0, cells));
            break;
        }
    }
    let (header_idx, headers) = header.ok_or_else(|| IngestionError::EmptyInput {
        message: format!("sheet '{sheet}' is empty or its header row could not be read"),
    })?;

    let mut rows = Vec::new();
    for (idx0, row) in range.rows().enumerate().skip(header_idx + 1) {
        if row.iter().all(is_blank_cell) {
            continue;
        }
        let number = row_offset + idx0 + 1;
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let value = row
                    .get(i)
                    .map(cell_to_value)
                    .unwrap_or_else(|| Value::Utf8(String::new()));
                (h.clone(), value)
            })
            .collect();
        rows.push(RawRow::new(number, cells));
    }

    Ok(RawTable { headers, rows })
}

fn is_blank_cell(c: &Data) -> bool {
    match c {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Utf8(dt.to_string()),
        Data::DateTimeIso(s) => Value::Utf8(s.clone()),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(format!("{e:?}")),
        Data::Empty => Value::Utf8(String::new()),
    }
}
