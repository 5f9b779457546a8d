// Excel workbook import (xlsx, xlsm, xls, xlsb, ods)
//
// Only cell values are read. Date cells become ISO text so they go through
// the same date parsing as CSV input.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Days, NaiveDate, NaiveTime, Timelike};
use prtrack_core::RawTable;

use crate::error::LoadError;

/// First sheet of a workbook (or the one asked for), as a raw table.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub table: RawTable,
    pub sheet: String,
}

/// Read one worksheet from an in-memory workbook.
///
/// Returns `Ok(None)` when the sheet exists but holds no header row.
pub fn read_workbook(bytes: &[u8], sheet: Option<&str>) -> Result<Option<SheetTable>, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                LoadError::Spreadsheet(format!(
                    "no sheet named '{wanted}' (available: {})",
                    names.join(", ")
                ))
            })?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::Spreadsheet("workbook has no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| LoadError::Spreadsheet(format!("sheet '{name}': {e}")))?;

    log::debug!(
        "sheet '{}': {} rows x {} cols",
        name,
        range.height(),
        range.width()
    );

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

    Ok(RawTable::from_rows(rows).map(|table| SheetTable { table, sheet: name }))
}

/// Render a cell the way it would read in the grid.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => serial_to_text(dt.as_f64()).unwrap_or_else(|| format_number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

/// Whole numbers print without a trailing ".0" so IDs like PR numbers stay intact.
fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

/// Excel serial date (1900 system) to `YYYY-MM-DD`, with a time part when
/// the serial has one.
pub fn serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.trunc();
    let date = epoch.checked_add_days(Days::new(days as u64))?;

    let secs = ((serial - days) * 86_400.0).round() as u32;
    if secs == 0 || secs >= 86_400 {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)?;
    Some(format!(
        "{} {:02}:{:02}:{:02}",
        date.format("%Y-%m-%d"),
        time.hour(),
        time.minute(),
        time.second()
    ))
}
