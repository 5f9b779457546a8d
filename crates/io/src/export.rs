// Export of filtered records with their original cells
//
// CSV carries a UTF-8 byte-order mark so Excel opens Thai text correctly.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use prtrack_core::{Dataset, LogicalField, Record};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::LoadError;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Worksheet name used for XLSX exports.
pub const SHEET_NAME: &str = "PR";

/// Write the header row and one row per record to `out`, BOM first.
pub fn write_csv<W: Write>(mut out: W, dataset: &Dataset, records: &[&Record]) -> Result<(), LoadError> {
    out.write_all(UTF8_BOM).map_err(export_err)?;

    let mut writer = csv::WriterBuilder::new().delimiter(b',').from_writer(out);
    writer.write_record(dataset.headers()).map_err(export_err)?;
    for record in records {
        writer
            .write_record(dataset.source_row(record))
            .map_err(export_err)?;
    }
    writer.flush().map_err(export_err)?;
    Ok(())
}

pub fn to_csv_bytes(dataset: &Dataset, records: &[&Record]) -> Result<Vec<u8>, LoadError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, dataset, records)?;
    Ok(buf)
}

pub fn export_csv(path: &Path, dataset: &Dataset, records: &[&Record]) -> Result<(), LoadError> {
    let file = File::create(path)
        .map_err(|e| LoadError::Export(format!("{}: {e}", path.display())))?;
    write_csv(BufWriter::new(file), dataset, records)?;
    log::info!("exported {} row(s) to {}", records.len(), path.display());
    Ok(())
}

/// Same rows as [`write_csv`] in a single-sheet workbook. Quantity and value
/// cells that parse as numbers are written as numbers.
pub fn to_xlsx_bytes(dataset: &Dataset, records: &[&Record]) -> Result<Vec<u8>, LoadError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let qty_col = dataset.schema().index(LogicalField::Quantity);
    let value_col = dataset.schema().index(LogicalField::TotalValue);

    let ws = workbook.add_worksheet();
    ws.set_name(SHEET_NAME).map_err(export_err)?;

    for (col, name) in dataset.headers().iter().enumerate() {
        ws.write_string_with_format(0, col as u16, name, &header)
            .map_err(export_err)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in dataset.source_row(record).iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let number = if Some(col) == qty_col {
                record.quantity
            } else if Some(col) == value_col {
                record.total_value
            } else {
                None
            };
            let written = match number {
                Some(n) => ws.write_number(row, col as u16, n),
                None => ws.write_string(row, col as u16, cell),
            };
            written.map_err(export_err)?;
        }
    }

    workbook.save_to_buffer().map_err(export_err)
}

pub fn export_xlsx(path: &Path, dataset: &Dataset, records: &[&Record]) -> Result<(), LoadError> {
    let bytes = to_xlsx_bytes(dataset, records)?;
    std::fs::write(path, bytes)
        .map_err(|e| LoadError::Export(format!("{}: {e}", path.display())))?;
    log::info!("exported {} row(s) to {}", records.len(), path.display());
    Ok(())
}

fn export_err(e: impl std::fmt::Display) -> LoadError {
    LoadError::Export(e.to_string())
}
