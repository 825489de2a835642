use crate::model::{LookupResult, RowResult, SheetError};
use crate::sheet::reader::cell_text;
use crate::sheet::Table;

use calamine::Data;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

/// Headers of the four columns appended after the input columns.
pub const RESULT_HEADERS: [&str; 4] = ["네이버상품명", "최저가", "링크", "검색어"];

/// Writes the input table with the lookup results appended as four columns.
/// Misses leave title, price and link blank and carry their marker in the
/// query column.
pub fn write_results(path: &Path, table: &Table, results: &[RowResult]) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    let base = table.width() as u16;
    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &bold)?;
    }
    for (offset, header) in RESULT_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, base + offset as u16, *header, &bold)?;
    }

    for (i, entry) in results.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, cell) in entry.row.cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            match numeric_value(cell) {
                Some(n) => sheet.write_number(row, col as u16, n)?,
                None => sheet.write_string(row, col as u16, cell)?,
            };
        }
        if let LookupResult::Found(m) = &entry.result {
            sheet.write_string(row, base, &m.title)?;
            sheet.write_number(row, base + 1, m.price as f64)?;
            sheet.write_string(row, base + 2, &m.link)?;
        }
        sheet.write_string(row, base + 3, entry.result.query_or_marker())?;
    }

    workbook.save(path)?;
    info!("Wrote {} rows to {}", results.len(), path.display());
    Ok(())
}

/// Value of a cell that was a number in the input. Text such as `007` or
/// `1e3` is not rendered that way by the reader, so it stays text.
fn numeric_value(cell: &str) -> Option<f64> {
    let n: f64 = cell.parse().ok()?;
    (n.is_finite() && cell_text(&Data::Float(n)) == cell).then_some(n)
}
