use crate::model::SheetError;
use crate::sheet::Table;

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::info;

/// Reads the first worksheet of an `.xlsx` / `.xls` / `.ods` file.
pub fn read_table(path: &Path) -> Result<Table, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;

    // The range starts at the first used cell; pad so indices match sheet columns.
    let (_, first_col) = range.start().unwrap_or((0, 0));
    let lines: Vec<Vec<String>> = range
        .rows()
        .map(|cells| {
            std::iter::repeat_n(String::new(), first_col as usize)
                .chain(cells.iter().map(cell_text))
                .collect()
        })
        .collect();
    if lines.is_empty() {
        return Err(SheetError::Empty);
    }

    let table = Table::from_lines(lines);
    info!("Read {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Cell as text; integral floats lose their `.0` so codes like 1234 stay intact.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
