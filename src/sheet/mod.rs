// Spreadsheet row source and result sink
pub mod columns;
pub mod reader;
pub mod writer;

pub use columns::{detect_mapping, ColumnOverrides};
pub use reader::read_table;
pub use writer::write_results;

use crate::model::Row;

/// Header row plus data rows of the first worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// First line is the header; lines with no text at all are dropped.
    pub fn from_lines(mut lines: Vec<Vec<String>>) -> Self {
        if lines.is_empty() {
            return Self::default();
        }
        let headers = lines.remove(0).into_iter().map(|h| h.trim().to_string()).collect();
        let rows = lines
            .into_iter()
            .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
            .map(Row::new)
            .collect();
        Self { headers, rows }
    }

    /// Widest row (header included), used to place the result columns.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn splits_header_and_drops_blank_lines() {
        let table = Table::from_lines(vec![
            line(&[" No ", "상품명", "규격"]),
            line(&["1", "볼펜", "0.5mm"]),
            line(&["", " ", ""]),
            line(&["2", "A4 용지", "80g", "extra"]),
        ]);
        assert_eq!(table.headers, line(&["No", "상품명", "규격"]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cell(1), "A4 용지");
        assert_eq!(table.width(), 4);
    }

    #[test]
    fn no_lines_is_empty_table() {
        let table = Table::from_lines(Vec::new());
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
        assert_eq!(table.width(), 0);
    }
}
