//! CSV import/export functionality
//!
//! CSV carries raw cell text (formulas included), one grid row per line.

use super::{SheetData, read_sheet_file};
use crate::document::Sheet;
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::CellRef;
use std::path::Path;

/// Parse a CSV file into sheet data
pub fn parse_csv(path: &Path) -> Result<SheetData> {
    let content = read_sheet_file(path)?;
    parse_csv_content(&content)
}

/// Parse CSV content.
///
/// Blank lines are skipped without consuming a row. The extent becomes the
/// number of remaining lines by the widest of them.
pub fn parse_csv_content(content: &str) -> Result<SheetData> {
    let mut data = SheetData::default();

    for line in content.lines().filter(|line| !line.is_empty()) {
        let fields = parse_csv_line(line);
        data.cols = data.cols.max(fields.len());
        for (col_idx, field) in fields.into_iter().enumerate() {
            if !field.is_empty() {
                data.cells.push((CellRef::new(col_idx, data.rows), field));
            }
        }
        data.rows += 1;
    }

    if data.rows == 0 {
        return Err(GridcalcError::EmptyCsv);
    }
    Ok(data)
}

/// Parse a single CSV line, handling quoted fields
///
/// Field text is kept exactly, including surrounding spaces, because it is
/// the raw content of a cell.
pub(crate) fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Export the sheet's raw text to a CSV file
pub fn write_csv(path: &Path, sheet: &Sheet) -> Result<()> {
    std::fs::write(path, write_csv_content(sheet))?;
    Ok(())
}

/// Render every row and column of the sheet extent as CSV
pub fn write_csv_content(sheet: &Sheet) -> String {
    let mut out = String::new();
    for row in 0..sheet.rows {
        let fields: Vec<String> = (0..sheet.cols)
            .map(|col| {
                let text = sheet
                    .get_cell_text(&CellRef::new(col, row))
                    .unwrap_or_default();
                escape_csv_field(&text)
            })
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
