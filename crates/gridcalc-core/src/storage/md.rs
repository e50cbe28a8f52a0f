//! Markdown export functionality

use crate::document::{DisplayMode, Sheet};
use gridcalc_engine::engine::CellRef;
use std::io::Write;
use std::path::Path;

/// Write the computed values of the sheet to a markdown file
pub fn write_markdown(path: &Path, sheet: &Sheet) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(write_markdown_content(sheet).as_bytes())
}

/// Render the whole grid extent as a markdown table of displayed values
pub fn write_markdown_content(sheet: &Sheet) -> String {
    let mut out = String::from("# Sheet\n\n");

    if sheet.rows == 0 || sheet.cols == 0 {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    }

    // Markdown table header with column letters
    out.push_str("|   |");
    for col in 0..sheet.cols {
        out.push_str(&format!(" {} |", CellRef::col_to_letters(col)));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in 0..sheet.cols {
        out.push_str("---|");
    }
    out.push('\n');

    for row in 0..sheet.rows {
        out.push_str(&format!("| {} |", row + 1)); // 1-based row numbers
        for col in 0..sheet.cols {
            let display = sheet.cell_display(&CellRef::new(col, row), DisplayMode::Values);
            out.push_str(&format!(" {} |", escape_markdown(&display)));
        }
        out.push('\n');
    }

    out
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
