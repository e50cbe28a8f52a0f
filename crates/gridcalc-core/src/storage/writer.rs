//! Writer for .grd file format

use crate::document::Sheet;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Write a sheet to a .grd file
pub fn write_grd(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_grd_content(sheet);
    fs::write(path, content)?;
    Ok(())
}

/// Write a sheet to a .grd format string
pub fn write_grd_content(sheet: &Sheet) -> String {
    let mut lines = vec![
        "# Gridcalc Sheet".to_string(),
        format!("size: {}x{}", sheet.rows, sheet.cols),
    ];

    for (cell_ref, text) in sheet.sorted_cells() {
        lines.push(format!("{}: {}", cell_ref, encode_grd_text(&text)));
    }

    lines.join("\n") + "\n"
}

/// Quote text that would not survive a bare `CELL: TEXT` line.
fn encode_grd_text(text: &str) -> String {
    let needs_quotes = text.trim() != text
        || text.starts_with('"')
        || text.contains('\n')
        || text.contains('\r');
    if !needs_quotes {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
