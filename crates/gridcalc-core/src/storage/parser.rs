//! Parser for .grd file format
//!
//! ```text
//! # comment
//! size: 5x5
//! A1: 100
//! B1: =A1 * 2
//! C1: "  padded text  "
//! ```

use super::{SheetData, read_sheet_file};
use crate::document::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::CellRef;
use std::path::Path;

/// Parse a .grd file
pub fn parse_grd(path: &Path) -> Result<SheetData> {
    let content = read_sheet_file(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
///
/// Without a `size:` line the extent is the default grid, grown to fit the
/// stored cells.
pub fn parse_grd_content(content: &str) -> Result<SheetData> {
    let mut data = SheetData::default();
    let mut size: Option<(usize, usize)> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(GridcalcError::Parse {
                line: line_num,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("size") {
            size = Some(parse_size(value).ok_or_else(|| GridcalcError::Parse {
                line: line_num,
                message: format!("Invalid size: {}. Expected ROWSxCOLS", value),
            })?);
            continue;
        }

        let cell_ref = CellRef::from_str(key).ok_or_else(|| GridcalcError::Parse {
            line: line_num,
            message: format!("Invalid cell reference: {}", key),
        })?;
        let text = parse_cell_text(value, line_num)?;
        if !text.is_empty() {
            data.cells.push((cell_ref, text));
        }
    }

    let needed_rows = data.cells.iter().map(|(c, _)| c.row + 1).max().unwrap_or(0);
    let needed_cols = data.cells.iter().map(|(c, _)| c.col + 1).max().unwrap_or(0);
    match size {
        Some((rows, cols)) => {
            if needed_rows > rows || needed_cols > cols {
                return Err(GridcalcError::Parse {
                    line: 0,
                    message: format!("Cells extend beyond declared size {}x{}", rows, cols),
                });
            }
            data.rows = rows;
            data.cols = cols;
        }
        None => {
            data.rows = needed_rows.max(DEFAULT_ROWS);
            data.cols = needed_cols.max(DEFAULT_COLS);
        }
    }

    Ok(data)
}

fn parse_size(value: &str) -> Option<(usize, usize)> {
    let (rows, cols) = value.split_once(['x', 'X'])?;
    Some((rows.trim().parse().ok()?, cols.trim().parse().ok()?))
}

/// Cell text is stored bare, or quoted when it needs escapes.
fn parse_cell_text(value: &str, line_num: usize) -> Result<String> {
    if let Some(quoted) = value.strip_prefix('"') {
        let Some(inner) = quoted.strip_suffix('"') else {
            return Err(GridcalcError::Parse {
                line: line_num,
                message: "Unterminated quoted value".to_string(),
            });
        };
        return Ok(unescape_grd_text(inner));
    }
    Ok(value.to_string())
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}
