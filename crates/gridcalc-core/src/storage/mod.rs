//! Storage module for .grd and XML sheet formats and CSV/Markdown import/export

mod csv;
mod md;
mod parser;
mod writer;
mod xml;

pub use csv::{parse_csv, parse_csv_content, write_csv, write_csv_content};
pub use md::{write_markdown, write_markdown_content};
pub use parser::{parse_grd, parse_grd_content};
pub use writer::{write_grd, write_grd_content};
pub use xml::{parse_xml, parse_xml_content, write_xml, write_xml_content};

use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::CellRef;
use std::path::Path;

const MAX_SHEET_FILE_BYTES: u64 = 16 * 1_048_576; // 16 MiB

/// A loaded sheet: extent plus raw cell text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetData {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<(CellRef, String)>,
}

fn read_sheet_file(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_SHEET_FILE_BYTES {
        return Err(GridcalcError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_SHEET_FILE_BYTES
            ),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}
