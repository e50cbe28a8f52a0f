use super::Sheet;
use crate::error::{GridcalcError, Result};
use crate::storage::{
    parse_csv, parse_grd, parse_xml, write_csv, write_grd, write_markdown, write_xml,
};
use std::path::Path;

/// On-disk formats, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    /// Native `CELL: TEXT` format
    Grd,
    /// `SavedData` XML with rows, cols and name/value cell records
    Xml,
    Csv,
    /// Table of displayed values (export only)
    Markdown,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<FileFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("grd") => Ok(FileFormat::Grd),
            Some("xlcx") | Some("xml") => Ok(FileFormat::Xml),
            Some("csv") => Ok(FileFormat::Csv),
            Some("md") => Ok(FileFormat::Markdown),
            _ => Err(GridcalcError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl Sheet {
    /// Load a sheet from a .grd, .xlcx or .csv file, replacing all cells and the extent.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let data = match FileFormat::from_path(path)? {
            FileFormat::Grd => parse_grd(path)?,
            FileFormat::Xml => parse_xml(path)?,
            FileFormat::Csv => parse_csv(path)?,
            FileFormat::Markdown => {
                return Err(GridcalcError::UnsupportedFormat(format!(
                    "{} (markdown is export-only)",
                    path.display()
                )));
            }
        };
        self.replace_contents(data);
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        log::info!(
            "loaded {} ({}x{}, {} cells)",
            path.display(),
            self.rows,
            self.cols,
            self.grid.len()
        );
        Ok(())
    }

    /// Save to current file path
    pub fn save_file(&mut self) -> Result<()> {
        let path = self.file_path.clone().ok_or(GridcalcError::NoFilePath)?;
        self.save_as(&path)
    }

    /// Save to `path` in the format its extension names.
    ///
    /// Markdown is an export: it neither becomes the current file path nor
    /// clears the modified flag.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        match FileFormat::from_path(path)? {
            FileFormat::Grd => write_grd(path, self)?,
            FileFormat::Xml => write_xml(path, self)?,
            FileFormat::Csv => write_csv(path, self)?,
            FileFormat::Markdown => {
                write_markdown(path, self)?;
                log::info!("exported {}", path.display());
                return Ok(());
            }
        }
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        log::info!("saved {}", path.display());
        Ok(())
    }
}
