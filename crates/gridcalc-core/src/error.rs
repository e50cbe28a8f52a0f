//! Error types for Gridcalc core.

use gridcalc_engine::EvalError;
use thiserror::Error;

/// Errors that can occur while editing, loading or saving a sheet
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("No file path set")]
    NoFilePath,

    #[error("XML error: {0}")]
    Xml(String),

    #[error("CSV file is empty")]
    EmptyCsv,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
