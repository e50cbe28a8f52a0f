use crate::error::Result;
use crate::storage::SheetData;
use dashmap::DashMap;
use gridcalc_engine::engine::{
    CellRef, CellStore, DEFAULT_MAX_CHAIN_DEPTH, DEFAULT_MAX_PLAIN_WIDTH,
};
use std::path::PathBuf;

/// Sparse storage of raw cell text (literals and `=` formulas).
pub type Grid = DashMap<CellRef, String>;

pub const DEFAULT_ROWS: usize = 5;
pub const DEFAULT_COLS: usize = 5;

/// What a cell shows: its stored text, or the value it computes to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Expressions,
    Values,
}

/// How computed values and failures are rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Shown in place of a value when a formula is part of a reference cycle
    pub cycle_marker: String,
    /// Shown in place of a value for every other evaluation failure
    pub error_marker: String,
    /// Numbers wider than this switch to scientific notation
    pub max_plain_width: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            cycle_marker: "#CYCLE".to_string(),
            error_marker: "#ERROR".to_string(),
            max_plain_width: DEFAULT_MAX_PLAIN_WIDTH,
        }
    }
}

/// Settings a sheet is created with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetOptions {
    pub rows: usize,
    pub cols: usize,
    pub max_chain_depth: usize,
    pub display: DisplayOptions,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            display: DisplayOptions::default(),
        }
    }
}

/// UI-agnostic sheet state: raw cell text plus the grid extent.
pub struct Sheet {
    /// Raw stored text per cell; cells without an entry are empty
    pub grid: Grid,
    /// Number of rows in the grid
    pub rows: usize,
    /// Number of columns in the grid
    pub cols: usize,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet has unsaved changes
    pub modified: bool,
    /// Longest reference chain followed during resolution
    pub max_chain_depth: usize,
    pub display: DisplayOptions,
}

impl Sheet {
    /// Create an empty sheet with the default 5x5 extent.
    pub fn new() -> Self {
        Self::with_options(SheetOptions::default())
    }

    /// Create an empty sheet.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn with_options(options: SheetOptions) -> Self {
        Sheet {
            grid: DashMap::new(),
            rows: options.rows,
            cols: options.cols,
            file_path: None,
            modified: false,
            max_chain_depth: options.max_chain_depth,
            display: options.display,
        }
    }

    /// Create a sheet and load a file if provided.
    ///
    /// A path that does not exist yet becomes the save target of a new sheet.
    pub fn with_file(path: Option<PathBuf>, options: SheetOptions) -> Result<Self> {
        let mut sheet = Self::with_options(options);
        if let Some(ref p) = path {
            if p.exists() {
                sheet.load_file(p)?;
            } else {
                sheet.file_path = Some(p.clone());
                sheet.modified = false;
            }
        }
        Ok(sheet)
    }

    /// Replace the whole sheet with loaded data.
    pub(crate) fn replace_contents(&mut self, data: SheetData) {
        self.grid.clear();
        self.rows = data.rows;
        self.cols = data.cols;
        for (cell_ref, text) in data.cells {
            if !text.is_empty() {
                self.grid.insert(cell_ref, text);
            }
        }
    }

    /// Snapshot of all non-empty cells, sorted by row then column.
    pub fn sorted_cells(&self) -> Vec<(CellRef, String)> {
        let mut cells: Vec<(CellRef, String)> = self
            .grid
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        cells.sort_by(|(a, _), (b, _)| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));
        cells
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl CellStore for Sheet {
    fn stored_text(&self, cell: &CellRef) -> Option<String> {
        self.grid.get(cell).map(|text| text.clone())
    }

    fn extent(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}
