use super::{DisplayMode, Sheet};
use crate::error::Result;
use gridcalc_engine::EvalError;
use gridcalc_engine::engine::CellRef;

/// Dimension for row/column operations
#[derive(Copy, Clone, Debug)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    /// Get the coordinate value from a CellRef for this dimension
    fn get_coord(&self, cell_ref: &CellRef) -> usize {
        match self {
            Dimension::Row => cell_ref.row,
            Dimension::Column => cell_ref.col,
        }
    }

    fn extent_mut<'a>(&self, sheet: &'a mut Sheet) -> &'a mut usize {
        match self {
            Dimension::Row => &mut sheet.rows,
            Dimension::Column => &mut sheet.cols,
        }
    }
}

impl Sheet {
    /// Raw stored text of a cell.
    pub fn get_cell_text(&self, cell_ref: &CellRef) -> Option<String> {
        self.grid.get(cell_ref).map(|text| text.clone())
    }

    /// Store raw text in a cell; empty text empties the cell.
    ///
    /// Returns whether the stored text changed. Cells outside the grid extent
    /// are rejected.
    pub fn set_cell(&mut self, cell_ref: CellRef, text: &str) -> Result<bool> {
        if !cell_ref.in_bounds(self.rows, self.cols) {
            return Err(EvalError::CellOutOfBounds(cell_ref.to_string()).into());
        }

        let old = self.get_cell_text(&cell_ref).unwrap_or_default();
        if old == text {
            return Ok(false);
        }

        log::debug!("set {} = {:?}", cell_ref, text);
        if text.is_empty() {
            self.grid.remove(&cell_ref);
        } else {
            self.grid.insert(cell_ref, text.to_string());
        }
        self.modified = true;
        Ok(true)
    }

    /// Clear the specified cell
    pub fn clear_cell(&mut self, cell_ref: &CellRef) -> bool {
        if self.grid.remove(cell_ref).is_some() {
            log::debug!("cleared {}", cell_ref);
            self.modified = true;
            true
        } else {
            false
        }
    }

    /// Apply an edit coming from a grid editor.
    ///
    /// In [`DisplayMode::Values`] the editor shows computed values, so an edit
    /// that merely echoes the value currently computed for the cell is
    /// ignored and the stored formula survives.
    pub fn commit_edit(&mut self, cell_ref: CellRef, text: &str, mode: DisplayMode) -> Result<bool> {
        if mode == DisplayMode::Values {
            let old = self.get_cell_text(&cell_ref).unwrap_or_default();
            if text != old && !text.is_empty() && self.is_calculation_result(&cell_ref, text) {
                return Ok(false);
            }
        }
        self.set_cell(cell_ref, text)
    }

    pub fn add_row(&mut self) {
        self.add_dimension(Dimension::Row);
    }

    pub fn add_column(&mut self) {
        self.add_dimension(Dimension::Column);
    }

    /// Delete the last row and everything stored in it.
    pub fn remove_last_row(&mut self) -> bool {
        self.remove_last(Dimension::Row)
    }

    /// Delete the last column and everything stored in it.
    pub fn remove_last_column(&mut self) -> bool {
        self.remove_last(Dimension::Column)
    }

    fn add_dimension(&mut self, dim: Dimension) {
        *dim.extent_mut(self) += 1;
        self.modified = true;
        log::debug!("{:?} added, extent now {}x{}", dim, self.rows, self.cols);
    }

    fn remove_last(&mut self, dim: Dimension) -> bool {
        let extent = *dim.extent_mut(self);
        if extent == 0 {
            return false;
        }
        let last = extent - 1;

        self.grid.retain(|cell_ref, _| dim.get_coord(cell_ref) != last);
        *dim.extent_mut(self) = last;
        self.modified = true;
        log::debug!("{:?} removed, extent now {}x{}", dim, self.rows, self.cols);
        true
    }
}
