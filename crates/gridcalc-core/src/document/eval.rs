use super::{DisplayMode, Sheet};
use gridcalc_engine::Result as EvalResult;
use gridcalc_engine::engine::{CellRef, Resolver, Value, evaluate, format_value};

impl Sheet {
    fn resolver(&self) -> Resolver<'_, Self> {
        Resolver::new(self).with_max_depth(self.max_chain_depth)
    }

    /// Resolve a cell by name, following references and detecting cycles.
    pub fn resolve(&self, name: &str) -> EvalResult<Value> {
        self.resolver().resolve(name)
    }

    /// Evaluate an ad-hoc expression against this sheet's cells.
    ///
    /// Each reference starts a fresh resolution chain, since the expression
    /// itself is not a cell.
    pub fn evaluate(&self, expression: &str) -> EvalResult<Value> {
        let resolver = self.resolver();
        evaluate(expression, |name| resolver.resolve(name))
    }

    /// Format a value with this sheet's display options.
    pub fn format_value(&self, value: &Value) -> String {
        format_value(value, self.display.max_plain_width)
    }

    /// Resolve a cell and format the result, or the matching marker on failure.
    pub fn computed_display(&self, cell_ref: &CellRef) -> String {
        match self.resolve(&cell_ref.to_string()) {
            Ok(value) => self.format_value(&value),
            Err(e) => {
                log::debug!("{} failed to evaluate: {}", cell_ref, e);
                if e.is_cycle() {
                    self.display.cycle_marker.clone()
                } else {
                    self.display.error_marker.clone()
                }
            }
        }
    }

    /// Get the text shown for a cell.
    ///
    /// Only formulas are computed in [`DisplayMode::Values`]; literals are
    /// shown as typed.
    pub fn cell_display(&self, cell_ref: &CellRef, mode: DisplayMode) -> String {
        let text = self.get_cell_text(cell_ref).unwrap_or_default();
        match mode {
            DisplayMode::Values if text.starts_with('=') => self.computed_display(cell_ref),
            _ => text,
        }
    }

    /// Whether `text` is exactly what the cell currently computes to.
    pub(crate) fn is_calculation_result(&self, cell_ref: &CellRef, text: &str) -> bool {
        match self.resolve(&cell_ref.to_string()) {
            Ok(value) => self.format_value(&value) == text,
            Err(_) => false,
        }
    }
}
