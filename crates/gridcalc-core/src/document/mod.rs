//! Sheet state and logic (UI-agnostic).

mod eval;
mod io;
mod ops;
mod state;

pub use io::FileFormat;
pub use state::{
    DEFAULT_COLS, DEFAULT_ROWS, DisplayMode, DisplayOptions, Grid, Sheet, SheetOptions,
};
