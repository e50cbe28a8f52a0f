//! gridcalc_engine - Formula tokenizer, compiler, evaluator and cell resolver.

pub mod engine;
pub mod error;

pub use error::{EvalError, Result};
