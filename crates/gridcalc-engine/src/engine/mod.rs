//! Formula engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Value`] - Number/Text values and numeric coercion
//! - [`tokenize`] - Formula tokenizer and validator
//! - [`to_postfix`] - Operator-precedence conversion to postfix order
//! - [`evaluate`], [`evaluate_postfix`] - The postfix stack machine
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`Resolver`], [`CellStore`] - Cell resolution with cycle detection
//! - [`format_value`] - Format values for display

mod cell_ref;
mod eval;
mod format;
mod lexer;
mod postfix;
mod resolve;
mod value;

pub use cell_ref::CellRef;
pub use eval::{evaluate, evaluate_postfix};
pub use format::{DEFAULT_MAX_PLAIN_WIDTH, format_number, format_value};
pub use lexer::{Function, Operator, Token, tokenize};
pub use postfix::to_postfix;
pub use resolve::{CellStore, DEFAULT_MAX_CHAIN_DEPTH, Resolver, resolve_cell};
pub use value::{Value, parse_decimal};

pub use rust_decimal::Decimal;
