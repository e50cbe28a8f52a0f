//! Error types for formula evaluation and cell resolution.

use thiserror::Error;

/// Everything that can go wrong while evaluating a formula or resolving a cell.
///
/// Evaluation is all-or-nothing: the first failure aborts the whole request
/// and is returned to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Comma is not allowed")]
    CommaNotAllowed,

    #[error("Invalid characters")]
    InvalidCharacters,

    #[error("Function requires parentheses")]
    FunctionRequiresParens,

    #[error("Mismatched parentheses")]
    MismatchedParentheses,

    #[error("Missing operand")]
    MissingOperand,

    #[error("Missing operands")]
    MissingOperands,

    #[error("Invalid expression")]
    InvalidExpression,

    #[error("Division by zero")]
    DivideByZero,

    #[error("Value is not a number: {0:?}")]
    NotANumber(String),

    #[error("Cell contains comma")]
    CommaInCell,

    #[error("Number out of range")]
    Overflow,

    #[error("Cycle detected at {0}")]
    CycleDetected(String),

    #[error("Reference chain longer than {limit} cells")]
    ChainTooLong { limit: usize },

    #[error("Invalid cell reference: {0}")]
    InvalidCellReference(String),

    #[error("Cell out of bounds: {0}")]
    CellOutOfBounds(String),
}

impl EvalError {
    /// True for the circular-reference failure, which presenters usually
    /// mark differently from every other error.
    pub fn is_cycle(&self) -> bool {
        matches!(self, EvalError::CycleDetected(_))
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
