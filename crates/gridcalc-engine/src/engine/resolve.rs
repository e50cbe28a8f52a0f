//! Cell resolution with circular reference detection.
//!
//! There is no stored dependency graph. Each resolution carries the chain of
//! cell names currently being resolved above it; meeting a name that is
//! already on the chain is a cycle. Every nested reference gets its own copy
//! of the chain, so sibling references to a shared (acyclic) cell never see
//! each other's entries.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;
use super::eval::evaluate;
use super::value::Value;
use crate::error::{EvalError, Result};

/// Longest reference chain followed before giving up with
/// [`EvalError::ChainTooLong`].
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 128;

/// Read access to the cells being evaluated.
pub trait CellStore {
    /// Raw stored text of a cell, if any.
    fn stored_text(&self, cell: &CellRef) -> Option<String>;

    /// Current grid extent as `(rows, cols)`.
    fn extent(&self) -> (usize, usize);
}

fn alias_re() -> &'static Regex {
    static ALIAS_RE: OnceLock<Regex> = OnceLock::new();
    ALIAS_RE.get_or_init(|| Regex::new(r"^=([A-Za-z]+[0-9]+)$").expect("valid alias regex"))
}

/// Resolves cell names to values against a [`CellStore`].
pub struct Resolver<'a, S: ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: CellStore + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Resolver {
            store,
            max_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Limit the reference chain length; values below 1 are raised to 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Resolve a cell by name (case-insensitive).
    pub fn resolve(&self, name: &str) -> Result<Value> {
        self.resolve_with(name, &[])
    }

    fn resolve_with(&self, name: &str, visited: &[String]) -> Result<Value> {
        let name = name.to_ascii_uppercase();
        if visited.contains(&name) {
            log::debug!("cycle detected: {} -> {}", visited.join(" -> "), name);
            return Err(EvalError::CycleDetected(name));
        }
        if visited.len() >= self.max_depth {
            log::debug!("reference chain exceeds {} cells at {}", self.max_depth, name);
            return Err(EvalError::ChainTooLong {
                limit: self.max_depth,
            });
        }

        let mut chain = visited.to_vec();
        chain.push(name.clone());

        let cell = CellRef::parse(&name)?;
        let (rows, cols) = self.store.extent();
        if !cell.in_bounds(rows, cols) {
            return Err(EvalError::CellOutOfBounds(name));
        }

        let text = match self.store.stored_text(&cell) {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(Value::zero()),
        };
        log::trace!("resolving {} = {:?}", name, text);

        if !text.starts_with('=') {
            return Ok(Value::from_literal(&text));
        }

        if let Some(caps) = alias_re().captures(&text) {
            return self.resolve_with(&caps[1], &chain);
        }

        evaluate(&text, |nested| self.resolve_with(nested, &chain))
    }
}

/// Resolve a single cell with the default chain limit.
pub fn resolve_cell<S: CellStore + ?Sized>(store: &S, name: &str) -> Result<Value> {
    Resolver::new(store).resolve(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    struct MemStore {
        cells: HashMap<CellRef, String>,
        rows: usize,
        cols: usize,
    }

    impl MemStore {
        fn new(entries: &[(&str, &str)]) -> Self {
            let cells = entries
                .iter()
                .map(|(name, text)| (CellRef::from_str(name).unwrap(), text.to_string()))
                .collect();
            MemStore {
                cells,
                rows: 10,
                cols: 10,
            }
        }
    }

    impl CellStore for MemStore {
        fn stored_text(&self, cell: &CellRef) -> Option<String> {
            self.cells.get(cell).cloned()
        }

        fn extent(&self) -> (usize, usize) {
            (self.rows, self.cols)
        }
    }

    fn num(n: i64) -> Result<Value> {
        Ok(Value::Number(Decimal::from(n)))
    }

    #[test]
    fn test_empty_cell_is_zero() {
        let store = MemStore::new(&[("A2", "")]);
        assert_eq!(resolve_cell(&store, "A1"), num(0));
        assert_eq!(resolve_cell(&store, "A2"), num(0));
    }

    #[test]
    fn test_literals() {
        let store = MemStore::new(&[("A1", "7"), ("B1", "hello"), ("C1", " 2.5 ")]);
        assert_eq!(resolve_cell(&store, "a1"), num(7));
        assert_eq!(resolve_cell(&store, "B1"), Ok(Value::from("hello")));
        assert_eq!(
            resolve_cell(&store, "C1"),
            Ok(Value::Number(Decimal::new(25, 1)))
        );
    }

    #[test]
    fn test_formula_with_references() {
        let store = MemStore::new(&[("A1", "4"), ("B1", "=A1*2"), ("C1", "=inc(B1) + a1")]);
        assert_eq!(resolve_cell(&store, "B1"), num(8));
        assert_eq!(resolve_cell(&store, "C1"), num(13));
    }

    #[test]
    fn test_formula_that_is_a_number() {
        let store = MemStore::new(&[("A1", "=5")]);
        assert_eq!(resolve_cell(&store, "A1"), num(5));
    }

    #[test]
    fn test_direct_alias_preserves_text() {
        let store = MemStore::new(&[("A1", "=B1"), ("B1", "hello"), ("C1", "=a1")]);
        assert_eq!(resolve_cell(&store, "A1"), Ok(Value::from("hello")));
        assert_eq!(resolve_cell(&store, "C1"), Ok(Value::from("hello")));
    }

    #[test]
    fn test_text_in_arithmetic_fails() {
        let store = MemStore::new(&[("A1", "=B1+1"), ("B1", "hello")]);
        assert_eq!(
            resolve_cell(&store, "A1"),
            Err(EvalError::NotANumber("hello".to_string()))
        );
    }

    #[test]
    fn test_comma_in_referenced_text() {
        let store = MemStore::new(&[("A1", "=B1+1"), ("B1", "1,5")]);
        assert_eq!(resolve_cell(&store, "A1"), Err(EvalError::CommaInCell));
    }

    #[test]
    fn test_two_cell_cycle() {
        let store = MemStore::new(&[("A1", "=B1"), ("B1", "=A1")]);
        assert_eq!(
            resolve_cell(&store, "A1"),
            Err(EvalError::CycleDetected("A1".to_string()))
        );
    }

    #[test]
    fn test_self_reference_in_formula() {
        let store = MemStore::new(&[("A1", "=A1+1")]);
        assert!(resolve_cell(&store, "A1").unwrap_err().is_cycle());
    }

    #[test]
    fn test_longer_cycle_through_formulas() {
        let store = MemStore::new(&[("A1", "=B1+1"), ("B1", "=C1*2"), ("C1", "=1+A1")]);
        assert!(resolve_cell(&store, "B1").unwrap_err().is_cycle());
    }

    #[test]
    fn test_shared_dependency_is_not_a_cycle() {
        // Diamond: both operands reach C1 independently.
        let store = MemStore::new(&[
            ("A1", "=B1+B2"),
            ("B1", "=C1"),
            ("B2", "=C1*2"),
            ("C1", "3"),
        ]);
        assert_eq!(resolve_cell(&store, "A1"), num(9));

        let store = MemStore::new(&[("A1", "=B1+B1"), ("B1", "5")]);
        assert_eq!(resolve_cell(&store, "A1"), num(10));
    }

    #[test]
    fn test_invalid_and_out_of_bounds_references() {
        let store = MemStore::new(&[("A1", "=K1"), ("A2", "=A11")]);
        assert_eq!(
            resolve_cell(&store, "A1"),
            Err(EvalError::CellOutOfBounds("K1".to_string()))
        );
        assert_eq!(
            resolve_cell(&store, "A2"),
            Err(EvalError::CellOutOfBounds("A11".to_string()))
        );
        assert_eq!(
            resolve_cell(&store, "1A"),
            Err(EvalError::InvalidCellReference("1A".to_string()))
        );
        assert_eq!(
            resolve_cell(&store, "A0"),
            Err(EvalError::CellOutOfBounds("A0".to_string()))
        );
    }

    #[test]
    fn test_chain_limit() {
        let mut entries: Vec<(String, String)> = (1..10)
            .map(|row| (format!("A{}", row), format!("=A{}+1", row + 1)))
            .collect();
        entries.push(("A10".to_string(), "0".to_string()));
        let borrowed: Vec<(&str, &str)> = entries
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
            .collect();
        let store = MemStore::new(&borrowed);

        assert_eq!(Resolver::new(&store).resolve("A1"), num(9));
        assert_eq!(
            Resolver::new(&store).with_max_depth(5).resolve("A1"),
            Err(EvalError::ChainTooLong { limit: 5 })
        );
        assert_eq!(
            Resolver::new(&store).with_max_depth(10).resolve("A1"),
            num(9)
        );
    }

    #[test]
    fn test_resolver_never_mutates_store() {
        let store = MemStore::new(&[("A1", "=B1+1"), ("B1", "2")]);
        let before = store.cells.clone();
        let _ = resolve_cell(&store, "A1");
        assert_eq!(store.cells, before);
    }
}
