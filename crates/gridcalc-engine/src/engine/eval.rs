//! Postfix stack machine and the `evaluate` entry point.
//!
//! Cell references are not resolved here. Every reference token is handed to
//! a caller-supplied resolver, which is how the cell resolver recurses back
//! into the engine for nested formulas.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::VecDeque;

use super::lexer::{Function, Operator, Token, tokenize};
use super::postfix::to_postfix;
use super::value::{Value, parse_decimal};
use crate::error::{EvalError, Result};

/// Evaluate a formula, with or without its leading `=`.
///
/// Blank input is zero. Input that is a plain number is returned as-is and
/// never reaches the tokenizer or the resolver.
pub fn evaluate<F>(expression: &str, mut resolve: F) -> Result<Value>
where
    F: FnMut(&str) -> Result<Value>,
{
    if expression.trim().is_empty() {
        return Ok(Value::zero());
    }
    if expression.contains(',') {
        return Err(EvalError::CommaNotAllowed);
    }
    if let Some(n) = parse_decimal(expression) {
        return Ok(Value::Number(n));
    }

    let body = expression.strip_prefix('=').unwrap_or(expression);
    let tokens = tokenize(body)?;
    let postfix = to_postfix(tokens)?;
    evaluate_postfix(postfix, &mut resolve)
}

/// Run a postfix sequence against a value stack.
pub fn evaluate_postfix<F>(mut postfix: VecDeque<Token>, resolve: &mut F) -> Result<Value>
where
    F: FnMut(&str) -> Result<Value>,
{
    let mut stack: Vec<Value> = Vec::new();

    while let Some(token) = postfix.pop_front() {
        match token {
            Token::Number(n) => stack.push(Value::Number(n)),
            Token::Cell(name) => {
                let value = resolve(&name)?;
                if let Value::Text(s) = &value
                    && s.contains(',')
                {
                    return Err(EvalError::CommaInCell);
                }
                stack.push(value);
            }
            Token::Func(func) => {
                let operand = stack.pop().ok_or(EvalError::MissingOperand)?;
                stack.push(apply_function(func, &operand)?);
            }
            Token::Op(op) => {
                if stack.len() < 2 {
                    return Err(EvalError::MissingOperands);
                }
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(EvalError::MissingOperands);
                };
                stack.push(apply_operator(op, &a, &b)?);
            }
            Token::LParen | Token::RParen => return Err(EvalError::MismatchedParentheses),
        }
    }

    if stack.len() != 1 {
        return Err(EvalError::InvalidExpression);
    }
    stack.pop().ok_or(EvalError::InvalidExpression)
}

fn apply_function(func: Function, operand: &Value) -> Result<Value> {
    let n = operand.to_number()?;
    let result = match func {
        Function::Inc => n.checked_add(Decimal::ONE),
        Function::Dec => n.checked_sub(Decimal::ONE),
    };
    result.map(Value::Number).ok_or(EvalError::Overflow)
}

fn flag(condition: bool) -> Option<Decimal> {
    Some(if condition { Decimal::ONE } else { Decimal::ZERO })
}

/// Apply a binary operator; `a` is the left operand.
fn apply_operator(op: Operator, a: &Value, b: &Value) -> Result<Value> {
    let result = match op {
        Operator::Div | Operator::Mod | Operator::IntDiv => {
            let divisor = b.to_number()?;
            if divisor.is_zero() {
                return Err(EvalError::DivideByZero);
            }
            let dividend = a.to_number()?;
            match op {
                Operator::Div => dividend.checked_div(divisor),
                Operator::Mod => dividend.checked_rem(divisor),
                _ => truncating_div(dividend, divisor),
            }
        }
        _ => {
            let lhs = a.to_number()?;
            let rhs = b.to_number()?;
            match op {
                Operator::Add => lhs.checked_add(rhs),
                Operator::Sub => lhs.checked_sub(rhs),
                Operator::Mul => lhs.checked_mul(rhs),
                Operator::Eq => flag(lhs == rhs),
                Operator::Lt => flag(lhs < rhs),
                Operator::Gt => flag(lhs > rhs),
                Operator::Le => flag(lhs <= rhs),
                Operator::Ge => flag(lhs >= rhs),
                Operator::Ne => flag(lhs != rhs),
                Operator::Div | Operator::Mod | Operator::IntDiv => None,
            }
        }
    };
    result.map(Value::Number).ok_or(EvalError::Overflow)
}

/// `div`: exact division, then truncation toward zero into a 32-bit integer.
///
/// Quotients outside the `i32` range are an overflow rather than a wider
/// integer, matching the established behaviour of this operator.
fn truncating_div(dividend: Decimal, divisor: Decimal) -> Option<Decimal> {
    let quotient = dividend.checked_div(divisor)?;
    quotient.trunc().to_i32().map(Decimal::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn no_cells(name: &str) -> Result<Value> {
        panic!("resolver must not be called, got {}", name)
    }

    fn eval(expr: &str) -> Result<Value> {
        evaluate(expr, no_cells)
    }

    fn num(s: &str) -> Result<Value> {
        Ok(Value::Number(dec(s)))
    }

    #[test]
    fn test_blank_is_zero() {
        assert_eq!(eval(""), num("0"));
        assert_eq!(eval("  \t\n"), num("0"));
    }

    #[test]
    fn test_literal_short_circuit() {
        assert_eq!(eval("42"), num("42"));
        assert_eq!(eval("-3.5"), num("-3.5"));
        assert_eq!(eval(" 7 "), num("7"));
        assert_eq!(eval("1e2"), num("100"));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4"), num("14"));
        assert_eq!(eval("(2+3)*4"), num("20"));
        assert_eq!(eval("10-4-3"), num("3"));
        assert_eq!(eval("=1+1"), num("2"));
    }

    #[test]
    fn test_integer_division_and_modulo() {
        assert_eq!(eval("10 div 3"), num("3"));
        assert_eq!(eval("10 mod 3"), num("1"));
        assert_eq!(eval("-7 div 2"), Err(EvalError::MissingOperands));
        assert_eq!(eval("(0-7) div 2"), num("-3"));
        assert_eq!(eval("(0-7) mod 3"), num("-1"));
        assert_eq!(eval("7.5 mod 2"), num("1.5"));
    }

    #[test]
    fn test_int_div_result_feeds_further_arithmetic() {
        assert_eq!(eval("10 div 3 + 1"), num("4"));
        assert_eq!(eval("inc(10 div 3)"), num("4"));
        assert_eq!(eval("(10 div 4) * 0.5"), num("1"));
    }

    #[test]
    fn test_int_div_overflow() {
        assert_eq!(eval("9999999999 div 1"), Err(EvalError::Overflow));
    }

    #[test]
    fn test_real_division_keeps_precision() {
        assert_eq!(eval("1/4"), num("0.25"));
        assert_eq!(eval("0.1+0.2"), num("0.3"));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(eval("5/0"), Err(EvalError::DivideByZero));
        assert_eq!(eval("5 mod 0"), Err(EvalError::DivideByZero));
        assert_eq!(eval("5 div 0"), Err(EvalError::DivideByZero));
        assert_eq!(eval("5/(2-2)"), Err(EvalError::DivideByZero));
    }

    #[test]
    fn test_inc_dec() {
        assert_eq!(eval("inc(5)"), num("6"));
        assert_eq!(eval("dec(5)"), num("4"));
        assert_eq!(eval("inc(2*3)+1"), num("8"));
        assert_eq!(eval("inc 5"), Err(EvalError::FunctionRequiresParens));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1<2"), num("1"));
        assert_eq!(eval("2<1"), num("0"));
        assert_eq!(eval("2=2.0"), num("1"));
        assert_eq!(eval("3<>3"), num("0"));
        assert_eq!(eval("3>=3"), num("1"));
        assert_eq!(eval("3<=2"), num("0"));
        assert_eq!(eval("1+1>1"), num("1"));
    }

    #[test]
    fn test_comma_rejected_before_anything_else() {
        assert_eq!(eval("1,5+2"), Err(EvalError::CommaNotAllowed));
        assert_eq!(eval("1,5"), Err(EvalError::CommaNotAllowed));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(eval("1+"), Err(EvalError::MissingOperands));
        assert_eq!(eval("1 2"), Err(EvalError::InvalidExpression));
        assert_eq!(eval("()"), Err(EvalError::InvalidExpression));
        assert_eq!(eval("="), Err(EvalError::InvalidExpression));
        assert_eq!(eval("(1+2"), Err(EvalError::MismatchedParentheses));
        assert_eq!(eval("1 # 2"), Err(EvalError::InvalidCharacters));
    }

    #[test]
    fn test_missing_operand_for_function() {
        let postfix = VecDeque::from(vec![Token::Func(Function::Inc)]);
        assert_eq!(
            evaluate_postfix(postfix, &mut no_cells),
            Err(EvalError::MissingOperand)
        );
    }

    #[test]
    fn test_cell_values_from_resolver() {
        let cells: HashMap<&str, Value> = HashMap::from([
            ("A1", Value::Number(dec("7"))),
            ("B2", Value::from("2.5")),
            ("C3", Value::from("")),
        ]);
        let lookup = |name: &str| Ok(cells[name].clone());

        assert_eq!(evaluate("A1", lookup), num("7"));
        assert_eq!(evaluate("a1*2", lookup), num("14"));
        assert_eq!(evaluate("A1+B2", lookup), num("9.5"));
        assert_eq!(evaluate("C3+1", lookup), num("1"));
    }

    #[test]
    fn test_single_reference_keeps_text() {
        let lookup = |_: &str| Ok(Value::from("hello"));
        assert_eq!(evaluate("(A1)", lookup), Ok(Value::from("hello")));
        assert_eq!(
            evaluate("A1+1", lookup),
            Err(EvalError::NotANumber("hello".to_string()))
        );
    }

    #[test]
    fn test_comma_in_cell_text() {
        let lookup = |_: &str| Ok(Value::from("1,5"));
        assert_eq!(evaluate("A1+1", lookup), Err(EvalError::CommaInCell));
    }

    #[test]
    fn test_resolver_errors_propagate() {
        let lookup = |name: &str| Err(EvalError::CycleDetected(name.to_string()));
        assert_eq!(
            evaluate("1+B1", lookup),
            Err(EvalError::CycleDetected("B1".to_string()))
        );
    }
}
