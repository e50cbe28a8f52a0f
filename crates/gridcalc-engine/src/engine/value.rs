//! Values flowing through the evaluator.
//!
//! A [`Value`] is either an exact decimal number or a piece of text. Text only
//! becomes a number at operator boundaries, through [`Value::to_number`].

use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{EvalError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(Decimal),
    Text(String),
}

impl Value {
    pub fn zero() -> Value {
        Value::Number(Decimal::ZERO)
    }

    /// Parse stored literal text: a number when it reads as one, text otherwise.
    pub fn from_literal(text: &str) -> Value {
        match parse_decimal(text) {
            Some(n) => Value::Number(n),
            None => Value::Text(text.to_string()),
        }
    }

    /// Coerce to a number.
    ///
    /// Blank text is zero. Text containing a comma is rejected outright, since
    /// only `.` is accepted as the decimal separator.
    pub fn to_number(&self) -> Result<Decimal> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) => {
                if s.trim().is_empty() {
                    return Ok(Decimal::ZERO);
                }
                if s.contains(',') {
                    return Err(EvalError::CommaNotAllowed);
                }
                parse_decimal(s).ok_or_else(|| EvalError::NotANumber(s.clone()))
            }
        }
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

fn number_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(r"^([+-]?)([0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?$")
            .expect("valid number regex")
    })
}

/// Parse a decimal number using `.` as the only separator.
///
/// Surrounding whitespace, a leading sign and an exponent are accepted.
/// Group separators, commas and anything else make the parse fail.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let caps = number_re().captures(text.trim())?;
    let sign = &caps[1];
    let int_part = &caps[2];
    let frac_part = caps.get(3).map_or("", |m| m.as_str());
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut mantissa = String::with_capacity(int_part.len() + frac_part.len() + 3);
    if sign == "-" {
        mantissa.push('-');
    }
    mantissa.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        mantissa.push('.');
        mantissa.push_str(frac_part);
    }

    match caps.get(4) {
        Some(exp) => {
            let exp = exp.as_str().trim_start_matches('+');
            Decimal::from_scientific(&format!("{}e{}", mantissa, exp)).ok()
        }
        None => Decimal::from_str(&mantissa).ok(),
    }
}
