//! Formula tokenizer.
//!
//! A single case-insensitive regex scan splits a formula into [`Token`]s.
//! The scan must account for every non-whitespace character of the input,
//! otherwise the formula is rejected with [`EvalError::InvalidCharacters`].

use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{EvalError, Result};

/// Binary operators, from arithmetic to comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    IntDiv,
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
}

impl Operator {
    fn from_symbol(symbol: &str) -> Option<Operator> {
        Some(match symbol {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "mod" => Operator::Mod,
            "div" => Operator::IntDiv,
            "=" => Operator::Eq,
            "<" => Operator::Lt,
            ">" => Operator::Gt,
            "<=" => Operator::Le,
            ">=" => Operator::Ge,
            "<>" => Operator::Ne,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "mod",
            Operator::IntDiv => "div",
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Ne => "<>",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Mul | Operator::Div | Operator::Mod | Operator::IntDiv => 3,
            Operator::Add | Operator::Sub => 2,
            Operator::Eq
            | Operator::Lt
            | Operator::Gt
            | Operator::Le
            | Operator::Ge
            | Operator::Ne => 1,
        }
    }
}

/// Prefix pseudo-functions. Each must wrap a parenthesised group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Inc,
    Dec,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Inc => "inc",
            Function::Dec => "dec",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(Decimal),
    /// Upper-cased cell name, e.g. `B12`.
    Cell(String),
    Op(Operator),
    Func(Function),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Cell(name) => f.write_str(name),
            Token::Op(op) => f.write_str(op.symbol()),
            Token::Func(func) => f.write_str(func.name()),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?<op>mod|div|inc|dec|<>|<=|>=|[+\-*/=<>()])|(?<cell>[a-z]+[0-9]+)|(?<num>[0-9]+(?:\.[0-9]+)?)",
        )
        .expect("valid token regex")
    })
}

/// Split a formula body (without the leading `=`) into tokens.
///
/// Spaces, tabs and line breaks are ignored. A comma anywhere in the input
/// fails before any other check.
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    if expression.contains(',') {
        return Err(EvalError::CommaNotAllowed);
    }

    let clean: String = expression
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\r' | '\n'))
        .collect();

    let mut tokens = Vec::new();
    let mut covered = 0usize;
    for caps in token_re().captures_iter(&clean) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        covered += whole.len();

        let token = if let Some(op) = caps.name("op") {
            classify_symbol(&op.as_str().to_ascii_lowercase())?
        } else if let Some(cell) = caps.name("cell") {
            Token::Cell(cell.as_str().to_ascii_uppercase())
        } else {
            Token::Number(Decimal::from_str(whole).map_err(|_| EvalError::Overflow)?)
        };
        tokens.push(token);
    }

    if covered != clean.len() {
        return Err(EvalError::InvalidCharacters);
    }

    for (i, token) in tokens.iter().enumerate() {
        if matches!(token, Token::Func(_)) && tokens.get(i + 1) != Some(&Token::LParen) {
            return Err(EvalError::FunctionRequiresParens);
        }
    }

    Ok(tokens)
}

fn classify_symbol(symbol: &str) -> Result<Token> {
    Ok(match symbol {
        "(" => Token::LParen,
        ")" => Token::RParen,
        "inc" => Token::Func(Function::Inc),
        "dec" => Token::Func(Function::Dec),
        other => Token::Op(Operator::from_symbol(other).ok_or(EvalError::InvalidCharacters)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: i64) -> Token {
        Token::Number(Decimal::from(n))
    }

    #[test]
    fn test_tokenize_arithmetic() {
        let tokens = tokenize("2+3*4").unwrap();
        assert_eq!(
            tokens,
            vec![
                num(2),
                Token::Op(Operator::Add),
                num(3),
                Token::Op(Operator::Mul),
                num(4)
            ]
        );
    }

    #[test]
    fn test_tokenize_ignores_whitespace() {
        assert_eq!(
            tokenize(" 1 \t+\r\n2 ").unwrap(),
            vec![num(1), Token::Op(Operator::Add), num(2)]
        );
    }

    #[test]
    fn test_tokenize_word_operators_case_insensitive() {
        let tokens = tokenize("10 MOD 3 Div 2").unwrap();
        assert_eq!(tokens[1], Token::Op(Operator::Mod));
        assert_eq!(tokens[3], Token::Op(Operator::IntDiv));
    }

    #[test]
    fn test_tokenize_two_char_comparisons() {
        let tokens = tokenize("1<>2<=3>=4").unwrap();
        assert_eq!(tokens[1], Token::Op(Operator::Ne));
        assert_eq!(tokens[3], Token::Op(Operator::Le));
        assert_eq!(tokens[5], Token::Op(Operator::Ge));
    }

    #[test]
    fn test_tokenize_cell_refs_are_uppercased() {
        let tokens = tokenize("a1+Bc12").unwrap();
        assert_eq!(tokens[0], Token::Cell("A1".to_string()));
        assert_eq!(tokens[2], Token::Cell("BC12".to_string()));
    }

    #[test]
    fn test_tokenize_decimal_literal() {
        let tokens = tokenize("1.25*2").unwrap();
        assert_eq!(tokens[0], Token::Number(Decimal::from_str("1.25").unwrap()));
    }

    #[test]
    fn test_tokenize_function() {
        let tokens = tokenize("inc(A1)").unwrap();
        assert_eq!(tokens[0], Token::Func(Function::Inc));
        assert_eq!(tokens[1], Token::LParen);
    }

    #[test]
    fn test_tokenize_rejects_comma_first() {
        // A comma wins even over otherwise invalid characters.
        assert_eq!(tokenize("1,5+$"), Err(EvalError::CommaNotAllowed));
    }

    #[test]
    fn test_tokenize_rejects_stray_characters() {
        assert_eq!(tokenize("1 + $"), Err(EvalError::InvalidCharacters));
        assert_eq!(tokenize("5.+1"), Err(EvalError::InvalidCharacters));
        assert_eq!(tokenize("hello"), Err(EvalError::InvalidCharacters));
        assert_eq!(tokenize("2^3"), Err(EvalError::InvalidCharacters));
    }

    #[test]
    fn test_tokenize_function_requires_parens() {
        assert_eq!(tokenize("inc 5"), Err(EvalError::FunctionRequiresParens));
        assert_eq!(tokenize("1+dec"), Err(EvalError::FunctionRequiresParens));
        assert!(tokenize("dec(1)").is_ok());
    }

    #[test]
    fn test_tokenize_empty_body() {
        assert_eq!(tokenize("").unwrap(), Vec::<Token>::new());
    }
}
