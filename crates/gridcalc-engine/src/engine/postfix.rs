//! Infix to postfix conversion (shunting-yard).
//!
//! Equal precedence pops left-to-right. `inc`/`dec` sit on the operator stack
//! until the group they wrap is closed, then are emitted right after it, so
//! `inc(A1+1)` compiles to `A1 1 + inc`.

use std::collections::VecDeque;

use super::lexer::Token;
use crate::error::{EvalError, Result};

/// Stack priority of a token. Parentheses and operands rank lowest.
fn priority(token: &Token) -> u8 {
    match token {
        Token::Func(_) => 4,
        Token::Op(op) => op.precedence(),
        _ => 0,
    }
}

/// Reorder tokens so every operator follows its operands.
pub fn to_postfix(tokens: Vec<Token>) -> Result<VecDeque<Token>> {
    let mut output = VecDeque::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) | Token::Cell(_) => output.push_back(token),
            Token::Func(_) | Token::LParen => stack.push(token),
            Token::RParen => {
                loop {
                    match stack.pop() {
                        Some(Token::LParen) => break,
                        Some(top) => output.push_back(top),
                        None => return Err(EvalError::MismatchedParentheses),
                    }
                }
                if let Some(func @ Token::Func(_)) = stack.last().cloned() {
                    stack.pop();
                    output.push_back(func);
                }
            }
            Token::Op(op) => {
                while stack
                    .last()
                    .is_some_and(|top| priority(top) >= op.precedence())
                {
                    if let Some(top) = stack.pop() {
                        output.push_back(top);
                    }
                }
                stack.push(token);
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::LParen {
            return Err(EvalError::MismatchedParentheses);
        }
        output.push_back(top);
    }

    log::trace!(
        "compiled postfix: {}",
        output
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
    Ok(output)
}
