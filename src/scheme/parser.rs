// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/parser.rs

// Builds nested cons trees from a flat token stream, one tree per
// top level expression.

// <>

use super::core::{cons, list_from, nil, string_init, ValRef, Value};
use super::memmgt::Region;
use super::symtab::SP_QUOTE;
use super::tokenizer::{self, Token};
use super::SchemeErr;

/// Entry on the parser's accumulator stack
enum Item {
    /// An unmatched open parenthesis
    Open,
    /// A quote prefix still waiting for its datum
    Quote,
    /// A finished subtree
    Datum(ValRef),
}

/// Parses a token sequence into a list of top level expressions
///
/// Tokens accumulate on a stack until a close paren arrives; everything
/// back to the nearest unmatched open paren is then bundled into a
/// single list which replaces that span on the stack.
pub fn parse(reg: &mut Region, tokens: &[Token]) -> Result<ValRef, SchemeErr> {
    let mut stack: Vec<Item> = Vec::with_capacity(tokens.len());
    let mut depth: usize = 0;

    for tok in tokens {
        match tok {
            Token::Open => {
                stack.push(Item::Open);
                depth += 1;
            }
            Token::Quote => stack.push(Item::Quote),
            Token::Close => {
                let mut list = nil(reg);
                loop {
                    match stack.pop() {
                        None => {
                            return Err(SchemeErr::Syntax(
                                "too many close parentheses".to_string(),
                            ))
                        }
                        Some(Item::Open) => break,
                        Some(Item::Quote) => {
                            return Err(SchemeErr::Syntax("quote without datum".to_string()))
                        }
                        Some(Item::Datum(val)) => list = cons(reg, val, list),
                    }
                }
                depth -= 1;
                push_datum(reg, &mut stack, list);
            }
            atom => {
                let val = atom_value(reg, atom);
                push_datum(reg, &mut stack, val);
            }
        }
    }

    if depth != 0 {
        return Err(SchemeErr::Syntax(
            "unbalanced: not enough close parentheses".to_string(),
        ));
    }

    let mut exprs = Vec::with_capacity(stack.len());
    for item in stack {
        match item {
            Item::Datum(val) => exprs.push(val),
            _ => return Err(SchemeErr::Syntax("quote without datum".to_string())),
        }
    }

    log::trace!("parsed {} top level expressions", exprs.len());

    Ok(list_from(reg, &exprs))
}

/// Tokenizes and parses source text in one step
pub fn read(reg: &mut Region, code: &str) -> Result<ValRef, SchemeErr> {
    let tokens = tokenizer::tokenize(code)?;
    parse(reg, &tokens)
}

/// Pushes a completed datum, first wrapping it in any pending quotes
fn push_datum(reg: &mut Region, stack: &mut Vec<Item>, mut val: ValRef) {
    while let Some(Item::Quote) = stack.last() {
        stack.pop();
        let quote = reg.alloc(Value::Symbol(SP_QUOTE));
        let tail = nil(reg);
        let tail = cons(reg, val, tail);
        val = cons(reg, quote, tail);
    }

    stack.push(Item::Datum(val));
}

fn atom_value(reg: &mut Region, tok: &Token) -> ValRef {
    match tok {
        Token::Integer(i) => reg.alloc(Value::Integer(*i)),
        Token::Float(f) => reg.alloc(Value::Float(*f)),
        Token::Str(s) => string_init(reg, s),
        Token::Symbol(s) => reg.symbol(s),
        Token::Bool(b) => reg.alloc(Value::Bool(*b)),
        Token::Open | Token::Close | Token::Quote => unreachable!("structural token as atom"),
    }
}
