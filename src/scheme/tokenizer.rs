// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/tokenizer.rs

// Character level lexer: turns source text into the flat token
// sequence consumed by the parser.

// <>

use std::iter;
use std::str;

use super::SchemeErr;

/// A single lexical item
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open,
    Close,
    /// The `'` prefix
    Quote,
    Integer(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Bool(bool),
}

type Chars<'a> = iter::Peekable<str::Chars<'a>>;

/// Splits source text into tokens
pub fn tokenize(code: &str) -> Result<Vec<Token>, SchemeErr> {
    let mut out = Vec::new();
    // Accumulator for collecting token text
    let mut acc = String::new();
    let mut chars = code.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                chars.next();
                out.push(Token::Open);
            }
            ')' => {
                chars.next();
                out.push(Token::Close);
            }
            '\'' => {
                chars.next();
                out.push(Token::Quote);
            }
            ';' => while chars.next().map_or(false, |c| c != '\n') {},
            '"' => {
                chars.next();
                out.push(read_string(&mut chars, &mut acc)?);
                acc.clear();
            }
            _ if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                out.push(read_atom(&mut chars, &mut acc)?);
                acc.clear();
            }
        }
    }

    log::trace!("tokenized {} tokens", out.len());

    Ok(out)
}

fn read_string(chars: &mut Chars, acc: &mut String) -> Result<Token, SchemeErr> {
    loop {
        match chars.next() {
            None => return Err(SchemeErr::Syntax("string missing closing quote".to_string())),
            Some('"') => break,
            Some('\\') => match chars.next() {
                None => {
                    return Err(SchemeErr::Syntax("string missing closing quote".to_string()))
                }
                Some('n') => acc.push('\n'),
                Some('t') => acc.push('\t'),
                Some(esc @ ('\'' | '"' | '\\')) => acc.push(esc),
                Some(other) => {
                    acc.push('\\');
                    acc.push(other);
                }
            },
            Some(c) => acc.push(c),
        }
    }

    Ok(Token::Str(acc.clone()))
}

/// Reads a number, symbol or boolean, which run until whitespace or a
/// parenthesis
fn read_atom(chars: &mut Chars, acc: &mut String) -> Result<Token, SchemeErr> {
    while let Some(&c) = chars.peek() {
        if c == '(' || c == ')' || c.is_whitespace() {
            break;
        }
        acc.push(c);
        chars.next();
    }

    let text = acc.as_str();

    if number_p(text) {
        process_num(text)
    } else if symbol_p(text) {
        Ok(Token::Symbol(text.to_owned()))
    } else if text == "#t" {
        Ok(Token::Bool(true))
    } else if text == "#f" {
        Ok(Token::Bool(false))
    } else {
        Err(SchemeErr::Syntax(format!("'{}' untokenizable", text)))
    }
}

/// Optional sign, then digits with at most one decimal point
fn number_p(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);

    let mut digits = 0;
    let mut points = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }

    digits > 0 && points <= 1
}

fn initial_p(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(
            c,
            '!' | '$' | '%' | '&' | '*' | '/' | ':' | '<' | '=' | '>' | '?' | '~' | '_' | '^'
        )
}

fn subsequent_p(c: char) -> bool {
    initial_p(c) || c.is_ascii_digit() || matches!(c, '.' | '+' | '-')
}

fn symbol_p(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some('+') | Some('-') => text.len() == 1,
        Some(c) if initial_p(c) => chars.all(subsequent_p),
        _ => false,
    }
}

fn process_num(text: &str) -> Result<Token, SchemeErr> {
    if !text.contains('.') {
        text.parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| SchemeErr::Syntax(format!("integer '{}' out of range", text)))
    } else {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| SchemeErr::Syntax(format!("'{}' untokenizable", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    #[test]
    fn simple_expression() {
        let toks = tokenize("(+ 1 2.5)").unwrap();
        assert_eq!(
            toks,
            vec![Open, Symbol("+".into()), Integer(1), Float(2.5), Close]
        );
    }

    #[test]
    fn signed_numbers_and_symbols() {
        let toks = tokenize("-4 +7 -.5 - + -x").unwrap_err();
        assert!(matches!(toks, SchemeErr::Syntax(ref m) if m.contains("-x")));

        let toks = tokenize("-4 +7 -.5 - + x-1 null? let*").unwrap();
        assert_eq!(
            toks,
            vec![
                Integer(-4),
                Integer(7),
                Float(-0.5),
                Symbol("-".into()),
                Symbol("+".into()),
                Symbol("x-1".into()),
                Symbol("null?".into()),
                Symbol("let*".into()),
            ]
        );
    }

    #[test]
    fn booleans_strings_comments() {
        let toks = tokenize("#t #f ; ignored (\n \"a\\nb\\\"c\"").unwrap();
        assert_eq!(toks, vec![Bool(true), Bool(false), Str("a\nb\"c".into())]);
    }

    #[test]
    fn quote_prefix() {
        let toks = tokenize("'(a) 'b").unwrap();
        assert_eq!(
            toks,
            vec![
                Quote,
                Open,
                Symbol("a".into()),
                Close,
                Quote,
                Symbol("b".into())
            ]
        );
    }

    #[test]
    fn failures() {
        assert!(matches!(tokenize("\"open"), Err(SchemeErr::Syntax(_))));
        assert!(matches!(tokenize("#x"), Err(SchemeErr::Syntax(_))));
        assert!(matches!(tokenize("1.2.3"), Err(SchemeErr::Syntax(_))));
        assert!(matches!(tokenize("."), Err(SchemeErr::Syntax(_))));
        assert!(matches!(
            tokenize("99999999999999999999"),
            Err(SchemeErr::Syntax(_))
        ));
    }

    #[test]
    fn atoms_end_at_parens() {
        let toks = tokenize("(f(g))").unwrap();
        assert_eq!(
            toks,
            vec![
                Open,
                Symbol("f".into()),
                Open,
                Symbol("g".into()),
                Close,
                Close
            ]
        );
    }
}
