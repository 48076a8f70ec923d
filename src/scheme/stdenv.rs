// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/stdenv.rs

// Primitive procedures available to every Rivet program, and their
// installation into the global frame.

// <>

use super::core::*;
use super::env::env_define;
use super::memmgt::Region;
use super::SchemeErr;

/// Generates a table of primitive procedures
///
/// Each entry names the procedure and gives a body which sees the
/// region and the evaluated argument list under the chosen identifiers.
macro_rules! scheme_fn {
    ( const $array:ident; $reg:ident $args:ident;
      $( $name:literal $body:block )+
    ) => {
        pub const $array: &[(&str, NativeFn)] =
            &[$(($name, |
                _reg: &mut Region,
                _args: ValRef,
              | -> Result<ValRef, SchemeErr> {
                    let $reg = _reg;
                    let $args = _args;

                    $body
                })),+];
    };
}

scheme_fn! {
    const PRIMITIVES;
    reg args;

    "+" {
        // (+) is positive zero
        let sum = num_args(reg, args, "+")?
            .into_iter()
            .fold(0.0, |acc, n| acc + n);
        Ok(float_init(reg, sum))
    }

    "-" {
        let nums = num_args(reg, args, "-")?;
        let (first, rest) = nums
            .split_first()
            .ok_or_else(|| SchemeErr::InvalidArgument("- needs at least one argument".to_string()))?;

        let diff = rest.iter().fold(*first, |acc, n| acc - n);
        Ok(float_init(reg, diff))
    }

    "*" {
        let prod = num_args(reg, args, "*")?
            .into_iter()
            .fold(1.0, |acc, n| acc * n);
        Ok(float_init(reg, prod))
    }

    "/" {
        let [fst, snd] = exact_args::<2>(reg, args, "/")?;

        match (reg.get(fst), reg.get(snd)) {
            (Value::Integer(a), Value::Integer(b)) => {
                let (a, b) = (*a, *b);
                if b == 0 {
                    return Err(SchemeErr::DivisionByZero);
                }
                Ok(int_init(reg, a.wrapping_div(b)))
            }
            _ => {
                let (a, b) = (num_of(reg, fst, "/")?, num_of(reg, snd, "/")?);
                if b == 0.0 {
                    return Err(SchemeErr::DivisionByZero);
                }
                Ok(float_init(reg, a / b))
            }
        }
    }

    "modulo" {
        let [fst, snd] = exact_args::<2>(reg, args, "modulo")?;

        match (reg.get(fst), reg.get(snd)) {
            (Value::Integer(a), Value::Integer(b)) => {
                let (a, b) = (*a, *b);
                if b == 0 {
                    return Err(SchemeErr::DivisionByZero);
                }
                Ok(int_init(reg, a.wrapping_rem(b)))
            }
            (a, b) => Err(SchemeErr::InvalidArgument(format!(
                "modulo expects integers, got {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    "=" {
        let (a, b) = compare_args(reg, args, "=")?;
        Ok(bool_init(reg, a == b))
    }

    "<" {
        let (a, b) = compare_args(reg, args, "<")?;
        Ok(bool_init(reg, a < b))
    }

    ">" {
        let (a, b) = compare_args(reg, args, ">")?;
        Ok(bool_init(reg, a > b))
    }

    "<=" {
        let (a, b) = compare_args(reg, args, "<=")?;
        #[allow(clippy::neg_cmp_op_on_partial_ord)]
        let out = !(a > b);
        Ok(bool_init(reg, out))
    }

    ">=" {
        let (a, b) = compare_args(reg, args, ">=")?;
        #[allow(clippy::neg_cmp_op_on_partial_ord)]
        let out = !(a < b);
        Ok(bool_init(reg, out))
    }

    "cons" {
        let [fst, snd] = exact_args::<2>(reg, args, "cons")?;
        Ok(cons(reg, fst, snd))
    }

    "car" {
        let [pair] = exact_args::<1>(reg, args, "car")?;
        car(reg, pair)
    }

    "cdr" {
        let [pair] = exact_args::<1>(reg, args, "cdr")?;
        cdr(reg, pair)
    }

    "null?" {
        let [val] = exact_args::<1>(reg, args, "null?")?;
        let out = nil_p(reg, val);
        Ok(bool_init(reg, out))
    }
}

/// Binds every primitive in the given frame
pub fn install(reg: &mut Region, frame: FrameRef) {
    for &(name, func) in PRIMITIVES {
        let id = reg.intern(name);
        let proc = reg.alloc(Value::Primitive { name, func });
        env_define(reg, frame, id, proc);
    }

    log::trace!("installed {} primitives", PRIMITIVES.len());
}

/// Unpacks an argument list of exactly `N` elements
fn exact_args<const N: usize>(
    reg: &Region,
    args: ValRef,
    name: &str,
) -> Result<[ValRef; N], SchemeErr> {
    let vals = list_to_vec(reg, args)?;
    let got = vals.len();

    vals.try_into().map_err(|_| {
        SchemeErr::InvalidArgument(format!(
            "{} takes {} argument{}, got {}",
            name,
            N,
            if N == 1 { "" } else { "s" },
            got
        ))
    })
}

fn num_of(reg: &Region, val: ValRef, name: &str) -> Result<f64, SchemeErr> {
    match reg.get(val) {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(SchemeErr::InvalidArgument(format!(
            "{} expects numbers, got {}",
            name,
            other.type_name()
        ))),
    }
}

fn num_args(reg: &Region, args: ValRef, name: &str) -> Result<Vec<f64>, SchemeErr> {
    list_to_vec(reg, args)?
        .into_iter()
        .map(|v| num_of(reg, v, name))
        .collect()
}

fn compare_args(reg: &Region, args: ValRef, name: &str) -> Result<(f64, f64), SchemeErr> {
    let [fst, snd] = exact_args::<2>(reg, args, name)?;
    Ok((num_of(reg, fst, name)?, num_of(reg, snd, name)?))
}
