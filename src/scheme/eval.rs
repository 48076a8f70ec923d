// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/eval.rs

// Recursive evaluator for Rivet. Implements the special forms,
// procedure application and dispatch to native procedures.

// <>

use super::core::*;
use super::env::{env_define, env_extend, env_lookup};
use super::memmgt::Region;
use super::symtab::{
    special_form_p, SymId, SP_DEFINE, SP_IF, SP_LAMBDA, SP_LET, SP_LETREC, SP_LET_STAR, SP_QUOTE,
};
use super::SchemeErr;

/// Evaluates an expression in the given environment
pub fn eval(reg: &mut Region, env: FrameRef, expr: ValRef) -> Result<ValRef, SchemeErr> {
    match reg.get(expr) {
        Value::Integer(_) | Value::Float(_) | Value::Str(_) | Value::Bool(_) => Ok(expr),
        Value::Symbol(id) => {
            let id = *id;
            env_lookup(reg, env, id)
        }
        Value::Pair { car, cdr } => {
            let (operator, args) = (*car, *cdr);

            if let Value::Symbol(id) = reg.get(operator) {
                let id = *id;
                if special_form_p(id) {
                    log::trace!("special form {}", reg.sym_name(id));
                    return eval_special(reg, env, id, args);
                }
            }

            let proc = eval(reg, env, operator)?;
            let args = eval_each(reg, env, args)?;
            apply(reg, proc, args)
        }
        other => Err(SchemeErr::Application(other.type_name())),
    }
}

/// Applies a procedure to a list of already evaluated arguments
pub fn apply(reg: &mut Region, proc: ValRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    match reg.get(proc) {
        Value::Primitive { name, func } => {
            let (name, func) = (*name, *func);
            log::trace!("applying primitive {}", name);
            func(reg, args)
        }
        Value::Closure { params, body, env } => {
            let (params, body, env) = (*params, *body, *env);

            let names = list_to_vec(reg, params)?;
            let vals = list_to_vec(reg, args)?;

            if vals.len() > names.len() {
                return Err(SchemeErr::TooManyArgs {
                    expected: names.len(),
                    got: vals.len(),
                });
            } else if vals.len() < names.len() {
                return Err(SchemeErr::TooFewArgs {
                    expected: names.len(),
                    got: vals.len(),
                });
            }

            let mut bindings = Vec::with_capacity(names.len());
            for (name, val) in names.into_iter().zip(vals) {
                bindings.push((sym_get_id(reg, name)?, val));
            }

            // the new frame hangs off the closure's frame, not the caller's
            let frame = env_extend(reg, env, bindings);
            log::trace!("applying closure in {:?} (parent {:?})", frame, env);

            eval_body(reg, frame, body)
        }
        other => Err(SchemeErr::NotCallable(other.type_name())),
    }
}

/// Evaluates each element of an argument list from left to right,
/// returning a new list of the results
fn eval_each(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let exprs = list_to_vec(reg, args)?;

    let mut vals = Vec::with_capacity(exprs.len());
    for expr in exprs {
        vals.push(eval(reg, env, expr)?);
    }

    Ok(list_from(reg, &vals))
}

/// Evaluates a non-empty sequence of body expressions, returning the
/// value of the last
fn eval_body(reg: &mut Region, env: FrameRef, body: ValRef) -> Result<ValRef, SchemeErr> {
    let exprs = list_to_vec(reg, body)?;

    let mut out = None;
    for expr in exprs {
        out = Some(eval(reg, env, expr)?);
    }

    out.ok_or_else(|| SchemeErr::Arity("empty body".to_string()))
}

fn eval_special(
    reg: &mut Region,
    env: FrameRef,
    form: SymId,
    args: ValRef,
) -> Result<ValRef, SchemeErr> {
    match form {
        SP_QUOTE => eval_quote(reg, args),
        SP_IF => eval_if(reg, env, args),
        SP_DEFINE => eval_define(reg, env, args),
        SP_LAMBDA => eval_lambda(reg, env, args),
        SP_LET => eval_let(reg, env, args),
        SP_LET_STAR => eval_let_star(reg, env, args),
        SP_LETREC => eval_letrec(reg, env, args),
        _ => unreachable!("unhandled special form {:?}", form),
    }
}

/// The positions of a special form, which must be a proper list
fn form_parts(reg: &Region, args: ValRef, name: &str) -> Result<Vec<ValRef>, SchemeErr> {
    list_to_vec(reg, args).map_err(|_| SchemeErr::Arity(format!("malformed {} form", name)))
}

fn sym_get_id(reg: &Region, loc: ValRef) -> Result<SymId, SchemeErr> {
    match reg.get(loc) {
        Value::Symbol(id) => Ok(*id),
        _ => Err(SchemeErr::Arity("malformed parameter list".to_string())),
    }
}

fn eval_quote(reg: &mut Region, args: ValRef) -> Result<ValRef, SchemeErr> {
    let parts = form_parts(reg, args, "quote")?;
    match parts.as_slice() {
        [datum] => Ok(*datum),
        _ => Err(SchemeErr::Arity("quote takes exactly one datum".to_string())),
    }
}

fn eval_if(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let parts = form_parts(reg, args, "if")?;
    let [test, consequent, alternate] = parts.as_slice() else {
        return Err(SchemeErr::Arity(
            "if needs a test, a consequent and an alternate".to_string(),
        ));
    };
    let (consequent, alternate) = (*consequent, *alternate);

    let test = eval(reg, env, *test)?;
    match reg.get(test) {
        Value::Bool(true) => eval(reg, env, consequent),
        Value::Bool(false) => eval(reg, env, alternate),
        _ => Err(SchemeErr::Type("if test not boolean".to_string())),
    }
}

fn eval_define(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let parts = form_parts(reg, args, "define")?;
    if parts.len() > 2 {
        return Err(SchemeErr::Arity("too many arguments for define".to_string()));
    }
    let [target, expr] = parts.as_slice() else {
        return Err(SchemeErr::Arity("define needs a name and a value".to_string()));
    };
    let expr = *expr;

    let Value::Symbol(id) = reg.get(*target) else {
        return Err(SchemeErr::Type("define target must be a symbol".to_string()));
    };
    let id = *id;

    let val = eval(reg, env, expr)?;
    env_define(reg, env, id, val);

    Ok(void(reg))
}

fn eval_lambda(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let parts = form_parts(reg, args, "lambda")?;
    if parts.len() < 2 {
        return Err(SchemeErr::Arity(
            "lambda needs a parameter list and a body".to_string(),
        ));
    }

    let params = parts[0];
    let names = list_to_vec(reg, params)
        .map_err(|_| SchemeErr::Arity("malformed parameter list".to_string()))?;
    for name in names {
        sym_get_id(reg, name)?;
    }

    let body = cdr(reg, args)?;

    Ok(reg.alloc(Value::Closure { params, body, env }))
}

/// Splits a let-style form into its binding clauses and its body
fn let_parts(
    reg: &Region,
    args: ValRef,
    name: &str,
) -> Result<(Vec<(SymId, ValRef)>, ValRef), SchemeErr> {
    let parts = form_parts(reg, args, name)?;
    if parts.len() < 2 {
        return Err(SchemeErr::Arity(format!("{} needs bindings and a body", name)));
    }

    let clauses = list_to_vec(reg, parts[0])
        .map_err(|_| SchemeErr::BindingShape(format!("bindings for {} must be a list", name)))?;

    let mut out = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let shape_err = || SchemeErr::BindingShape(format!("{} binding must be (symbol expr)", name));

        let pair = list_to_vec(reg, clause).map_err(|_| shape_err())?;
        match (pair.as_slice(), pair.first().map(|v| reg.get(*v))) {
            ([_, expr], Some(Value::Symbol(id))) => out.push((*id, *expr)),
            _ => return Err(shape_err()),
        }
    }

    Ok((out, cdr(reg, args)?))
}

fn eval_let(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let (clauses, body) = let_parts(reg, args, "let")?;

    // every value sees only the outer frame
    let mut bindings = Vec::with_capacity(clauses.len());
    for (id, expr) in clauses {
        bindings.push((id, eval(reg, env, expr)?));
    }

    let frame = env_extend(reg, env, bindings);
    eval_body(reg, frame, body)
}

fn eval_let_star(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let (clauses, body) = let_parts(reg, args, "let*")?;

    let mut frame = env;
    for (id, expr) in clauses {
        let val = eval(reg, frame, expr)?;
        frame = env_extend(reg, frame, vec![(id, val)]);
    }

    if frame == env {
        frame = env_extend(reg, env, Vec::new());
    }

    eval_body(reg, frame, body)
}

fn eval_letrec(reg: &mut Region, env: FrameRef, args: ValRef) -> Result<ValRef, SchemeErr> {
    let (clauses, body) = let_parts(reg, args, "letrec")?;

    // values are evaluated inside the new frame, whose bindings only
    // appear once all of them are done
    let frame = env_extend(reg, env, Vec::new());

    let mut bindings = Vec::with_capacity(clauses.len());
    for (id, expr) in clauses {
        bindings.push((id, eval(reg, frame, expr)?));
    }
    reg.frame_mut(frame).bindings.extend(bindings);

    eval_body(reg, frame, body)
}
