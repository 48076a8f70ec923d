// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/core.rs

// Core value representation and the list utilities through which all
// structured data is built and traversed.

// <>

use std::fmt;

use super::memmgt::Region;
use super::symtab::SymId;
use super::SchemeErr;

/// Handle to a value stored in a `Region`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValRef(u32);

/// Handle to a frame stored in a `Region`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRef(u32);

impl ValRef {
    pub(super) fn from_index(idx: usize) -> Self {
        Self(u32::try_from(idx).expect("value region exhausted"))
    }

    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

impl FrameRef {
    pub(super) fn from_index(idx: usize) -> Self {
        Self(u32::try_from(idx).expect("frame region exhausted"))
    }

    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ValRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Debug for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Signature of every primitive procedure: the region plus the list of
/// evaluated arguments
pub type NativeFn = fn(&mut Region, ValRef) -> Result<ValRef, SchemeErr>;

/// Every runtime datum is one of these
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Str(String),
    Symbol(SymId),
    Bool(bool),
    /// The empty list
    Empty,
    Pair {
        car: ValRef,
        cdr: ValRef,
    },
    Closure {
        /// List of parameter symbols
        params: ValRef,
        /// List of body expressions, evaluated in order
        body: ValRef,
        env: FrameRef,
    },
    Primitive {
        name: &'static str,
        func: NativeFn,
    },
    /// Result of a definition; never printed
    Void,
}

impl Value {
    /// Name of this value's type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Bool(_) => "boolean",
            Value::Empty => "empty list",
            Value::Pair { .. } => "pair",
            Value::Closure { .. } | Value::Primitive { .. } => "procedure",
            Value::Void => "void",
        }
    }

    pub fn procedure_p(&self) -> bool {
        matches!(self, Value::Closure { .. } | Value::Primitive { .. })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Float(x) => write!(f, "Float({:?})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Symbol(id) => write!(f, "Symbol({:?})", id),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Empty => write!(f, "Empty"),
            Value::Pair { car, cdr } => write!(f, "Pair({:?} . {:?})", car, cdr),
            Value::Closure { env, .. } => write!(f, "Closure(<{:?}>)", env),
            Value::Primitive { name, .. } => write!(f, "Primitive({})", name),
            Value::Void => write!(f, "Void"),
        }
    }
}

/// A lexical scope: ordered bindings plus the enclosing scope
///
/// Later bindings shadow earlier ones with the same name; nothing is
/// ever removed.
#[derive(Debug, Clone)]
pub struct Frame {
    pub bindings: Vec<(SymId, ValRef)>,
    pub parent: Option<FrameRef>,
}

impl Frame {
    pub fn new(parent: Option<FrameRef>) -> Self {
        Self {
            bindings: Vec::new(),
            parent,
        }
    }

    pub fn with_bindings(parent: Option<FrameRef>, bindings: Vec<(SymId, ValRef)>) -> Self {
        Self { bindings, parent }
    }
}

// Constructors

pub fn nil(reg: &mut Region) -> ValRef {
    reg.alloc(Value::Empty)
}

pub fn void(reg: &mut Region) -> ValRef {
    reg.alloc(Value::Void)
}

pub fn bool_init(reg: &mut Region, val: bool) -> ValRef {
    reg.alloc(Value::Bool(val))
}

pub fn int_init(reg: &mut Region, val: i64) -> ValRef {
    reg.alloc(Value::Integer(val))
}

pub fn float_init(reg: &mut Region, val: f64) -> ValRef {
    reg.alloc(Value::Float(val))
}

pub fn string_init(reg: &mut Region, val: &str) -> ValRef {
    reg.alloc(Value::Str(val.to_owned()))
}

// List utilities

pub fn cons(reg: &mut Region, car: ValRef, cdr: ValRef) -> ValRef {
    reg.alloc(Value::Pair { car, cdr })
}

pub fn nil_p(reg: &Region, loc: ValRef) -> bool {
    matches!(reg.get(loc), Value::Empty)
}

pub fn pair_p(reg: &Region, loc: ValRef) -> bool {
    matches!(reg.get(loc), Value::Pair { .. })
}

/// Splits a pair into its car and cdr, if it is one
pub fn pair_get(reg: &Region, loc: ValRef) -> Option<(ValRef, ValRef)> {
    match reg.get(loc) {
        Value::Pair { car, cdr } => Some((*car, *cdr)),
        _ => None,
    }
}

pub fn car(reg: &Region, loc: ValRef) -> Result<ValRef, SchemeErr> {
    pair_get(reg, loc)
        .map(|(car, _)| car)
        .ok_or_else(|| SchemeErr::Type(format!("car of non-pair {}", reg.get(loc).type_name())))
}

pub fn cdr(reg: &Region, loc: ValRef) -> Result<ValRef, SchemeErr> {
    pair_get(reg, loc)
        .map(|(_, cdr)| cdr)
        .ok_or_else(|| SchemeErr::Type(format!("cdr of non-pair {}", reg.get(loc).type_name())))
}

/// Returns a new list with the elements of `list` in reverse order
///
/// Elements are shared, not copied. An improper tail is dropped.
pub fn reverse(reg: &mut Region, list: ValRef) -> ValRef {
    let mut out = nil(reg);
    let mut cur = list;

    while let Some((car, cdr)) = pair_get(reg, cur) {
        out = cons(reg, car, out);
        cur = cdr;
    }

    out
}

/// Collects the elements of a proper list
///
/// Fails if the chain of pairs ends in anything other than the empty
/// list.
pub fn list_to_vec(reg: &Region, list: ValRef) -> Result<Vec<ValRef>, SchemeErr> {
    let mut out = Vec::new();
    let mut cur = list;

    loop {
        match reg.get(cur) {
            Value::Pair { car, cdr } => {
                out.push(*car);
                cur = *cdr;
            }
            Value::Empty => return Ok(out),
            other => {
                return Err(SchemeErr::InvalidArgument(format!(
                    "improper list ending in {}",
                    other.type_name()
                )))
            }
        }
    }
}

/// Number of elements in a proper list
pub fn length(reg: &Region, list: ValRef) -> Result<usize, SchemeErr> {
    let mut len = 0;
    let mut cur = list;

    loop {
        match reg.get(cur) {
            Value::Pair { cdr, .. } => {
                len += 1;
                cur = *cdr;
            }
            Value::Empty => return Ok(len),
            other => {
                return Err(SchemeErr::InvalidArgument(format!(
                    "improper list ending in {}",
                    other.type_name()
                )))
            }
        }
    }
}

/// Builds a proper list from a slice of handles, preserving order
pub fn list_from(reg: &mut Region, items: &[ValRef]) -> ValRef {
    let mut out = nil(reg);
    for item in items.iter().rev() {
        out = cons(reg, *item, out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(reg: &mut Region, vals: &[i64]) -> ValRef {
        let items: Vec<ValRef> = vals.iter().map(|i| int_init(reg, *i)).collect();
        list_from(reg, &items)
    }

    fn as_ints(reg: &Region, list: ValRef) -> Vec<i64> {
        list_to_vec(reg, list)
            .unwrap()
            .into_iter()
            .map(|v| match reg.get(v) {
                Value::Integer(i) => *i,
                _ => panic!("not an integer"),
            })
            .collect()
    }

    #[test]
    fn cons_car_cdr() {
        let mut reg = Region::new();

        let a = int_init(&mut reg, 1);
        let b = int_init(&mut reg, 2);
        let pair = cons(&mut reg, a, b);

        assert_eq!(car(&reg, pair).unwrap(), a);
        assert_eq!(cdr(&reg, pair).unwrap(), b);
        assert!(pair_p(&reg, pair));
        assert!(!nil_p(&reg, pair));
    }

    #[test]
    fn car_of_empty_fails() {
        let mut reg = Region::new();
        let empty = nil(&mut reg);

        assert!(nil_p(&reg, empty));
        assert!(matches!(car(&reg, empty), Err(SchemeErr::Type(_))));
        assert!(matches!(cdr(&reg, empty), Err(SchemeErr::Type(_))));
    }

    #[test]
    fn reverse_shares_elements() {
        let mut reg = Region::new();

        let list = ints(&mut reg, &[1, 2, 3]);
        let rev = reverse(&mut reg, list);

        assert_eq!(as_ints(&reg, rev), vec![3, 2, 1]);
        // same element handles, not copies
        let fwd = list_to_vec(&reg, list).unwrap();
        let bwd = list_to_vec(&reg, rev).unwrap();
        assert_eq!(fwd[0], bwd[2]);

        let empty = nil(&mut reg);
        let rev = reverse(&mut reg, empty);
        assert!(nil_p(&reg, rev));
    }

    #[test]
    fn length_and_improper() {
        let mut reg = Region::new();

        let list = ints(&mut reg, &[4, 5, 6, 7]);
        assert_eq!(length(&reg, list).unwrap(), 4);

        let a = int_init(&mut reg, 1);
        let b = int_init(&mut reg, 2);
        let dotted = cons(&mut reg, a, b);
        assert!(matches!(length(&reg, dotted), Err(SchemeErr::InvalidArgument(_))));
        assert!(list_to_vec(&reg, dotted).is_err());
    }
}
