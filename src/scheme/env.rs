// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/env.rs

// Environments as chains of frames. Each frame maps symbols to values
// and links to the frame it was created in.

// <>

use super::core::{Frame, FrameRef, ValRef};
use super::memmgt::Region;
use super::symtab::SymId;
use super::SchemeErr;

/// Creates the single parentless frame for a run
pub fn env_create(reg: &mut Region) -> FrameRef {
    reg.alloc_frame(Frame::new(None))
}

/// Creates a child frame of `parent` holding the given bindings
pub fn env_extend(reg: &mut Region, parent: FrameRef, bindings: Vec<(SymId, ValRef)>) -> FrameRef {
    reg.alloc_frame(Frame::with_bindings(Some(parent), bindings))
}

/// Adds a binding to a frame, shadowing any earlier binding of the
/// same name in that frame
pub fn env_define(reg: &mut Region, frame: FrameRef, sym: SymId, val: ValRef) {
    reg.frame_mut(frame).bindings.push((sym, val));
}

/// Finds the value bound to a symbol, searching outward through the
/// chain of parent frames
pub fn env_lookup_by_id(reg: &Region, mut frame: FrameRef, sym: SymId) -> Option<ValRef> {
    loop {
        let layer = reg.frame(frame);

        if let Some((_, val)) = layer.bindings.iter().rev().find(|(id, _)| *id == sym) {
            return Some(*val);
        }

        frame = layer.parent?;
    }
}

/// Same as `env_lookup_by_id`, but a miss is an unbound symbol error
pub fn env_lookup(reg: &Region, frame: FrameRef, sym: SymId) -> Result<ValRef, SchemeErr> {
    env_lookup_by_id(reg, frame, sym)
        .ok_or_else(|| SchemeErr::Unbound(reg.sym_name(sym).to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::core::{int_init, Value};

    fn int_of(reg: &Region, v: ValRef) -> i64 {
        match reg.get(v) {
            Value::Integer(i) => *i,
            other => panic!("expected integer, got {:?}", other),
        }
    }

    #[test]
    fn define_and_lookup() {
        let mut reg = Region::new();
        let global = env_create(&mut reg);
        let x = reg.intern("x");

        let one = int_init(&mut reg, 1);
        env_define(&mut reg, global, x, one);

        assert_eq!(env_lookup(&reg, global, x).unwrap(), one);
    }

    #[test]
    fn redefinition_shadows() {
        let mut reg = Region::new();
        let global = env_create(&mut reg);
        let x = reg.intern("x");

        let one = int_init(&mut reg, 1);
        let two = int_init(&mut reg, 2);
        env_define(&mut reg, global, x, one);
        env_define(&mut reg, global, x, two);

        assert_eq!(int_of(&reg, env_lookup(&reg, global, x).unwrap()), 2);
        // the old binding is still recorded
        assert_eq!(reg.frame(global).bindings.len(), 2);
    }

    #[test]
    fn lookup_ascends_chain() {
        let mut reg = Region::new();
        let global = env_create(&mut reg);
        let (x, y) = (reg.intern("x"), reg.intern("y"));

        let one = int_init(&mut reg, 1);
        let two = int_init(&mut reg, 2);
        let three = int_init(&mut reg, 3);
        env_define(&mut reg, global, x, one);
        env_define(&mut reg, global, y, two);

        let child = env_extend(&mut reg, global, vec![(x, three)]);
        let grandchild = env_extend(&mut reg, child, vec![]);

        assert_eq!(int_of(&reg, env_lookup(&reg, grandchild, x).unwrap()), 3);
        assert_eq!(int_of(&reg, env_lookup(&reg, grandchild, y).unwrap()), 2);
        // parent unaffected by the child's binding
        assert_eq!(int_of(&reg, env_lookup(&reg, global, x).unwrap()), 1);
    }

    #[test]
    fn unbound() {
        let mut reg = Region::new();
        let global = env_create(&mut reg);
        let child = env_extend(&mut reg, global, vec![]);
        let z = reg.intern("zed");

        match env_lookup(&reg, child, z) {
            Err(SchemeErr::Unbound(name)) => assert_eq!(name, "zed"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
