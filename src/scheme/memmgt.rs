// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/memmgt.rs

// Memory management for Rivet. A region owns every value, frame and
// interned name created during a run; nothing is freed individually,
// the whole region is released at once on exit or fatal error.

// <>

use super::core::{Frame, FrameRef, ValRef, Value};
use super::symtab::{SymId, SymbolTable};

/// Initial number of value slots reserved by a fresh region
const VALUE_ZONE_SIZE: usize = 4096;
/// Initial number of frame slots reserved by a fresh region
const FRAME_ZONE_SIZE: usize = 256;

/// Owns all interpreter objects for the duration of a run
///
/// Objects are referred to by index handles (`ValRef`, `FrameRef`)
/// which stay valid until the region is released. Values may share
/// substructure freely since no handle ever owns what it points to.
pub struct Region {
    values: Vec<Value>,
    frames: Vec<Frame>,
    symtab: SymbolTable,
    /// Total allocations since the last release
    allocs: usize,
    /// Number of bulk releases performed
    releases: usize,
}

/// Snapshot of region occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub values: usize,
    pub frames: usize,
    pub symbols: usize,
    pub allocs: usize,
}

impl Region {
    /// Creates a new empty region, with the special form keywords
    /// already interned
    pub fn new() -> Self {
        if cfg!(feature = "memdbg") {
            log::debug!("Creating mem region");
        }

        Self {
            values: Vec::with_capacity(VALUE_ZONE_SIZE),
            frames: Vec::with_capacity(FRAME_ZONE_SIZE),
            symtab: SymbolTable::new(),
            allocs: 0,
            releases: 0,
        }
    }

    /// Stores a value in the region, returning its handle
    pub fn alloc(&mut self, val: Value) -> ValRef {
        let idx = self.values.len();
        self.values.push(val);
        self.allocs += 1;

        ValRef::from_index(idx)
    }

    /// Stores a frame in the region, returning its handle
    pub fn alloc_frame(&mut self, frame: Frame) -> FrameRef {
        let idx = self.frames.len();
        self.frames.push(frame);
        self.allocs += 1;

        if cfg!(feature = "memdbg") {
            log::debug!("Frame {} allocated (parent {:?})", idx, self.frames[idx].parent);
        }

        FrameRef::from_index(idx)
    }

    /// Borrows the value behind a handle
    pub fn get(&self, val: ValRef) -> &Value {
        &self.values[val.index()]
    }

    pub fn frame(&self, frame: FrameRef) -> &Frame {
        &self.frames[frame.index()]
    }

    pub fn frame_mut(&mut self, frame: FrameRef) -> &mut Frame {
        &mut self.frames[frame.index()]
    }

    /// Returns the id for a symbol name, interning it if new
    pub fn intern(&mut self, name: &str) -> SymId {
        self.symtab.intern(name)
    }

    /// Returns the name behind a symbol id
    pub fn sym_name(&self, id: SymId) -> &str {
        self.symtab.name(id)
    }

    /// Allocates a symbol value directly from its name
    pub fn symbol(&mut self, name: &str) -> ValRef {
        let id = self.intern(name);
        self.alloc(Value::Symbol(id))
    }

    pub fn stats(&self) -> Stats {
        Stats {
            values: self.values.len(),
            frames: self.frames.len(),
            symbols: self.symtab.len(),
            allocs: self.allocs,
        }
    }

    /// Frees every allocation at once and resets the region to its
    /// freshly created state
    ///
    /// Any handle issued before this call is invalid afterwards.
    pub fn release_all(&mut self) {
        let stats = self.stats();
        if cfg!(feature = "memdbg") {
            log::debug!(
                "Releasing region: {} values, {} frames, {} symbols",
                stats.values,
                stats.frames,
                stats.symbols
            );
        } else {
            log::trace!("Releasing region ({} allocations)", stats.allocs);
        }

        self.values = Vec::new();
        self.frames = Vec::new();
        self.symtab = SymbolTable::new();
        self.allocs = 0;
        self.releases += 1;
    }

    /// Releases the region, then terminates the process with `status`
    pub fn exit_with(&mut self, status: i32) -> ! {
        self.release_all();
        std::process::exit(status)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if cfg!(feature = "memdbg") {
            log::debug!(
                "Dropping region after {} release(s), {} allocations outstanding",
                self.releases,
                self.allocs
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::symtab::SP_QUOTE;

    #[test]
    fn alloc_and_get() {
        let mut reg = Region::new();

        let a = reg.alloc(Value::Integer(42));
        let b = reg.alloc(Value::Float(2.5));

        assert_ne!(a, b);
        assert!(matches!(reg.get(a), Value::Integer(42)));
        assert!(matches!(reg.get(b), Value::Float(f) if *f == 2.5));
        assert_eq!(reg.stats().values, 2);
    }

    #[test]
    fn frames_track_parents() {
        let mut reg = Region::new();

        let global = reg.alloc_frame(Frame::new(None));
        let child = reg.alloc_frame(Frame::new(Some(global)));

        assert_eq!(reg.frame(child).parent, Some(global));
        assert_eq!(reg.frame(global).parent, None);
        assert_eq!(reg.stats().frames, 2);
    }

    #[test]
    fn release_resets_everything() {
        let mut reg = Region::new();

        for i in 0..100 {
            reg.alloc(Value::Integer(i));
        }
        reg.alloc_frame(Frame::new(None));
        reg.intern("some-name");

        assert_eq!(reg.stats().allocs, 101);

        reg.release_all();
        let stats = reg.stats();
        assert_eq!(stats.values, 0);
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.allocs, 0);

        // keywords survive a release at their fixed ids
        assert_eq!(reg.intern("quote"), SP_QUOTE);

        // region is reusable afterwards
        let v = reg.alloc(Value::Bool(true));
        assert!(matches!(reg.get(v), Value::Bool(true)));
    }

    #[test]
    fn symbols_intern_once() {
        let mut reg = Region::new();

        let a = reg.symbol("foo");
        let b = reg.symbol("foo");

        match (reg.get(a), reg.get(b)) {
            (Value::Symbol(x), Value::Symbol(y)) => assert_eq!(x, y),
            _ => panic!(),
        }
        assert_eq!(reg.stats().values, 2);
    }
}
