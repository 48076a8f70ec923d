// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2024 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/symtab.rs

// A table to associate symbol names with efficient internal IDs.

// <>

use std::collections::HashMap;
use std::fmt;

/// Interned symbol identifier; equal names always share an ID
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymId(pub u32);

impl fmt::Debug for SymId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// special form keywords; interned first, in this order, by every table

pub const SP_QUOTE: SymId = SymId(0);
pub const SP_IF: SymId = SymId(1);
pub const SP_DEFINE: SymId = SymId(2);
pub const SP_LAMBDA: SymId = SymId(3);
pub const SP_LET: SymId = SymId(4);
pub const SP_LET_STAR: SymId = SymId(5);
pub const SP_LETREC: SymId = SymId(6);

const SPECIAL_FORMS: [(&str, SymId); 7] = [
    ("quote", SP_QUOTE),
    ("if", SP_IF),
    ("define", SP_DEFINE),
    ("lambda", SP_LAMBDA),
    ("let", SP_LET),
    ("let*", SP_LET_STAR),
    ("letrec", SP_LETREC),
];

/// Returns true if the ID names one of the special forms
pub fn special_form_p(id: SymId) -> bool {
    (id.0 as usize) < SPECIAL_FORMS.len()
}

pub struct SymbolTable {
    nm_to_id: HashMap<Box<str>, SymId>,
    id_to_nm: Vec<Box<str>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut out = Self {
            nm_to_id: HashMap::with_capacity(64),
            id_to_nm: Vec::with_capacity(64),
        };

        for (name, id) in SPECIAL_FORMS {
            let got = out.intern(name);
            debug_assert_eq!(got, id);
        }

        out
    }

    /// Looks up the ID for a name, assigning the next free ID if the
    /// name has not been seen
    pub fn intern(&mut self, name: &str) -> SymId {
        if let Some(id) = self.nm_to_id.get(name) {
            return *id;
        }

        let id = SymId(self.id_to_nm.len() as u32);
        self.id_to_nm.push(name.into());
        self.nm_to_id.insert(name.into(), id);

        log::trace!("interned symbol {} as {:?}", name, id);

        id
    }

    pub fn lookup(&self, name: &str) -> Option<SymId> {
        self.nm_to_id.get(name).copied()
    }

    /// Gets the name for an ID issued by this table
    pub fn name(&self, id: SymId) -> &str {
        &self.id_to_nm[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.id_to_nm.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
