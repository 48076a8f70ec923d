// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/lib.rs

// Crate root. The interpreter itself lives in the scheme module.

// <>

pub mod scheme;

pub use scheme::{context, interpret, ErrKind, Interpreter, SchemeErr};
