// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `cell_tape`: a bounded-tape virtual machine for an esoteric byte-coded language.
//!
//! The machine owns a fixed-size tape of byte cells, a data pointer, a
//! destructively-consumed instruction stream, and an append-only output
//! accumulator. Programs are raw bytes: eight byte values decode to operations
//! ([`opcode::Opcode`]) and every other byte is a comment.
//!
//! Loops are resolved without a compilation pass. The stream doubles as the
//! instruction pointer, so a taken jump physically relocates bytes between the
//! stream and an internal replay stack rather than doing index arithmetic over
//! a fixed program buffer. This keeps execution single-pass and streaming: new
//! bytes may be fed at any point before the run terminates.
//!
//! ## Example
//!
//! ```
//! use cell_tape::machine::{Machine, Outcome, Status};
//!
//! let mut m = Machine::new(16);
//! m.feed(b"+++++.");
//! m.run();
//!
//! assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
//! assert_eq!(m.output(), &[5]);
//! ```

#![no_std]

extern crate alloc;

pub mod input;
pub mod machine;
pub mod opcode;
pub mod trace;
