// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for `cell_tape`.
//!
//! Tracing is optional and is designed to be `no_std` friendly.
//! The machine only emits events requested by a [`TraceMask`].
//!
//! To enable tracing, pass a [`TraceMask`] and [`TraceSink`] to
//! [`Machine::run_with`].

use crate::machine::Fault;
use crate::opcode::Opcode;

#[cfg(doc)]
use crate::machine::Machine;

/// A set of trace events requested by a [`TraceSink`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceMask(u32);

impl core::ops::BitOr for TraceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for TraceMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl TraceMask {
    /// No tracing.
    pub const NONE: Self = Self(0);
    /// Trace run boundaries.
    ///
    /// Enables:
    /// - [`TraceSink::run_start`]
    /// - [`TraceSink::run_end`]
    pub const RUN: Self = Self(1 << 0);
    /// Trace each executed operation.
    ///
    /// Enables:
    /// - [`TraceSink::step`]
    pub const STEP: Self = Self(1 << 1);
    /// Trace loop skip/replay traffic.
    ///
    /// Enables:
    /// - [`TraceSink::loop_skip`]
    /// - [`TraceSink::loop_replay`]
    pub const JUMP: Self = Self(1 << 2);

    /// Returns `true` if this mask includes all bits in `other`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Run outcome for tracing.
#[derive(Copy, Clone, Debug)]
pub enum TraceOutcome<'a> {
    /// The stream drained with balanced loops.
    Ok,
    /// The run terminated on a fault.
    Fault(&'a Fault),
}

/// A trace sink that can receive machine events.
pub trait TraceSink {
    /// Returns the set of events the sink wants.
    fn mask(&self) -> TraceMask {
        TraceMask::NONE
    }

    /// Called at the start of a run.
    ///
    /// Called only if `mask()` includes [`TraceMask::RUN`].
    ///
    /// - `queued`: bytes waiting in the instruction stream when the run begins
    fn run_start(&mut self, _queued: usize) {}

    /// Called for each executed operation. Comment bytes are not reported.
    ///
    /// Called only if `mask()` includes [`TraceMask::STEP`].
    ///
    /// - `op`: decoded operation
    /// - `pointer`: data pointer before the operation executes
    /// - `cell`: value of the cell at `pointer` before the operation executes
    fn step(&mut self, _op: Opcode, _pointer: usize, _cell: u8) {}

    /// Called when a zero-cell `[` relocates a loop body onto the replay
    /// stack.
    ///
    /// Called only if `mask()` includes [`TraceMask::JUMP`].
    ///
    /// - `skipped`: bytes moved off the stream; the matching `]` is not
    ///   counted because it stays on the stream and executes
    fn loop_skip(&mut self, _skipped: usize) {}

    /// Called when a nonzero-cell `]` restores a loop body to the stream.
    ///
    /// Called only if `mask()` includes [`TraceMask::JUMP`].
    ///
    /// - `restored`: bytes moved back onto the stream, including the `]`
    ///   itself and the re-queued `[`
    fn loop_replay(&mut self, _restored: usize) {}

    /// Called at the end of a run.
    ///
    /// Called only if `mask()` includes [`TraceMask::RUN`].
    fn run_end(&mut self, _outcome: TraceOutcome<'_>) {}
}
