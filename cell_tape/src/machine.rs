// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The virtual machine core.
//!
//! A [`Machine`] executes a byte-coded program over a bounded tape of byte
//! cells. The instruction stream is a consumable queue: callers [`feed`]
//! bytes into it and [`run`] pops them off the front one at a time, so the
//! stream is both program storage and instruction pointer. Backward jumps are
//! possible because every consumed byte is recorded on an internal replay
//! stack, a reversed trace of the stream, which a `]` unwinds back onto the
//! stream to re-enter its loop.
//!
//! [`feed`]: Machine::feed
//! [`run`]: Machine::run

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::input::{InputError, InputSource};
use crate::opcode::Opcode;
use crate::trace::{TraceMask, TraceOutcome, TraceSink};

/// Default tape size in cells.
pub const DEFAULT_TAPE_CELLS: usize = 4096;

/// Which edge of the tape the data pointer crossed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    /// The pointer moved below cell 0.
    Low,
    /// The pointer moved past the last cell.
    High,
}

/// How bracket bookkeeping failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BracketFault {
    /// A zero-cell `[` exhausted the stream before its matching `]`.
    MissingClose,
    /// A `]` executed with no open loop.
    StrayClose,
    /// The stream drained while loops were still open.
    Unbalanced,
}

/// A capability the core does not implement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    /// The input operation (`,`) with no wired [`InputSource`].
    InputByte,
}

/// A terminal execution fault.
///
/// Faults are never recovered from: the first fault moves the machine to
/// [`Status::Terminated`] and no further instructions are consumed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The data pointer left the tape.
    OutOfBounds(Edge),
    /// Forward and backward jump bytes could not be paired.
    UnmatchedBracket(BracketFault),
    /// The program used a capability with no wired provider.
    ///
    /// This is a gap in the machine, not a defect in the program; callers can
    /// tell the two apart by matching on this variant.
    Unsupported(Capability),
    /// A wired input source failed.
    Input(InputError),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds(Edge::High) => write!(f, "data pointer overran memory size"),
            Self::OutOfBounds(Edge::Low) => write!(f, "data pointer underran memory size"),
            Self::UnmatchedBracket(BracketFault::MissingClose) => {
                write!(f, "could not find matching ]")
            }
            Self::UnmatchedBracket(BracketFault::StrayClose) => write!(f, "unmatched ]"),
            Self::UnmatchedBracket(BracketFault::Unbalanced) => write!(f, "unbalanced brackets"),
            Self::Unsupported(Capability::InputByte) => {
                write!(f, "input byte requested but no input source is wired")
            }
            Self::Input(e) => write!(f, "input source error: {e}"),
        }
    }
}

impl core::error::Error for Fault {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Input(e) => Some(e),
            _ => None,
        }
    }
}

/// How a terminated run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The stream drained with balanced loops.
    Ok,
    /// Execution stopped on a fault.
    Fault(Fault),
}

/// Machine lifecycle state.
///
/// Status is monotonic: `NotStarted -> Running -> Terminated`. A terminated
/// machine never consumes another instruction; run a new program on a fresh
/// machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Constructed; no instruction has been consumed.
    NotStarted,
    /// Inside [`Machine::run`].
    Running,
    /// The run is over.
    Terminated(Outcome),
}

impl Status {
    /// Returns `true` if the machine has terminated.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }
}

/// A bounded-tape byte machine.
#[derive(Debug)]
pub struct Machine {
    tape: Vec<u8>,
    pointer: usize,
    stream: VecDeque<u8>,
    output: Vec<u8>,
    /// Reversed trace of every byte consumed from the stream.
    replay: Vec<u8>,
    /// Loops entered and not yet closed along the executed path.
    open_loops: usize,
    status: Status,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_CELLS)
    }
}

impl Machine {
    /// Creates a machine with a zeroed tape of `cells` cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is zero; the data pointer must start on a valid
    /// cell.
    #[must_use]
    pub fn new(cells: usize) -> Self {
        assert!(cells > 0, "tape must have at least one cell");
        Self {
            tape: vec![0; cells],
            pointer: 0,
            stream: VecDeque::new(),
            output: Vec::new(),
            replay: Vec::new(),
            open_loops: 0,
            status: Status::NotStarted,
        }
    }

    /// Appends raw program bytes to the instruction stream.
    ///
    /// There is no separate compile step. The stream is consumed destructively
    /// from the front, and bytes may be appended at any time before the
    /// machine terminates; bytes fed after termination are never consumed.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.stream.extend(bytes.iter().copied());
    }

    /// Returns the tape contents.
    #[must_use]
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    /// Returns the data pointer.
    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Returns the value of the cell at the data pointer.
    ///
    /// Returns `None` if an out-of-bounds fault left the pointer off the
    /// tape.
    #[must_use]
    pub fn cell(&self) -> Option<u8> {
        self.tape.get(self.pointer).copied()
    }

    /// Returns the output accumulator.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Returns the number of bytes waiting in the instruction stream.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.stream.len()
    }

    /// Returns the machine status.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns the fault that terminated the run, if there is one.
    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        match &self.status {
            Status::Terminated(Outcome::Fault(fault)) => Some(fault),
            _ => None,
        }
    }

    /// Runs the machine until the instruction stream is empty or a fault
    /// terminates it.
    ///
    /// Results are observed through [`tape`], [`output`], and [`status`];
    /// there is no return value. The input operation terminates the run with
    /// [`Fault::Unsupported`] because no source is wired. Running a
    /// terminated machine is a no-op.
    ///
    /// [`tape`]: Machine::tape
    /// [`output`]: Machine::output
    /// [`status`]: Machine::status
    pub fn run(&mut self) {
        self.run_with(None, TraceMask::NONE, None);
    }

    /// Runs the machine with an optional input source and trace sink.
    ///
    /// `input` backs the input operation (`,`); without it the operation is a
    /// fatal capability gap. Tracing is controlled by `mask`; pass `None` for
    /// `trace` to disable tracing.
    pub fn run_with(
        &mut self,
        mut input: Option<&mut dyn InputSource>,
        mask: TraceMask,
        mut trace: Option<&mut dyn TraceSink>,
    ) {
        if self.status.is_terminated() {
            return;
        }
        self.status = Status::Running;

        if mask.contains(TraceMask::RUN)
            && let Some(t) = trace.as_mut()
        {
            t.run_start(self.stream.len());
        }

        let outcome = self.run_body(&mut input, mask, &mut trace);
        self.status = Status::Terminated(outcome);

        if mask.contains(TraceMask::RUN)
            && let Some(t) = trace.as_mut()
        {
            let traced = match &self.status {
                Status::Terminated(Outcome::Fault(fault)) => TraceOutcome::Fault(fault),
                _ => TraceOutcome::Ok,
            };
            t.run_end(traced);
        }
    }

    fn run_body(
        &mut self,
        input: &mut Option<&mut dyn InputSource>,
        mask: TraceMask,
        trace: &mut Option<&mut dyn TraceSink>,
    ) -> Outcome {
        while let Some(byte) = self.stream.pop_front() {
            // Record the byte before dispatch so the replay stack stays a
            // faithful reversed trace even when a handler relocates more of
            // the stream.
            self.replay.push(byte);

            let Some(op) = Opcode::from_byte(byte) else {
                // Comment byte.
                continue;
            };

            if mask.contains(TraceMask::STEP)
                && let Some(t) = trace.as_mut()
            {
                t.step(op, self.pointer, self.tape[self.pointer]);
            }

            let step = match op {
                Opcode::MovePointerRight => self.move_right(),
                Opcode::MovePointerLeft => self.move_left(),
                Opcode::IncrementCell => {
                    let cell = &mut self.tape[self.pointer];
                    *cell = cell.wrapping_add(1);
                    Ok(())
                }
                Opcode::DecrementCell => {
                    let cell = &mut self.tape[self.pointer];
                    *cell = cell.wrapping_sub(1);
                    Ok(())
                }
                Opcode::OutputByte => {
                    self.output.push(self.tape[self.pointer]);
                    Ok(())
                }
                Opcode::InputByte => self.input_byte(input),
                Opcode::JumpForwardIfZero => self.jump_forward(mask, trace),
                Opcode::JumpBackwardIfNonZero => self.jump_backward(mask, trace),
            };
            if let Err(fault) = step {
                return Outcome::Fault(fault);
            }
        }

        if self.open_loops != 0 {
            return Outcome::Fault(Fault::UnmatchedBracket(BracketFault::Unbalanced));
        }
        Outcome::Ok
    }

    fn move_right(&mut self) -> Result<(), Fault> {
        self.pointer += 1;
        if self.pointer >= self.tape.len() {
            return Err(Fault::OutOfBounds(Edge::High));
        }
        Ok(())
    }

    fn move_left(&mut self) -> Result<(), Fault> {
        if self.pointer == 0 {
            return Err(Fault::OutOfBounds(Edge::Low));
        }
        self.pointer -= 1;
        Ok(())
    }

    fn input_byte(&mut self, input: &mut Option<&mut dyn InputSource>) -> Result<(), Fault> {
        let Some(source) = input.as_mut() else {
            return Err(Fault::Unsupported(Capability::InputByte));
        };
        self.tape[self.pointer] = source.next_byte().map_err(Fault::Input)?;
        Ok(())
    }

    /// Opens a loop.
    ///
    /// The open-loop counter is incremented whichever way the conditional
    /// goes. On a zero cell the body is relocated onto the replay stack one
    /// byte at a time, nesting-aware; the matching `]` is left at the front
    /// of the stream so it executes and closes the loop through the same
    /// counter.
    fn jump_forward(
        &mut self,
        mask: TraceMask,
        trace: &mut Option<&mut dyn TraceSink>,
    ) -> Result<(), Fault> {
        self.open_loops += 1;
        if self.tape[self.pointer] != 0 {
            return Ok(());
        }

        let mut depth = 0usize;
        let mut skipped = 0usize;
        while let Some(b) = self.stream.pop_front() {
            if b == Opcode::JumpForwardIfZero.byte() {
                depth += 1;
            } else if b == Opcode::JumpBackwardIfNonZero.byte() {
                if depth == 0 {
                    // Matching `]`: put it back so it executes normally.
                    self.stream.push_front(b);
                    if mask.contains(TraceMask::JUMP)
                        && let Some(t) = trace.as_mut()
                    {
                        t.loop_skip(skipped);
                    }
                    return Ok(());
                }
                depth -= 1;
            }
            self.replay.push(b);
            skipped += 1;
        }
        Err(Fault::UnmatchedBracket(BracketFault::MissingClose))
    }

    /// Closes a loop.
    ///
    /// On a nonzero cell the consumed trace is unwound from the replay stack
    /// back onto the stream, the `]` itself first, until the `[` that opened
    /// this loop is back at the front, so the next step re-decodes it and
    /// re-enters the loop header.
    fn jump_backward(
        &mut self,
        mask: TraceMask,
        trace: &mut Option<&mut dyn TraceSink>,
    ) -> Result<(), Fault> {
        if self.open_loops == 0 {
            return Err(Fault::UnmatchedBracket(BracketFault::StrayClose));
        }
        self.open_loops -= 1;
        if self.tape[self.pointer] == 0 {
            return Ok(());
        }

        let mut depth = 0usize;
        let mut restored = 0usize;
        while let Some(b) = self.replay.pop() {
            self.stream.push_front(b);
            restored += 1;
            if b == Opcode::JumpBackwardIfNonZero.byte() {
                depth += 1;
            } else if b == Opcode::JumpForwardIfZero.byte() {
                depth -= 1;
                if depth == 0 {
                    if mask.contains(TraceMask::JUMP)
                        && let Some(t) = trace.as_mut()
                    {
                        t.loop_replay(restored);
                    }
                    return Ok(());
                }
            }
        }
        // The open-loop counter says a `[` is in the trace; running dry here
        // means the counter and the trace disagree.
        Err(Fault::UnmatchedBracket(BracketFault::StrayClose))
    }
}
