// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input capability for the machine.
//!
//! The core does not define where input bytes come from. A host that wants
//! the input operation (`,`) to work supplies an [`InputSource`] to
//! [`Machine::run_with`]; without one the operation is a fatal capability
//! gap, never a silent no-op.

use core::fmt;

#[cfg(doc)]
use crate::machine::Machine;

/// Errors an input source can return.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputError {
    /// The source has no more bytes.
    Exhausted,
    /// The source failed while producing a byte.
    Failed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "input source exhausted"),
            Self::Failed => write!(f, "input source failed"),
        }
    }
}

impl core::error::Error for InputError {}

/// Supplies bytes for the input operation.
///
/// The machine pulls one byte per executed `,` and stores it at the data
/// pointer. Sources are free to buffer or synthesize bytes; the machine only
/// sees the result, and any error terminates the run.
pub trait InputSource {
    /// Produces the next input byte.
    fn next_byte(&mut self) -> Result<u8, InputError>;
}
