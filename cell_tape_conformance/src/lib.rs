// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conformance corpus for the `cell_tape` machine.
//!
//! This crate exists for its integration tests; see `tests/conformance.rs`.
