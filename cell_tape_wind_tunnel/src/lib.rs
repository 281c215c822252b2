// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmark harness for the `cell_tape` machine.
//!
//! This crate exists for its criterion benches; see `benches/machine.rs`.
