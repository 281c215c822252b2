// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs a classic program and prints its output.
//!
//! Run with:
//! `cargo run -p cell_tape --example hello`

use cell_tape::machine::Machine;

const HELLO: &[u8] =
    b"++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn main() {
    let mut m = Machine::new(64);
    m.feed(HELLO);
    m.run();

    if let Some(fault) = m.fault() {
        eprintln!("fault: {fault}");
        return;
    }
    print!("{}", String::from_utf8_lossy(m.output()));
}
