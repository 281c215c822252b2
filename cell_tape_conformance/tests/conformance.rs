// Copyright 2026 the Cell Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "integration test crate")]

use cell_tape::input::{InputError, InputSource};
use cell_tape::machine::{BracketFault, Capability, Edge, Fault, Machine, Outcome, Status};
use cell_tape::opcode::Opcode;
use cell_tape::trace::{TraceMask, TraceOutcome, TraceSink};

const HELLO: &[u8] =
    b"++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

struct QueueSource(Vec<u8>);

impl InputSource for QueueSource {
    fn next_byte(&mut self) -> Result<u8, InputError> {
        if self.0.is_empty() {
            return Err(InputError::Exhausted);
        }
        Ok(self.0.remove(0))
    }
}

fn run_program(cells: usize, program: &[u8]) -> Machine {
    let mut m = Machine::new(cells);
    m.feed(program);
    m.run();
    m
}

#[test]
fn increment_ladder_hits_every_cell_value() {
    for n in 0..=255u16 {
        let m = run_program(3, &vec![b'+'; n as usize]);
        assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
        assert_eq!(
            u16::from(m.tape()[0]),
            n,
            "{n} increments should leave cell 0 at {n}"
        );
    }
    let m = run_program(3, &vec![b'+'; 256]);
    assert_eq!(m.tape()[0], 0, "256 increments should wrap to 0");
}

#[test]
fn decrement_ladder_wraps_from_one() {
    for n in 0..=255usize {
        let mut program = vec![b'+'];
        program.extend(std::iter::repeat_n(b'-', n));
        let m = run_program(3, &program);
        assert_eq!(
            m.tape()[0],
            1u8.wrapping_sub(n as u8),
            "{n} decrements from 1 should wrap modulo 256"
        );
    }
}

#[test]
fn overrun_faults_on_the_third_move() {
    let m = run_program(3, b">>>>");
    assert_eq!(m.fault(), Some(&Fault::OutOfBounds(Edge::High)));
    // The third `>` would reach cell 3 on a 3-cell tape; the fourth is never
    // consumed.
    assert_eq!(m.pointer(), 3);
    assert_eq!(m.queued(), 1);
    assert_eq!(m.fault().unwrap().to_string(), "data pointer overran memory size");
}

#[test]
fn underrun_faults_immediately() {
    let m = run_program(3, b"<");
    assert_eq!(m.fault(), Some(&Fault::OutOfBounds(Edge::Low)));
    assert_eq!(m.fault().unwrap().to_string(), "data pointer underran memory size");
}

#[test]
fn single_output_programs() {
    let cases: &[(&[u8], u8)] = &[
        (b".", 0),
        (b"+.", 1),
        (b"+++++.", 5),
        (b"-.", 255),
        (b"++----.", 254),
    ];
    for &(program, expected) in cases {
        let m = run_program(3, program);
        assert_eq!(
            m.output(),
            &[expected],
            "{} should output [{expected}]",
            String::from_utf8_lossy(program)
        );
    }
}

#[test]
fn loop_programs() {
    let cases: &[(&[u8], u8)] = &[
        (b"+[++>]<.", 3),
        (b"[+++].", 0),
        (b"++++>[]<.", 4),
        (b"+[->+<]>.", 1),
        (b"++[->+<]>.", 2),
        (b"++++[->+<]>.", 4),
        (b"+++>[[]]<.", 3),
    ];
    for &(program, expected) in cases {
        let m = run_program(32, program);
        assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
        assert_eq!(
            m.output(),
            &[expected],
            "{} should output [{expected}]",
            String::from_utf8_lossy(program)
        );
    }
}

#[test]
fn hello_world() {
    let m = run_program(32, HELLO);
    assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
    assert_eq!(m.output(), b"Hello World!\n");
}

#[test]
fn bracket_fault_messages_are_stable() {
    let cases: &[(&[u8], BracketFault, &str)] = &[
        (b"]", BracketFault::StrayClose, "unmatched ]"),
        (b"[+++", BracketFault::MissingClose, "could not find matching ]"),
        (b"+[", BracketFault::Unbalanced, "unbalanced brackets"),
        (b"+[[->]", BracketFault::Unbalanced, "unbalanced brackets"),
    ];
    for &(program, expected, message) in cases {
        let m = run_program(8, program);
        assert_eq!(m.fault(), Some(&Fault::UnmatchedBracket(expected)));
        assert_eq!(m.fault().unwrap().to_string(), message);
    }
}

#[test]
fn adjacent_loops_close_independently() {
    // Two sibling loops: drain cell 0 into cell 1, then drain it back.
    let m = run_program(8, b"+++[->+<]>[-<+>]<.");
    assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
    assert_eq!(m.output(), &[3]);
}

#[test]
fn streaming_load_feeds_in_chunks() {
    let mut m = Machine::new(8);
    m.feed(b"++");
    m.feed(b"+");
    m.feed(b".");
    m.run();
    assert_eq!(m.output(), &[3]);
}

#[test]
fn output_accumulator_only_grows() {
    let m = run_program(8, b"+.+.+.");
    assert_eq!(m.output(), &[1, 2, 3]);
}

#[test]
fn unwired_input_is_a_capability_gap_not_a_program_fault() {
    let m = run_program(3, b",");
    let fault = m.fault().expect("run must terminate on a fault");
    assert_eq!(fault, &Fault::Unsupported(Capability::InputByte));
    // Distinct from the program-fault categories.
    assert!(!matches!(fault, Fault::UnmatchedBracket(_) | Fault::OutOfBounds(_)));
}

#[test]
fn wired_input_feeds_the_tape() {
    let mut m = Machine::new(8);
    m.feed(b",>,>,.");
    let mut source = QueueSource(vec![1, 2, 3]);
    m.run_with(Some(&mut source), TraceMask::NONE, None);
    assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
    assert_eq!(&m.tape()[..3], &[1, 2, 3]);
    assert_eq!(m.output(), &[3]);
}

#[test]
fn input_source_errors_terminate_the_run() {
    let mut m = Machine::new(8);
    m.feed(b",,");
    let mut source = QueueSource(vec![9]);
    m.run_with(Some(&mut source), TraceMask::NONE, None);
    assert_eq!(m.fault(), Some(&Fault::Input(InputError::Exhausted)));
    assert_eq!(m.tape()[0], 9);
}

#[derive(Default)]
struct CollectingSink {
    starts: u32,
    ends: u32,
    ok_ends: u32,
    steps: Vec<Opcode>,
    skips: Vec<usize>,
    replays: Vec<usize>,
}

impl TraceSink for CollectingSink {
    fn mask(&self) -> TraceMask {
        TraceMask::RUN | TraceMask::STEP | TraceMask::JUMP
    }

    fn run_start(&mut self, _queued: usize) {
        self.starts += 1;
    }

    fn step(&mut self, op: Opcode, _pointer: usize, _cell: u8) {
        self.steps.push(op);
    }

    fn loop_skip(&mut self, skipped: usize) {
        self.skips.push(skipped);
    }

    fn loop_replay(&mut self, restored: usize) {
        self.replays.push(restored);
    }

    fn run_end(&mut self, outcome: TraceOutcome<'_>) {
        self.ends += 1;
        if matches!(outcome, TraceOutcome::Ok) {
            self.ok_ends += 1;
        }
    }
}

#[test]
fn trace_hooks_fire() {
    let mut m = Machine::new(8);
    m.feed(b"++[->+<]>.");
    let mut sink = CollectingSink::default();
    let mask = sink.mask();
    m.run_with(None, mask, Some(&mut sink));

    assert_eq!(m.status(), &Status::Terminated(Outcome::Ok));
    assert_eq!(sink.starts, 1);
    assert_eq!(sink.ends, 1);
    assert_eq!(sink.ok_ends, 1);
    // ++, two six-op loop iterations, then `>.`.
    assert_eq!(sink.steps.len(), 16);
    assert!(sink.skips.is_empty());
    // One replay per repeated iteration: `]`, the four body ops, and `[`.
    assert_eq!(sink.replays, vec![6]);
}

#[test]
fn trace_reports_skipped_bodies() {
    let mut m = Machine::new(8);
    m.feed(b"[+].");
    let mut sink = CollectingSink::default();
    let mask = sink.mask();
    m.run_with(None, mask, Some(&mut sink));

    assert_eq!(m.output(), &[0]);
    // The single-byte body is relocated; the matching `]` stays and executes.
    assert_eq!(sink.skips, vec![1]);
    assert!(sink.replays.is_empty());
}

#[test]
fn trace_reports_faults() {
    struct FaultSink {
        saw_fault: bool,
    }

    impl TraceSink for FaultSink {
        fn mask(&self) -> TraceMask {
            TraceMask::RUN
        }

        fn run_end(&mut self, outcome: TraceOutcome<'_>) {
            self.saw_fault = matches!(
                outcome,
                TraceOutcome::Fault(Fault::UnmatchedBracket(BracketFault::StrayClose))
            );
        }
    }

    let mut m = Machine::new(8);
    m.feed(b"]");
    let mut sink = FaultSink { saw_fault: false };
    m.run_with(None, TraceMask::RUN, Some(&mut sink));
    assert!(sink.saw_fault);
}

#[test]
fn terminated_status_is_final() {
    let mut m = run_program(3, b"<");
    assert!(m.status().is_terminated());

    m.feed(b"+.");
    m.run();
    assert_eq!(m.fault(), Some(&Fault::OutOfBounds(Edge::Low)));
    assert!(m.output().is_empty());
    assert_eq!(m.queued(), 2);
}
