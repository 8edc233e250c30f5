//! Fuzz target: `AtEscapeDetector::feed`
//!
//! Each input byte pair is (byte, 8 ms steps to advance).  Asserts the
//! detector never panics, that data-mode bytes are never lost or
//! invented beyond the held pluses, and that polled opcodes are valid.
//!
//! cargo fuzz run fuzz_at_escape

#![no_main]

use heapless::Deque;
use libfuzzer_sys::fuzz_target;
use rfbrick::adapters::at_escape::AtEscapeDetector;
use rfbrick::app::commands::{MNEMONICS, NULL_OPCODE};
use rfbrick::app::ports::AtState;

fuzz_target!(|data: &[u8]| {
    let mut detector = AtEscapeDetector::new();
    detector.register(&MNEMONICS);
    let mut queue: Deque<u8, 1024> = Deque::new();
    let mut now: u32 = 0;

    for pair in data.chunks_exact(2) {
        now = now.wrapping_add(u32::from(pair[1]) * 8);
        detector.feed(pair[0], now, &mut queue);
        detector.tick(now);

        if detector.state() == AtState::Enabled {
            if let Some(opcode) = detector.poll_command() {
                assert!(
                    opcode == NULL_OPCODE || (opcode as usize) < MNEMONICS.len(),
                    "opcode out of range"
                );
            }
        }
    }
    assert!(queue.len() <= data.len() / 2);
});
