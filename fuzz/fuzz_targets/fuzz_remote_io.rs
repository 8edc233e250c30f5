//! Fuzz target: `remote_io::handle`
//!
//! Drives arbitrary request payloads through the remote I/O handler and
//! asserts every request gets exactly one well-formed reply.
//!
//! cargo fuzz run fuzz_remote_io

#![no_main]

use libfuzzer_sys::fuzz_target;
use rfbrick::app::ports::IoPort;
use rfbrick::app::remote_io::{ACK, MAX_REPLY, NACK, handle};
use rfbrick::config::DeviceConfiguration;

struct NullIo {
    outputs: [bool; 5],
}

impl IoPort for NullIo {
    fn io_peripheral_selected(&mut self) -> bool {
        true
    }
    fn read_analog(&mut self, channel: u8) -> u16 {
        u16::from(channel) & 0x3FF
    }
    fn read_input(&mut self, channel: u8) -> bool {
        channel % 2 == 0
    }
    fn output_state(&mut self, channel: u8) -> bool {
        self.outputs[channel as usize]
    }
    fn write_output(&mut self, channel: u8, high: bool) {
        self.outputs[channel as usize] = high;
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cfg = DeviceConfiguration::default();
    let mut io = NullIo { outputs: [false; 5] };

    let reply = handle(data, &mut cfg, &mut io);

    assert!(!reply.is_empty(), "every request must be answered");
    assert!(reply.len() <= MAX_REPLY);
    assert!(reply[0] == ACK || reply[0] == NACK);
});
