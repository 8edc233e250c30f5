//! Mock hardware adapter for integration tests.
//!
//! Records every send, serial write, and MAC re-initialisation so tests
//! can assert on the full history without touching a UART or radio.

use std::collections::VecDeque;

use heapless::Deque;
use rfbrick::app::commands::Command;
use rfbrick::app::events::BridgeEvent;
use rfbrick::app::ports::{
    ArgumentSource, AtPort, AtState, EventSink, IoPort, MacEvents, NetworkPort,
    PERSISTENT_AREA_SIZE, PersistentStore, RadioPort, SerialPort, StorageError,
};
use rfbrick::config::{DEFAULT_BAUD_CODE, DIGITAL_CHANNELS, NetworkInit};

// ── Records ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SentPacket {
    pub destination: u32,
    pub packet_type: u8,
    pub payload: Vec<u8>,
    pub preamble: u8,
}

#[derive(Debug, Clone)]
struct Frame {
    packet_type: u8,
    sender: u32,
    payload: Vec<u8>,
    rssi: u8,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    // Serial
    pub serial_rx: VecDeque<u8>,
    pub serial_tx: Vec<u8>,
    pub baud_code: u8,

    // AT detector
    pub at_state: AtState,
    pub registered: Option<&'static [&'static str]>,
    pub exit_requests: u32,
    queued: VecDeque<(u8, Vec<u8>)>,
    args: Deque<u8, 64>,

    // MAC / radio
    inbound: VecDeque<Frame>,
    pub sent: Vec<SentPacket>,
    pub inits: Vec<NetworkInit>,
    pub busy_steps: u32,
    pub steps: u32,
    pub transmit_power: Option<u8>,
    pub rssi: u8,
    pub temperature: u8,

    // Pins
    pub io_mode: bool,
    pub inputs: [bool; DIGITAL_CHANNELS],
    pub outputs: [bool; DIGITAL_CHANNELS],
    pub analog: [u16; 16],

    // Persistent area
    pub area: [u8; PERSISTENT_AREA_SIZE],
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            serial_rx: VecDeque::new(),
            serial_tx: Vec::new(),
            baud_code: DEFAULT_BAUD_CODE,
            at_state: AtState::Disabled,
            registered: None,
            exit_requests: 0,
            queued: VecDeque::new(),
            args: Deque::new(),
            inbound: VecDeque::new(),
            sent: Vec::new(),
            inits: Vec::new(),
            busy_steps: 0,
            steps: 0,
            transmit_power: None,
            rssi: 0,
            temperature: 0,
            io_mode: false,
            inputs: [false; DIGITAL_CHANNELS],
            outputs: [false; DIGITAL_CHANNELS],
            analog: [0; 16],
            area: [0xFF; PERSISTENT_AREA_SIZE],
            fail_writes: false,
        }
    }

    /// Queue bytes as if the host sent them in data mode.
    pub fn host_sends(&mut self, bytes: &[u8]) {
        self.serial_rx.extend(bytes.iter().copied());
    }

    /// Queue a completed `AT<mnemonic><args>` line.
    pub fn queue_command(&mut self, mnemonic: &str, args: &[u8]) {
        let opcode = Command::from_mnemonic(mnemonic.as_bytes()).opcode();
        self.queued.push_back((opcode, args.to_vec()));
    }

    /// Queue a frame for delivery on the next MAC step.
    pub fn receive(&mut self, packet_type: u8, sender: u32, payload: &[u8]) {
        self.inbound.push_back(Frame {
            packet_type,
            sender,
            payload: payload.to_vec(),
            rssi: 0x40,
        });
    }

    /// Drain everything written to the host so far.
    pub fn take_serial(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.serial_tx)
    }

    pub fn last_sent(&self) -> Option<&SentPacket> {
        self.sent.last()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

// ── SerialPort ────────────────────────────────────────────────

impl SerialPort for MockHardware {
    fn rx_count(&self) -> usize {
        self.serial_rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.serial_rx.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.serial_tx.push(byte);
    }

    fn baud_code(&self) -> u8 {
        self.baud_code
    }

    fn set_baud_code(&mut self, code: u8) {
        if code <= 4 {
            self.baud_code = code;
        }
    }
}

// ── AtPort ────────────────────────────────────────────────────

impl ArgumentSource for MockHardware {
    fn has_pending(&self) -> bool {
        !self.args.is_empty()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.args.pop_front()
    }
}

impl AtPort for MockHardware {
    fn at_state(&self) -> AtState {
        self.at_state
    }

    fn exit_command_mode(&mut self) {
        self.exit_requests += 1;
        self.at_state = AtState::Disabled;
    }

    fn poll_command(&mut self) -> Option<u8> {
        let (opcode, args) = self.queued.pop_front()?;
        self.args.clear();
        for b in args {
            self.args.push_back(b).expect("mock argument overflow");
        }
        Some(opcode)
    }

    fn register_commands(&mut self, mnemonics: &'static [&'static str]) {
        self.registered = Some(mnemonics);
    }
}

// ── NetworkPort / RadioPort ───────────────────────────────────

impl NetworkPort for MockHardware {
    fn initialize(&mut self, init: &NetworkInit) {
        self.inits.push(*init);
    }

    fn step(&mut self, events: &mut dyn MacEvents) {
        self.steps += 1;
        self.busy_steps = self.busy_steps.saturating_sub(1);
        if let Some(f) = self.inbound.pop_front() {
            events.packet_received(f.packet_type, f.sender, &f.payload, f.rssi);
        }
    }

    fn ready_to_send(&self) -> bool {
        self.busy_steps == 0
    }

    fn send_packet(&mut self, destination: u32, packet_type: u8, payload: &[u8], preamble: u8) {
        self.sent.push(SentPacket {
            destination,
            packet_type,
            payload: payload.to_vec(),
            preamble,
        });
    }
}

impl RadioPort for MockHardware {
    fn set_transmit_power(&mut self, level: u8) {
        self.transmit_power = Some(level);
    }

    fn rssi(&mut self) -> u8 {
        self.rssi
    }

    fn temperature(&mut self) -> u8 {
        self.temperature
    }
}

// ── IoPort ────────────────────────────────────────────────────

impl IoPort for MockHardware {
    fn io_peripheral_selected(&mut self) -> bool {
        self.io_mode
    }

    fn read_analog(&mut self, channel: u8) -> u16 {
        self.analog.get(channel as usize).copied().unwrap_or(0)
    }

    fn read_input(&mut self, channel: u8) -> bool {
        self.inputs.get(channel as usize).copied().unwrap_or(false)
    }

    fn output_state(&mut self, channel: u8) -> bool {
        self.outputs.get(channel as usize).copied().unwrap_or(false)
    }

    fn write_output(&mut self, channel: u8, high: bool) {
        if let Some(o) = self.outputs.get_mut(channel as usize) {
            *o = high;
        }
    }
}

// ── PersistentStore ───────────────────────────────────────────

impl PersistentStore for MockHardware {
    fn erase(&mut self) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.area = [0xFF; PERSISTENT_AREA_SIZE];
        Ok(())
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        let end = offset + bytes.len();
        if end > PERSISTENT_AREA_SIZE {
            return Err(StorageError::OutOfRange);
        }
        self.area[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    fn read_at(&self, offset: usize) -> u8 {
        self.area.get(offset).copied().unwrap_or(0xFF)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<BridgeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn last(&self) -> Option<&BridgeEvent> {
        self.events.last()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BridgeEvent) {
        self.events.push(event.clone());
    }
}
