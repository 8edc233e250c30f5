//! Hardware adapter — bridges real peripherals to the domain port traits.
//!
//! Owns the UART, the AT escape detector, the MAC link, the pin bank, and
//! the persistent area, exposing them as one [`BridgeHardware`] borrow.
//! Raw UART bytes are pumped through the detector each time the bridge
//! polls for a command; data-mode bytes collect in a fixed queue that the
//! trigger engine drains through [`SerialPort`].
//!
//! [`BridgeHardware`]: crate::app::ports::BridgeHardware

use heapless::Deque;

use crate::app::ports::{
    ArgumentSource, AtPort, AtState, IoPort, MacEvents, NetworkPort, PersistentStore, RadioPort,
    SerialPort, StorageError,
};
use crate::config::NetworkInit;
use crate::ticks::TickCounters;

use super::at_escape::AtEscapeDetector;
use super::mac_link::MacLink;
use super::nvs::NvsArea;
use super::uart::Uart;

/// Data-mode bytes buffered ahead of the trigger engine.
pub const DATA_QUEUE: usize = 256;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P> {
    uart: Uart,
    detector: AtEscapeDetector,
    rx_data: Deque<u8, DATA_QUEUE>,
    link: MacLink,
    pins: P,
    area: NvsArea,
    ticks: &'static TickCounters,
}

impl<P: IoPort> HardwareAdapter<P> {
    pub fn new(
        uart: Uart,
        link: MacLink,
        pins: P,
        area: NvsArea,
        ticks: &'static TickCounters,
    ) -> Self {
        Self {
            uart,
            detector: AtEscapeDetector::new(),
            rx_data: Deque::new(),
            link,
            pins,
            area,
            ticks,
        }
    }

    /// Move raw UART bytes through the escape detector.
    ///
    /// Stops reading while the data queue is full so the driver's own
    /// buffer absorbs the backlog; command-mode bytes always flow.
    fn pump(&mut self) {
        let now = self.ticks.uptime_ms();
        loop {
            if self.rx_data.is_full() && self.detector.state() != AtState::Enabled {
                break;
            }
            let Some(byte) = self.uart.read() else { break };
            self.detector.feed(byte, now, &mut self.rx_data);
        }
        self.detector.tick(now);
    }

    pub fn uart_mut(&mut self) -> &mut Uart {
        &mut self.uart
    }

    pub fn link_mut(&mut self) -> &mut MacLink {
        &mut self.link
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }
}

// ── SerialPort implementation ─────────────────────────────────

impl<P> SerialPort for HardwareAdapter<P> {
    fn rx_count(&self) -> usize {
        self.rx_data.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx_data.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.uart.write(&[byte]);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.uart.write(bytes);
    }

    fn baud_code(&self) -> u8 {
        self.uart.baud_code()
    }

    fn set_baud_code(&mut self, code: u8) {
        self.uart.set_baud_code(code);
    }
}

// ── AtPort implementation ─────────────────────────────────────

impl<P> ArgumentSource for HardwareAdapter<P> {
    fn has_pending(&self) -> bool {
        self.detector.has_pending()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.detector.next_byte()
    }
}

impl<P: IoPort> AtPort for HardwareAdapter<P> {
    fn at_state(&self) -> AtState {
        self.detector.state()
    }

    fn exit_command_mode(&mut self) {
        self.detector.exit_command_mode();
    }

    fn poll_command(&mut self) -> Option<u8> {
        self.pump();
        self.detector.poll_command()
    }

    fn register_commands(&mut self, mnemonics: &'static [&'static str]) {
        self.detector.register(mnemonics);
    }
}

// ── NetworkPort / RadioPort implementation ────────────────────

impl<P> NetworkPort for HardwareAdapter<P> {
    fn initialize(&mut self, init: &NetworkInit) {
        self.link.initialize(init);
    }

    fn step(&mut self, events: &mut dyn MacEvents) {
        self.link.step(events);
    }

    fn ready_to_send(&self) -> bool {
        self.link.ready_to_send()
    }

    fn send_packet(&mut self, destination: u32, packet_type: u8, payload: &[u8], preamble: u8) {
        self.link.send_packet(destination, packet_type, payload, preamble);
    }
}

impl<P> RadioPort for HardwareAdapter<P> {
    fn set_transmit_power(&mut self, level: u8) {
        self.link.set_transmit_power(level);
    }

    fn rssi(&mut self) -> u8 {
        self.link.rssi()
    }

    fn temperature(&mut self) -> u8 {
        self.link.temperature()
    }
}

// ── IoPort implementation ─────────────────────────────────────

impl<P: IoPort> IoPort for HardwareAdapter<P> {
    fn io_peripheral_selected(&mut self) -> bool {
        self.pins.io_peripheral_selected()
    }

    fn read_analog(&mut self, channel: u8) -> u16 {
        self.pins.read_analog(channel)
    }

    fn read_input(&mut self, channel: u8) -> bool {
        self.pins.read_input(channel)
    }

    fn output_state(&mut self, channel: u8) -> bool {
        self.pins.output_state(channel)
    }

    fn write_output(&mut self, channel: u8, high: bool) {
        self.pins.write_output(channel, high);
    }
}

// ── PersistentStore implementation ────────────────────────────

impl<P> PersistentStore for HardwareAdapter<P> {
    fn erase(&mut self) -> Result<(), StorageError> {
        self.area.erase()
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StorageError> {
        self.area.write_at(offset, bytes)
    }

    fn read_at(&self, offset: usize) -> u8 {
        self.area.read_at(offset)
    }
}
