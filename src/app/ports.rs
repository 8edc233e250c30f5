//! Port traits — the hexagonal boundary between the bridge engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Bridge (domain)
//! ```
//!
//! Driven adapters (UART, MAC library, radio, pins, persistent area, AT
//! detector) implement these traits.  The [`Bridge`](super::service::Bridge)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::config::NetworkInit;

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: host link ↔ domain)
// ───────────────────────────────────────────────────────────────

/// The data side of the serial link.
///
/// `rx_count`/`read_byte` see only payload bytes; anything the AT detector
/// claimed as command traffic never shows up here.
pub trait SerialPort {
    /// Number of received bytes waiting to be read.
    fn rx_count(&self) -> usize;

    /// Pop the oldest received byte.
    fn read_byte(&mut self) -> Option<u8>;

    fn write_byte(&mut self, byte: u8);

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    /// Live baud code (index into [`BAUD_RATES`](crate::config::BAUD_RATES)).
    fn baud_code(&self) -> u8;

    /// Request a new baud code.  Unknown codes are ignored by the adapter.
    fn set_baud_code(&mut self, code: u8);
}

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: MAC library ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Why the MAC layer gave up on an outbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// No acknowledgement after all retries.
    NoAck,
    /// The channel never went clear.
    ChannelBusy,
    /// The MAC layer refused the frame.
    Rejected,
}

/// Notifications the MAC layer delivers synchronously from [`NetworkPort::step`].
pub trait MacEvents {
    fn packet_received(&mut self, packet_type: u8, sender: u32, payload: &[u8], rssi: u8);
    fn receive_error(&mut self);
    fn packet_sent(&mut self);
    fn send_error(&mut self, error: SendError);
}

/// Black-box packet service: addressing, acks, hopping, and crypto live
/// on the far side of this trait.
pub trait NetworkPort {
    /// (Re)initialise the MAC with a full parameter snapshot.
    fn initialize(&mut self, init: &NetworkInit);

    /// Run one MAC state-machine step, delivering any notifications.
    fn step(&mut self, events: &mut dyn MacEvents);

    /// True when a new packet may be handed to [`send_packet`](Self::send_packet).
    fn ready_to_send(&self) -> bool;

    fn send_packet(&mut self, destination: u32, packet_type: u8, payload: &[u8], preamble: u8);
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: transceiver → domain)
// ───────────────────────────────────────────────────────────────

pub trait RadioPort {
    fn set_transmit_power(&mut self, level: u8);

    /// Last RSSI reading, raw transceiver units.
    fn rssi(&mut self) -> u8;

    /// Die temperature, raw transceiver units.
    fn temperature(&mut self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// I/O port (driven adapter: pins / ADC ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Digital and analog channels exposed to remote I/O requests, plus the
/// mode-select strap.
pub trait IoPort {
    /// Mode strap: `true` selects I/O-peripheral mode.
    fn io_peripheral_selected(&mut self) -> bool;

    /// 10-bit ADC sample from `channel`.
    fn read_analog(&mut self, channel: u8) -> u16;

    /// Level on digital input `channel` (0–4).
    fn read_input(&mut self, channel: u8) -> bool;

    /// Current latch state of digital output `channel` (0–4).
    fn output_state(&mut self, channel: u8) -> bool;

    fn write_output(&mut self, channel: u8, high: bool);
}

// ───────────────────────────────────────────────────────────────
// AT command port (driven adapter: escape detector → domain)
// ───────────────────────────────────────────────────────────────

/// A queue of argument bytes that followed a command mnemonic.
pub trait ArgumentSource {
    fn has_pending(&self) -> bool;
    fn next_byte(&mut self) -> Option<u8>;
}

impl<const N: usize> ArgumentSource for heapless::Deque<u8, N> {
    fn has_pending(&self) -> bool {
        !self.is_empty()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// Progress of the `+++` escape detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtState {
    /// Transparent data mode.
    Disabled,
    Plus1,
    Plus2,
    /// Three pluses seen, waiting out the guard time.
    Plus3,
    /// Command mode.
    Enabled,
}

/// The AT escape detector and its command-line buffer.
pub trait AtPort: ArgumentSource {
    fn at_state(&self) -> AtState;

    /// Leave command mode and resume transparent data.
    fn exit_command_mode(&mut self);

    /// Opcode of the next completed command line, if any.  Its argument
    /// bytes are available through [`ArgumentSource`] until the next poll.
    fn poll_command(&mut self) -> Option<u8>;

    /// Mnemonics in opcode order.
    fn register_commands(&mut self, mnemonics: &'static [&'static str]);
}

// ───────────────────────────────────────────────────────────────
// Persistent store (driven adapter: domain ↔ flash / NVS)
// ───────────────────────────────────────────────────────────────

/// Size of the persistent configuration area in bytes.
pub const PERSISTENT_AREA_SIZE: usize = 256;

/// A small byte-addressed non-volatile area.
pub trait PersistentStore {
    /// Reset the whole area to the erased state.
    fn erase(&mut self) -> Result<(), StorageError>;

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StorageError>;

    /// Byte at `offset`; out-of-range reads return the erased value.
    fn read_at(&self, offset: usize) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}

// ───────────────────────────────────────────────────────────────
// Composite
// ───────────────────────────────────────────────────────────────

/// Everything the bridge loop drives, as one borrow.
pub trait BridgeHardware:
    SerialPort + NetworkPort + RadioPort + IoPort + AtPort + PersistentStore
{
}

impl<T> BridgeHardware for T where
    T: SerialPort + NetworkPort + RadioPort + IoPort + AtPort + PersistentStore
{
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`PersistentStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Write would run past the end of the area.
    OutOfRange,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "offset out of range"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
