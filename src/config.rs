//! Device configuration parameters
//!
//! Every radio, serial, and trigger parameter the bridge persists.
//! Values are loaded from the persistent area at boot, mutated by AT
//! commands, and written back only on an explicit `ATWS`.

use serde::{Deserialize, Serialize};

/// Largest payload a single radio packet can carry.
pub const MAX_PAYLOAD: usize = 63;

/// Number of remotely addressable digital channels.
pub const DIGITAL_CHANNELS: usize = 5;

/// Number of analog trigger thresholds.
pub const ANALOG_CHANNELS: usize = 6;

/// Firmware version reported by `ATVR` (major nibble, minor nibble).
pub const FIRMWARE_VERSION: u8 = 0x01;

/// Boot banner, suppressed when `quiet` is set.
pub const BANNER: &str = "rfBrick version 0.1A\n\r";

/// UART baud rates indexed by the persisted baud code.
pub const BAUD_RATES: [u32; 5] = [9_600, 19_200, 38_400, 57_600, 115_200];

/// Baud code applied when nothing valid is stored.
pub const DEFAULT_BAUD_CODE: u8 = 4;

/// Outbound packet type tags understood by the MAC layer.
pub mod packet_type {
    /// Unicast with link-layer acknowledgement.
    pub const UNICAST_ACK: u8 = 0;
    /// Unicast, fire and forget.
    pub const UNICAST: u8 = 1;
    /// Network-wide multicast.
    pub const MULTICAST: u8 = 2;
}

/// Radio data-rate code for 38.4 kbps, the factory setting.
pub const DEFAULT_RADIO_RATE: u8 = 2;

// Fixed network parameters sent with every re-initialisation.
const CHANNEL_COUNT: u8 = 25;
const START_CHANNEL: u8 = 0;
const GFSK_MODIFIER: u8 = 1;

/// Translate a baud code into a line rate.
pub fn baud_rate_for(code: u8) -> Option<u32> {
    BAUD_RATES.get(code as usize).copied()
}

/// The persisted configuration aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    // --- Addressing ---
    /// Mesh network identifier.
    pub network_id: u32,
    /// This node's MAC address.
    pub mac_address: u32,
    /// Where transparent-mode packets are sent.
    pub destination_address: u32,
    /// 128-bit link key, word 0 is the most significant.
    pub encryption_key: [u32; 4],

    // --- Radio ---
    pub radio_data_rate: u8,
    pub transmit_power: u8,
    pub ack_retries: u8,
    /// Acknowledgement timeout in MAC ticks.
    pub ack_timeout: u16,
    pub hop_table: u8,
    /// Packet type tag for every outbound packet.
    pub packet_type: u8,

    // --- Serial ---
    /// Index into [`BAUD_RATES`].
    pub uart_baud_rate: u8,
    pub operating_mode: u8,
    /// Suppress the boot banner.
    pub quiet: bool,

    // --- Transmit trigger ---
    /// Buffered byte count that forces a flush.
    pub transmit_trigger_level: u8,
    /// Idle time (ms) after which a partial buffer is flushed.
    pub transmit_trigger_timeout_ms: u16,

    // --- Remote I/O ---
    pub digital_triggers: [u8; DIGITAL_CHANNELS],
    pub analog_triggers: [u16; ANALOG_CHANNELS],
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self {
            network_id: 0x1133_2244,
            mac_address: 0x1122_3344,
            destination_address: 0x4433_2211,
            encryption_key: [0x1122_3344, 0x1A1B_1C1D, 0x1E1F_1A1B, 0x1C1D_1E1F],

            radio_data_rate: DEFAULT_RADIO_RATE,
            transmit_power: 0,
            ack_retries: 0,
            ack_timeout: 0,
            hop_table: 0,
            packet_type: packet_type::MULTICAST,

            uart_baud_rate: DEFAULT_BAUD_CODE,
            operating_mode: 0,
            quiet: false,

            transmit_trigger_level: 4,
            transmit_trigger_timeout_ms: 200,

            digital_triggers: [0; DIGITAL_CHANNELS],
            analog_triggers: [0; ANALOG_CHANNELS],
        }
    }
}

impl DeviceConfiguration {
    /// Snapshot of the parameters the MAC layer needs on (re)initialisation.
    pub fn network_init(&self) -> NetworkInit {
        NetworkInit {
            mac_address: self.mac_address,
            network_id: self.network_id,
            encryption_key: self.encryption_key,
            radio_data_rate: self.radio_data_rate,
            ack_retries: self.ack_retries,
            ack_timeout: self.ack_timeout,
            hop_table: self.hop_table,
            channel_count: CHANNEL_COUNT,
            start_channel: START_CHANNEL,
            gfsk_modifier: GFSK_MODIFIER,
        }
    }

    /// Return every field to factory values, keeping the live baud code
    /// so the host link survives the reset.
    pub fn restore_factory(&mut self) {
        let baud = self.uart_baud_rate;
        *self = Self::default();
        self.uart_baud_rate = baud;
    }
}

/// Parameters handed to the MAC layer when it is (re)initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInit {
    pub mac_address: u32,
    pub network_id: u32,
    pub encryption_key: [u32; 4],
    pub radio_data_rate: u8,
    pub ack_retries: u8,
    pub ack_timeout: u16,
    pub hop_table: u8,
    pub channel_count: u8,
    pub start_channel: u8,
    pub gfsk_modifier: u8,
}
