//! Configuration store — fixed-offset persistence of [`DeviceConfiguration`].
//!
//! The layout is a flat big-endian record at the start of the persistent
//! area with a validity sentinel near the end:
//!
//! ```text
//!  0 network_id (4)        29 ack_retries          37 mac_address (4)
//!  4 destination (4)       30 ack_timeout (2)      41 digital_triggers (5)
//!  8 encryption_key (16)   32 hop_table            46 analog_triggers (12)
//! 24 operating_mode        33 quiet
//! 25 uart_baud_rate        34 radio_data_rate     254 sentinel 0x55
//! 26 trigger_level         35 transmit_power
//! 27 trigger_timeout (2)   36 packet_type
//! ```
//!
//! A load without the sentinel yields factory defaults and leaves the
//! area untouched.  A save erases, writes the record, and writes the
//! sentinel last so a torn save reads back as "never saved".

use log::{info, warn};

use crate::config::{ANALOG_CHANNELS, DIGITAL_CHANNELS, DeviceConfiguration};

use super::ports::{PersistentStore, StorageError};

/// Marks the area as holding a committed configuration.
pub const SENTINEL: u8 = 0x55;
/// Offset of the sentinel byte.
pub const SENTINEL_OFFSET: usize = 254;

const OFF_NETWORK_ID: usize = 0;
const OFF_DESTINATION: usize = 4;
const OFF_KEY: usize = 8;
const OFF_OPERATING_MODE: usize = 24;
const OFF_UART_BAUD: usize = 25;
const OFF_TRIGGER_LEVEL: usize = 26;
const OFF_TRIGGER_TIMEOUT: usize = 27;
const OFF_ACK_RETRIES: usize = 29;
const OFF_ACK_TIMEOUT: usize = 30;
const OFF_HOP_TABLE: usize = 32;
const OFF_QUIET: usize = 33;
const OFF_RADIO_RATE: usize = 34;
const OFF_TX_POWER: usize = 35;
const OFF_PACKET_TYPE: usize = 36;
const OFF_MAC: usize = 37;
const OFF_DIGITAL_TRIGGERS: usize = 41;
const OFF_ANALOG_TRIGGERS: usize = 46;
/// One past the last record byte.
pub const RECORD_LEN: usize = OFF_ANALOG_TRIGGERS + ANALOG_CHANNELS * 2;

/// Read the configuration, falling back to factory defaults when the
/// sentinel is missing.
pub fn load<S: PersistentStore + ?Sized>(store: &S) -> DeviceConfiguration {
    if store.read_at(SENTINEL_OFFSET) != SENTINEL {
        info!("ConfigStore: no saved settings, using factory defaults");
        return DeviceConfiguration::default();
    }

    let mut record = [0u8; RECORD_LEN];
    for (i, b) in record.iter_mut().enumerate() {
        *b = store.read_at(i);
    }
    let cfg = decode(&record);
    info!("ConfigStore: settings loaded");
    cfg
}

/// Persist the full configuration.
pub fn save<S: PersistentStore + ?Sized>(
    store: &mut S,
    cfg: &DeviceConfiguration,
) -> Result<(), StorageError> {
    store.erase()?;
    store.write_at(0, &encode(cfg))?;
    store.write_at(SENTINEL_OFFSET, &[SENTINEL])?;
    info!("ConfigStore: settings saved ({} bytes)", RECORD_LEN);
    Ok(())
}

/// Serialize to the on-flash record.
pub fn encode(cfg: &DeviceConfiguration) -> [u8; RECORD_LEN] {
    let mut r = [0u8; RECORD_LEN];
    r[OFF_NETWORK_ID..OFF_NETWORK_ID + 4].copy_from_slice(&cfg.network_id.to_be_bytes());
    r[OFF_DESTINATION..OFF_DESTINATION + 4]
        .copy_from_slice(&cfg.destination_address.to_be_bytes());
    for (i, word) in cfg.encryption_key.iter().enumerate() {
        let at = OFF_KEY + i * 4;
        r[at..at + 4].copy_from_slice(&word.to_be_bytes());
    }
    r[OFF_OPERATING_MODE] = cfg.operating_mode;
    r[OFF_UART_BAUD] = cfg.uart_baud_rate;
    r[OFF_TRIGGER_LEVEL] = cfg.transmit_trigger_level;
    r[OFF_TRIGGER_TIMEOUT..OFF_TRIGGER_TIMEOUT + 2]
        .copy_from_slice(&cfg.transmit_trigger_timeout_ms.to_be_bytes());
    r[OFF_ACK_RETRIES] = cfg.ack_retries;
    r[OFF_ACK_TIMEOUT..OFF_ACK_TIMEOUT + 2].copy_from_slice(&cfg.ack_timeout.to_be_bytes());
    r[OFF_HOP_TABLE] = cfg.hop_table;
    r[OFF_QUIET] = u8::from(cfg.quiet);
    r[OFF_RADIO_RATE] = cfg.radio_data_rate;
    r[OFF_TX_POWER] = cfg.transmit_power;
    r[OFF_PACKET_TYPE] = cfg.packet_type;
    r[OFF_MAC..OFF_MAC + 4].copy_from_slice(&cfg.mac_address.to_be_bytes());
    r[OFF_DIGITAL_TRIGGERS..OFF_DIGITAL_TRIGGERS + DIGITAL_CHANNELS]
        .copy_from_slice(&cfg.digital_triggers);
    for (i, t) in cfg.analog_triggers.iter().enumerate() {
        let at = OFF_ANALOG_TRIGGERS + i * 2;
        r[at..at + 2].copy_from_slice(&t.to_be_bytes());
    }
    r
}

/// Deserialize the on-flash record.
pub fn decode(r: &[u8; RECORD_LEN]) -> DeviceConfiguration {
    let u32_at = |at: usize| u32::from_be_bytes([r[at], r[at + 1], r[at + 2], r[at + 3]]);
    let u16_at = |at: usize| u16::from_be_bytes([r[at], r[at + 1]]);

    let quiet = match r[OFF_QUIET] {
        0 => false,
        1 => true,
        other => {
            warn!("ConfigStore: quiet byte {:#04x} treated as set", other);
            true
        }
    };

    let mut digital_triggers = [0u8; DIGITAL_CHANNELS];
    digital_triggers
        .copy_from_slice(&r[OFF_DIGITAL_TRIGGERS..OFF_DIGITAL_TRIGGERS + DIGITAL_CHANNELS]);

    DeviceConfiguration {
        network_id: u32_at(OFF_NETWORK_ID),
        mac_address: u32_at(OFF_MAC),
        destination_address: u32_at(OFF_DESTINATION),
        encryption_key: core::array::from_fn(|i| u32_at(OFF_KEY + i * 4)),
        radio_data_rate: r[OFF_RADIO_RATE],
        transmit_power: r[OFF_TX_POWER],
        ack_retries: r[OFF_ACK_RETRIES],
        ack_timeout: u16_at(OFF_ACK_TIMEOUT),
        hop_table: r[OFF_HOP_TABLE],
        packet_type: r[OFF_PACKET_TYPE],
        uart_baud_rate: r[OFF_UART_BAUD],
        operating_mode: r[OFF_OPERATING_MODE],
        quiet,
        transmit_trigger_level: r[OFF_TRIGGER_LEVEL],
        transmit_trigger_timeout_ms: u16_at(OFF_TRIGGER_TIMEOUT),
        digital_triggers,
        analog_triggers: core::array::from_fn(|i| u16_at(OFF_ANALOG_TRIGGERS + i * 2)),
    }
}
