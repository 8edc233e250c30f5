//! AT command dispatcher.
//!
//! Every command is polymorphic on whether argument bytes are pending:
//! with none it is a query and replies the current value in fixed-width
//! uppercase hex; with some it is a set and parses a value of the same
//! width.  A set that reads no hex digit leaves the field untouched.
//! Radio-affecting sets re-initialise the MAC layer with a full
//! configuration snapshot.

use log::{info, warn};

use crate::config::{DeviceConfiguration, FIRMWARE_VERSION};
use crate::ticks::TickCounters;

use super::commands::{Command, CommandOutcome};
use super::config_store;
use super::hex::{self, U8_DIGITS, U16_DIGITS, U32_DIGITS};
use super::ports::BridgeHardware;

/// State a command may read or mutate besides the hardware.
pub struct CommandContext<'a> {
    pub config: &'a mut DeviceConfiguration,
    pub ticks: &'a TickCounters,
    /// Sender of the most recent inbound packet (`ATGS`).
    pub last_sender: u32,
}

/// Execute one command against the configuration and hardware.
pub fn execute<H: BridgeHardware + ?Sized>(
    command: Command,
    ctx: &mut CommandContext<'_>,
    hw: &mut H,
) -> CommandOutcome {
    let cfg = &mut *ctx.config;
    let outcome = match command {
        Command::MacAddress => reply_hex(hw, cfg.mac_address, U32_DIGITS),
        Command::NetworkId => get_set(hw, &mut cfg.network_id, U32_DIGITS),
        Command::DestinationAddress => get_set(hw, &mut cfg.destination_address, U32_DIGITS),
        Command::ExitCommandMode => {
            hw.exit_command_mode();
            CommandOutcome::ExitRequested
        }
        Command::FactoryReset => {
            cfg.restore_factory();
            info!("Dispatcher: factory defaults restored (not yet saved)");
            CommandOutcome::Applied
        }
        Command::EncryptionKey => encryption_key(hw, cfg),
        Command::BaudRate => baud_rate(hw, cfg),
        Command::Parity | Command::StopBits | Command::SupplyVoltage => CommandOutcome::Ignored,
        Command::Rssi => {
            let rssi = hw.rssi();
            reply_hex(hw, u32::from(rssi), U8_DIGITS)
        }
        Command::Temperature => {
            let t = hw.temperature();
            reply_hex(hw, u32::from(t), U8_DIGITS)
        }
        Command::FirmwareVersion => reply_hex(hw, u32::from(FIRMWARE_VERSION), U8_DIGITS),
        Command::WriteSettings => match config_store::save(hw, cfg) {
            Ok(()) => CommandOutcome::Saved,
            Err(e) => {
                warn!("Dispatcher: settings save failed: {}", e);
                CommandOutcome::SaveFailed(e)
            }
        },
        Command::RadioDataRate => get_set(hw, &mut cfg.radio_data_rate, U8_DIGITS),
        Command::PacketType => get_set(hw, &mut cfg.packet_type, U8_DIGITS),
        Command::TriggerLevel => get_set(hw, &mut cfg.transmit_trigger_level, U8_DIGITS),
        Command::TriggerTimeout => {
            get_set(hw, &mut cfg.transmit_trigger_timeout_ms, U16_DIGITS)
        }
        Command::LastSender => reply_hex(hw, ctx.last_sender, U32_DIGITS),
        Command::TransmitPower => {
            let outcome = get_set(hw, &mut cfg.transmit_power, U8_DIGITS);
            if outcome == CommandOutcome::Applied {
                hw.set_transmit_power(cfg.transmit_power);
            }
            outcome
        }
        Command::TimeReference => {
            let mut secs = ctx.ticks.rtc_secs();
            let outcome = get_set(hw, &mut secs, U32_DIGITS);
            if outcome == CommandOutcome::Applied {
                ctx.ticks.set_rtc_secs(secs);
            }
            outcome
        }
        Command::AckRetries => get_set(hw, &mut cfg.ack_retries, U8_DIGITS),
        Command::AckTimeout => get_set(hw, &mut cfg.ack_timeout, U16_DIGITS),
        Command::HopTable => get_set(hw, &mut cfg.hop_table, U8_DIGITS),
        Command::Null => {
            hw.write_bytes(b"OK");
            CommandOutcome::Acknowledged
        }
    };

    if outcome == CommandOutcome::Applied && command.reinitializes_network() {
        hw.initialize(&cfg.network_init());
        info!("Dispatcher: network re-initialised after AT{}", command.mnemonic());
        return CommandOutcome::NetworkReinitialized;
    }
    outcome
}

fn reply_hex<H: BridgeHardware + ?Sized>(hw: &mut H, value: u32, digits: usize) -> CommandOutcome {
    hw.write_bytes(&hex::encode(value, digits));
    CommandOutcome::Queried
}

/// Query or set a single numeric field.
fn get_set<H, T>(hw: &mut H, field: &mut T, digits: usize) -> CommandOutcome
where
    H: BridgeHardware + ?Sized,
    T: Copy + Into<u32> + TryFrom<u32>,
{
    if !hw.has_pending() {
        return reply_hex(hw, (*field).into(), digits);
    }
    match hex::parse(hw, digits).and_then(|v| T::try_from(v).ok()) {
        Some(v) => {
            *field = v;
            CommandOutcome::Applied
        }
        None => CommandOutcome::Rejected,
    }
}

/// `ATEK`: four 32-bit words, applied only when all four parse.
fn encryption_key<H: BridgeHardware + ?Sized>(
    hw: &mut H,
    cfg: &mut DeviceConfiguration,
) -> CommandOutcome {
    if !hw.has_pending() {
        for word in cfg.encryption_key {
            hw.write_bytes(&hex::encode(word, U32_DIGITS));
        }
        return CommandOutcome::Queried;
    }

    let mut key = [0u32; 4];
    for word in &mut key {
        match hex::parse(hw, U32_DIGITS) {
            Some(v) => *word = v,
            None => return CommandOutcome::Rejected,
        }
    }
    cfg.encryption_key = key;
    CommandOutcome::Applied
}

/// `ATBD`: the query reports the live UART setting, not the stored one.
fn baud_rate<H: BridgeHardware + ?Sized>(
    hw: &mut H,
    cfg: &mut DeviceConfiguration,
) -> CommandOutcome {
    if !hw.has_pending() {
        let code = hw.baud_code();
        return reply_hex(hw, u32::from(code), U8_DIGITS);
    }
    match hex::parse(hw, U8_DIGITS) {
        Some(v) => {
            let code = v as u8;
            cfg.uart_baud_rate = code;
            hw.set_baud_code(code);
            CommandOutcome::Applied
        }
        None => CommandOutcome::Rejected,
    }
}
