//! AT command set.
//!
//! Each command is a two-character mnemonic whose position in
//! [`MNEMONICS`] is its opcode.  The AT detector matches incoming lines
//! against that table and hands the bridge an opcode; everything that
//! does not match arrives as [`NULL_OPCODE`].

use super::ports::StorageError;

/// Opcode for a bare `AT` or an unrecognised mnemonic.
pub const NULL_OPCODE: u8 = 0xFF;

/// Mnemonics in opcode order.
pub const MNEMONICS: [&str; 24] = [
    "SL", "NA", "DL", "CN", "RE", "EK", "BD", "NB", "SB", "SS", "TE", "%V", "VR", "WS", "RR",
    "SP", "TL", "TT", "GS", "TP", "TS", "AR", "AT", "HT",
];

/// Decoded AT command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `SL` — this node's MAC address (query only).
    MacAddress,
    /// `NA` — network identifier.
    NetworkId,
    /// `DL` — transparent-mode destination.
    DestinationAddress,
    /// `CN` — leave command mode.
    ExitCommandMode,
    /// `RE` — restore factory defaults in memory.
    ///
    /// Unlike earlier rfBrick firmware, where `ATRE` was accepted as a
    /// no-op, this resets every field except the live baud code and
    /// re-initialises the MAC. Nothing is persisted until `WS`.
    FactoryReset,
    /// `EK` — 128-bit encryption key.
    EncryptionKey,
    /// `BD` — UART baud code.
    BaudRate,
    /// `NB` — parity (accepted, no effect).
    Parity,
    /// `SB` — stop bits (accepted, no effect).
    StopBits,
    /// `SS` — received signal strength.
    Rssi,
    /// `TE` — transceiver temperature.
    Temperature,
    /// `%V` — supply voltage (accepted, no effect).
    SupplyVoltage,
    /// `VR` — firmware version.
    FirmwareVersion,
    /// `WS` — persist the configuration.
    WriteSettings,
    /// `RR` — radio data rate.
    RadioDataRate,
    /// `SP` — outbound packet type.
    PacketType,
    /// `TL` — transmit trigger level.
    TriggerLevel,
    /// `TT` — transmit trigger timeout.
    TriggerTimeout,
    /// `GS` — sender of the last inbound packet.
    LastSender,
    /// `TP` — transmit power.
    TransmitPower,
    /// `TS` — RTC time reference in seconds.
    TimeReference,
    /// `AR` — acknowledgement retries.
    AckRetries,
    /// `AT` — acknowledgement timeout.
    AckTimeout,
    /// `HT` — hop table.
    HopTable,
    /// Bare `AT` or anything unrecognised.
    Null,
}

impl Command {
    const TABLE: [Command; 24] = [
        Command::MacAddress,
        Command::NetworkId,
        Command::DestinationAddress,
        Command::ExitCommandMode,
        Command::FactoryReset,
        Command::EncryptionKey,
        Command::BaudRate,
        Command::Parity,
        Command::StopBits,
        Command::Rssi,
        Command::Temperature,
        Command::SupplyVoltage,
        Command::FirmwareVersion,
        Command::WriteSettings,
        Command::RadioDataRate,
        Command::PacketType,
        Command::TriggerLevel,
        Command::TriggerTimeout,
        Command::LastSender,
        Command::TransmitPower,
        Command::TimeReference,
        Command::AckRetries,
        Command::AckTimeout,
        Command::HopTable,
    ];

    pub fn from_opcode(opcode: u8) -> Self {
        Self::TABLE
            .get(opcode as usize)
            .copied()
            .unwrap_or(Command::Null)
    }

    pub fn opcode(self) -> u8 {
        Self::TABLE
            .iter()
            .position(|c| *c == self)
            .map_or(NULL_OPCODE, |i| i as u8)
    }

    /// Match a two-byte mnemonic, case-insensitively.
    pub fn from_mnemonic(text: &[u8]) -> Self {
        MNEMONICS
            .iter()
            .position(|m| m.as_bytes().eq_ignore_ascii_case(text))
            .map_or(Command::Null, |i| Self::TABLE[i])
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Command::Null => "AT",
            other => MNEMONICS[other.opcode() as usize],
        }
    }

    /// Whether a successful set re-initialises the MAC layer.
    pub fn reinitializes_network(self) -> bool {
        matches!(
            self,
            Command::NetworkId
                | Command::RadioDataRate
                | Command::EncryptionKey
                | Command::AckRetries
                | Command::AckTimeout
                | Command::HopTable
                | Command::FactoryReset
        )
    }
}

/// What executing a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A query reply was written to serial.
    Queried,
    /// A set succeeded.
    Applied,
    /// A set succeeded and the MAC layer was re-initialised.
    NetworkReinitialized,
    /// The argument did not parse; nothing changed.
    Rejected,
    /// Configuration written to the persistent area.
    Saved,
    SaveFailed(StorageError),
    /// Command mode exit requested.
    ExitRequested,
    /// `OK` written for a null command.
    Acknowledged,
    /// Accepted without effect.
    Ignored,
}
