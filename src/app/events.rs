//! Outbound bridge events.
//!
//! The [`Bridge`](super::service::Bridge) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; on target they become log lines.

use super::commands::{Command, CommandOutcome};

/// Which role the mode strap currently selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMode {
    /// Serial bytes become radio packets and vice versa.
    Transparent,
    /// Inbound packets are remote I/O requests.
    IoPeripheral,
}

/// What caused buffered serial data to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Buffered count exceeded the trigger level.
    Level,
    /// Partial buffer sat idle past the trigger timeout.
    Timeout,
}

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Boot finished (carries the initial mode).
    Started { mode: BridgeMode, quiet: bool },

    /// The mode strap changed level.
    ModeChanged { from: BridgeMode, to: BridgeMode },

    /// An AT command ran.
    CommandExecuted {
        command: Command,
        outcome: CommandOutcome,
    },

    /// Buffered serial data went out as one packet.
    PacketFlushed {
        destination: u32,
        len: usize,
        reason: FlushReason,
    },

    /// A bounded ready-wait expired; the drained bytes were dropped.
    FlushAbandoned { len: usize },

    /// An inbound payload was written to serial.
    PacketForwarded { sender: u32, len: usize },

    /// A remote I/O request was answered.
    RemoteIoAnswered {
        sender: u32,
        sub_command: Option<u8>,
        acked: bool,
    },
}
