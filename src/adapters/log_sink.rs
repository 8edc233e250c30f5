//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured bridge events to the
//! ESP-IDF logger (which goes to the debug console, not the host link).

use log::{info, warn};

use crate::app::commands::CommandOutcome;
use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Started { mode, quiet } => {
                info!("START | mode={:?} quiet={}", mode, quiet);
            }
            BridgeEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            BridgeEvent::CommandExecuted { command, outcome } => match outcome {
                CommandOutcome::Rejected => warn!("AT    | {} rejected argument", command.mnemonic()),
                CommandOutcome::SaveFailed(e) => warn!("AT    | {} save failed: {}", command.mnemonic(), e),
                other => info!("AT    | {} {:?}", command.mnemonic(), other),
            },
            BridgeEvent::PacketFlushed {
                destination,
                len,
                reason,
            } => {
                info!("TX    | {} bytes -> {:08X} ({:?})", len, destination, reason);
            }
            BridgeEvent::FlushAbandoned { len } => {
                warn!("TX    | abandoned {} bytes, MAC never ready", len);
            }
            BridgeEvent::PacketForwarded { sender, len } => {
                info!("RX    | {} bytes from {:08X} -> serial", len, sender);
            }
            BridgeEvent::RemoteIoAnswered {
                sender,
                sub_command,
                acked,
            } => {
                info!(
                    "IO    | req={:?} from {:08X} -> {}",
                    sub_command,
                    sender,
                    if *acked { "ACK" } else { "NACK" }
                );
            }
        }
    }
}
