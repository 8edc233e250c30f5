//! Single-slot inbound packet holder.
//!
//! The MAC layer reports received frames through [`MacEvents`].  There is
//! exactly one slot: a frame that arrives before the previous one was
//! consumed replaces it, and the overwrite is only counted.

use heapless::Vec;
use log::{debug, warn};

use crate::config::MAX_PAYLOAD;

use super::ports::{MacEvents, SendError};

/// The most recent frame delivered by the MAC layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundPacket {
    pub sender: u32,
    pub packet_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD>,
    pub rssi: u8,
}

/// Link-level counters, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub overwritten: u32,
    pub receive_errors: u32,
    pub sent: u32,
    pub send_errors: u32,
}

#[derive(Debug, Default)]
pub struct Inbox {
    packet: InboundPacket,
    received: bool,
    stats: LinkStats,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unconsumed packet, if any.
    pub fn pending(&self) -> Option<&InboundPacket> {
        self.received.then_some(&self.packet)
    }

    /// Consume the pending packet.
    pub fn take(&mut self) -> Option<InboundPacket> {
        if !self.received {
            return None;
        }
        self.received = false;
        Some(self.packet.clone())
    }

    /// Sender of the most recent frame, consumed or not.
    pub fn last_sender(&self) -> u32 {
        self.packet.sender
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}

impl MacEvents for Inbox {
    fn packet_received(&mut self, packet_type: u8, sender: u32, payload: &[u8], rssi: u8) {
        if self.received {
            self.stats.overwritten = self.stats.overwritten.wrapping_add(1);
            debug!(
                "Inbox: frame from {:08X} overwrote unconsumed frame from {:08X}",
                sender, self.packet.sender
            );
        }
        let len = payload.len().min(MAX_PAYLOAD);
        if len < payload.len() {
            warn!("Inbox: truncating {}-byte payload to {}", payload.len(), MAX_PAYLOAD);
        }
        self.packet.payload.clear();
        // len is clamped to the slot capacity.
        let _ = self.packet.payload.extend_from_slice(&payload[..len]);
        self.packet.sender = sender;
        self.packet.packet_type = packet_type;
        self.packet.rssi = rssi;
        self.received = true;
    }

    fn receive_error(&mut self) {
        self.stats.receive_errors = self.stats.receive_errors.wrapping_add(1);
        debug!("Inbox: receive error");
    }

    fn packet_sent(&mut self) {
        self.stats.sent = self.stats.sent.wrapping_add(1);
    }

    fn send_error(&mut self, error: SendError) {
        self.stats.send_errors = self.stats.send_errors.wrapping_add(1);
        warn!("Inbox: send failed ({:?}), not retried", error);
    }
}
