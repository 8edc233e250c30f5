//! Transmit trigger engine.
//!
//! Decides when bytes buffered from the serial link become a radio packet:
//!
//! | Buffered count        | Action                                        |
//! |-----------------------|-----------------------------------------------|
//! | `> level`             | flush exactly `level` bytes                   |
//! | `1..=level`           | start idle timer; flush all once `> timeout`  |
//! | `0`                   | stop idle timer                               |
//!
//! A flush blocks until the MAC layer is ready, stepping it meanwhile so
//! inbound frames keep landing in the inbox.

use heapless::Vec;
use log::{debug, warn};

use crate::config::{DeviceConfiguration, MAX_PAYLOAD};
use crate::ticks::TickCounters;

use super::events::FlushReason;
use super::ports::{MacEvents, NetworkPort, SerialPort};

/// Preamble hint passed with every flushed packet.
pub const FLUSH_PREAMBLE: u8 = 128;

/// How long a flush may wait for the MAC layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyWait {
    /// Spin until ready, however long that takes.
    #[default]
    Unbounded,
    /// Give up after `max_steps` network steps and drop the drained bytes.
    Bounded { max_steps: u32 },
}

/// Result of one engine pass that reached a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    Sent { len: usize, reason: FlushReason },
    Abandoned { len: usize, reason: FlushReason },
}

/// Clamp a stored trigger level into the range a single packet can honour.
pub fn effective_level(stored: u8) -> usize {
    (stored as usize).clamp(1, MAX_PAYLOAD)
}

#[derive(Debug, Default)]
pub struct TriggerEngine {
    timer_active: bool,
    wait: ReadyWait,
}

impl TriggerEngine {
    pub fn new(wait: ReadyWait) -> Self {
        Self {
            timer_active: false,
            wait,
        }
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    /// One pass of the trigger policy.
    pub fn run<H>(
        &mut self,
        cfg: &DeviceConfiguration,
        ticks: &TickCounters,
        hw: &mut H,
        events: &mut dyn MacEvents,
    ) -> Option<Flush>
    where
        H: SerialPort + NetworkPort + ?Sized,
    {
        let count = hw.rx_count();
        let level = effective_level(cfg.transmit_trigger_level);

        if count > level {
            return Some(self.flush(level, FlushReason::Level, cfg, hw, events));
        }

        if count == 0 {
            self.timer_active = false;
            return None;
        }

        if !self.timer_active {
            self.timer_active = true;
            ticks.restart_trigger();
            return None;
        }

        if ticks.trigger_elapsed_ms() > u32::from(cfg.transmit_trigger_timeout_ms) {
            return Some(self.flush(count, FlushReason::Timeout, cfg, hw, events));
        }
        None
    }

    fn flush<H>(
        &mut self,
        len: usize,
        reason: FlushReason,
        cfg: &DeviceConfiguration,
        hw: &mut H,
        events: &mut dyn MacEvents,
    ) -> Flush
    where
        H: SerialPort + NetworkPort + ?Sized,
    {
        self.timer_active = false;

        let mut payload: Vec<u8, MAX_PAYLOAD> = Vec::new();
        while payload.len() < len.min(MAX_PAYLOAD) {
            let Some(b) = hw.read_byte() else { break };
            // Loop bound keeps us within capacity.
            let _ = payload.push(b);
        }

        let mut steps: u32 = 0;
        while !hw.ready_to_send() {
            if let ReadyWait::Bounded { max_steps } = self.wait {
                if steps >= max_steps {
                    warn!(
                        "Trigger: MAC not ready after {} steps, dropping {} bytes",
                        steps,
                        payload.len()
                    );
                    return Flush::Abandoned {
                        len: payload.len(),
                        reason,
                    };
                }
            }
            hw.step(events);
            steps = steps.saturating_add(1);
        }

        hw.send_packet(cfg.destination_address, cfg.packet_type, &payload, FLUSH_PREAMBLE);
        debug!(
            "Trigger: {:?} flush of {} bytes to {:08X}",
            reason,
            payload.len(),
            cfg.destination_address
        );
        Flush::Sent {
            len: payload.len(),
            reason,
        }
    }
}
