//! Bridge service — the hexagonal core.
//!
//! [`Bridge`] owns the configuration, the inbound packet slot, and the
//! transmit trigger state.  It exposes a boot step and a single
//! [`iterate`](Bridge::iterate) call that the firmware runs forever.  All
//! I/O flows through port traits injected at call sites, making the whole
//! loop testable with mock adapters.
//!
//! ```text
//!   SerialPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  NetworkPort ◀──▶│         Bridge           │
//!       AtPort ──▶ │ Dispatcher · Trigger ·   │
//!       IoPort ◀──▶│ RemoteIo · Inbox         │
//!                  └──────────────────────────┘
//! ```

use log::info;

use crate::config::{BANNER, DeviceConfiguration};
use crate::ticks::TickCounters;

use super::commands::{Command, MNEMONICS};
use super::config_store;
use super::dispatcher::{self, CommandContext};
use super::events::{BridgeEvent, BridgeMode};
use super::inbox::{Inbox, LinkStats};
use super::ports::{AtState, BridgeHardware, EventSink};
use super::remote_io::{self, ACK};
use super::trigger::{Flush, ReadyWait, TriggerEngine};

/// Preamble value that leaves the choice to the MAC layer.
pub const DEFAULT_PREAMBLE: u8 = 0;

// ───────────────────────────────────────────────────────────────
// Bridge
// ───────────────────────────────────────────────────────────────

pub struct Bridge {
    config: DeviceConfiguration,
    ticks: &'static TickCounters,
    inbox: Inbox,
    trigger: TriggerEngine,
    mode: BridgeMode,
}

impl Bridge {
    /// Construct with factory configuration.
    ///
    /// Does **not** touch hardware — call [`boot`](Self::boot) next.
    pub fn new(ticks: &'static TickCounters, wait: ReadyWait) -> Self {
        Self {
            config: DeviceConfiguration::default(),
            ticks,
            inbox: Inbox::new(),
            trigger: TriggerEngine::new(wait),
            mode: BridgeMode::Transparent,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load settings, bring the link and radio up, and greet the host.
    pub fn boot(&mut self, hw: &mut impl BridgeHardware, sink: &mut impl EventSink) {
        self.config = config_store::load(&*hw);

        hw.register_commands(&MNEMONICS);
        hw.set_baud_code(self.config.uart_baud_rate);
        hw.initialize(&self.config.network_init());
        hw.set_transmit_power(self.config.transmit_power);

        self.mode = Self::read_mode(hw);

        if !self.config.quiet {
            hw.write_bytes(BANNER.as_bytes());
        }

        sink.emit(&BridgeEvent::Started {
            mode: self.mode,
            quiet: self.config.quiet,
        });
        info!("Bridge started in {:?} mode", self.mode);
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One pass of the control loop.
    pub fn iterate(&mut self, hw: &mut impl BridgeHardware, sink: &mut impl EventSink) {
        // 1. Step the MAC layer; received frames land in the inbox
        hw.step(&mut self.inbox);

        // 2. Service the AT command processor
        if let Some(opcode) = hw.poll_command() {
            let command = Command::from_opcode(opcode);
            let mut ctx = CommandContext {
                config: &mut self.config,
                ticks: self.ticks,
                last_sender: self.inbox.last_sender(),
            };
            let outcome = dispatcher::execute(command, &mut ctx, hw);
            sink.emit(&BridgeEvent::CommandExecuted { command, outcome });
        }

        // 3. Level-triggered mode arbitration
        let mode = Self::read_mode(hw);
        if mode != self.mode {
            info!("Bridge mode {:?} -> {:?}", self.mode, mode);
            sink.emit(&BridgeEvent::ModeChanged {
                from: self.mode,
                to: mode,
            });
            self.mode = mode;
        }

        // 4. Mode behaviour
        match mode {
            BridgeMode::IoPeripheral => self.serve_remote_io(hw, sink),
            BridgeMode::Transparent => self.bridge_transparent(hw, sink),
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &DeviceConfiguration {
        &self.config
    }

    pub fn mode(&self) -> BridgeMode {
        self.mode
    }

    pub fn link_stats(&self) -> LinkStats {
        self.inbox.stats()
    }

    pub fn trigger_timer_active(&self) -> bool {
        self.trigger.timer_active()
    }

    // ── Internal helpers ──────────────────────────────────────

    fn read_mode(hw: &mut impl BridgeHardware) -> BridgeMode {
        if hw.io_peripheral_selected() {
            BridgeMode::IoPeripheral
        } else {
            BridgeMode::Transparent
        }
    }

    fn serve_remote_io(&mut self, hw: &mut impl BridgeHardware, sink: &mut impl EventSink) {
        let Some(packet) = self.inbox.take() else {
            return;
        };
        let reply = remote_io::handle(&packet.payload, &mut self.config, hw);
        hw.send_packet(packet.sender, self.config.packet_type, &reply, DEFAULT_PREAMBLE);
        sink.emit(&BridgeEvent::RemoteIoAnswered {
            sender: packet.sender,
            sub_command: packet.payload.first().copied(),
            acked: reply.first() == Some(&ACK),
        });
    }

    fn bridge_transparent(&mut self, hw: &mut impl BridgeHardware, sink: &mut impl EventSink) {
        if let Some(packet) = self.inbox.take() {
            hw.write_bytes(&packet.payload);
            sink.emit(&BridgeEvent::PacketForwarded {
                sender: packet.sender,
                len: packet.payload.len(),
            });
        }

        if hw.at_state() == AtState::Enabled {
            return;
        }

        match self
            .trigger
            .run(&self.config, self.ticks, hw, &mut self.inbox)
        {
            Some(Flush::Sent { len, reason }) => sink.emit(&BridgeEvent::PacketFlushed {
                destination: self.config.destination_address,
                len,
                reason,
            }),
            Some(Flush::Abandoned { len, .. }) => sink.emit(&BridgeEvent::FlushAbandoned { len }),
            None => {}
        }
    }
}
