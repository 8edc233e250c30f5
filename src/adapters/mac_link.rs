//! MAC/network link — binds the OpenRF MAC library to [`NetworkPort`] and
//! [`RadioPort`].
//!
//! - **`target_os = "espidf"`** — FFI into the prebuilt MAC library.  Its
//!   notification callbacks are exported from here: tick callbacks feed
//!   [`TICKS`](crate::ticks::TICKS), frame and status callbacks land in a
//!   mutex-guarded single slot that [`MacLink::step`] drains into the
//!   caller's [`MacEvents`].
//! - **`not(target_os = "espidf")`** — an in-memory link that records
//!   sends and lets tests inject frames and busy periods.

use log::info;

use crate::app::ports::{MacEvents, NetworkPort, RadioPort, SendError};
use crate::config::NetworkInit;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

/// Map the MAC library's transmit error code.
pub fn send_error_from_code(code: u8) -> SendError {
    match code {
        0 => SendError::NoAck,
        1 => SendError::ChannelBusy,
        _ => SendError::Rejected,
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF backend
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod ffi {
    /// Mirror of the library's initialiser record.
    #[repr(C)]
    pub struct OpenRfInitializer {
        pub mac_address: u32,
        pub network_id: u32,
        pub encryption_key: [u32; 4],
        pub data_rate: u8,
        pub ack_retries: u8,
        pub ack_timeout: u16,
        pub hop_table: u8,
        pub channel_count: u8,
        pub start_channel: u8,
        pub gfsk_modifier: u8,
    }

    unsafe extern "C" {
        pub fn OpenRFInitialize(init: OpenRfInitializer);
        pub fn OpenRFLoop();
        pub fn OpenRFReadyToSend() -> u8;
        pub fn OpenRFSendPacket(
            destination: u32,
            packet_type: u8,
            length: u8,
            data: *const u8,
            preamble: u8,
        );
        pub fn RadioSetTransmitPower(level: u8);
        pub fn RadioReadRSSIValue() -> u8;
        pub fn RadioGetTemperature() -> u8;
    }
}

#[cfg(target_os = "espidf")]
mod callbacks {
    use std::sync::{Mutex, PoisonError};

    use heapless::{Deque, Vec};

    use crate::config::MAX_PAYLOAD;
    use crate::ticks::TICKS;

    pub struct Frame {
        pub packet_type: u8,
        pub sender: u32,
        pub payload: Vec<u8, MAX_PAYLOAD>,
        pub rssi: u8,
    }

    /// Notifications accumulated during one `OpenRFLoop()` call.
    pub struct Pending {
        pub frame: Option<Frame>,
        pub receive_errors: u32,
        pub sent: u32,
        pub send_errors: Deque<u8, 4>,
    }

    pub static PENDING: Mutex<Pending> = Mutex::new(Pending {
        frame: None,
        receive_errors: 0,
        sent: 0,
        send_errors: Deque::new(),
    });

    pub fn with_pending<T>(f: impl FnOnce(&mut Pending) -> T) -> T {
        let mut guard = PENDING.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn NotifyMacPacketReceived(
        packet_type: u8,
        sender: u32,
        length: u8,
        sdu: *const u8,
        rssi: u8,
    ) {
        let len = (length as usize).min(MAX_PAYLOAD);
        let bytes: &[u8] = if sdu.is_null() {
            &[]
        } else {
            // SAFETY: the library guarantees `sdu` points at `length`
            // readable bytes for the duration of this callback.
            unsafe { core::slice::from_raw_parts(sdu, len) }
        };
        let mut payload = Vec::new();
        let _ = payload.extend_from_slice(bytes);
        with_pending(|p| {
            p.frame = Some(Frame {
                packet_type,
                sender,
                payload,
                rssi,
            });
        });
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn NotifyMacReceiveError() {
        with_pending(|p| p.receive_errors += 1);
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn NotifyMacPacketSent() {
        with_pending(|p| p.sent += 1);
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn NotifyMacPacketSendError(error: u8) {
        with_pending(|p| {
            let _ = p.send_errors.push_back(error);
        });
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn NotifyMac1MilliSecond() {
        TICKS.on_millisecond();
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn NotifyMac1Second() {
        TICKS.on_second();
    }
}

#[cfg(target_os = "espidf")]
pub struct MacLink;

#[cfg(target_os = "espidf")]
impl MacLink {
    pub fn new() -> Self {
        info!("MacLink: OpenRF backend");
        Self
    }
}

#[cfg(target_os = "espidf")]
impl NetworkPort for MacLink {
    fn initialize(&mut self, init: &NetworkInit) {
        let raw = ffi::OpenRfInitializer {
            mac_address: init.mac_address,
            network_id: init.network_id,
            encryption_key: init.encryption_key,
            data_rate: init.radio_data_rate,
            ack_retries: init.ack_retries,
            ack_timeout: init.ack_timeout,
            hop_table: init.hop_table,
            channel_count: init.channel_count,
            start_channel: init.start_channel,
            gfsk_modifier: init.gfsk_modifier,
        };
        // SAFETY: plain-data record passed by value; main-loop context.
        unsafe { ffi::OpenRFInitialize(raw) };
        info!(
            "MacLink: initialised net={:08X} mac={:08X}",
            init.network_id, init.mac_address
        );
    }

    fn step(&mut self, events: &mut dyn MacEvents) {
        // SAFETY: the MAC state machine is only driven from the main loop.
        unsafe { ffi::OpenRFLoop() };

        let (frame, receive_errors, sent, send_errors) = callbacks::with_pending(|p| {
            let errors: heapless::Vec<u8, 4> =
                core::iter::from_fn(|| p.send_errors.pop_front()).collect();
            (
                p.frame.take(),
                core::mem::take(&mut p.receive_errors),
                core::mem::take(&mut p.sent),
                errors,
            )
        });

        for _ in 0..receive_errors {
            events.receive_error();
        }
        for _ in 0..sent {
            events.packet_sent();
        }
        for code in send_errors {
            events.send_error(send_error_from_code(code));
        }
        if let Some(f) = frame {
            events.packet_received(f.packet_type, f.sender, &f.payload, f.rssi);
        }
    }

    fn ready_to_send(&self) -> bool {
        // SAFETY: read-only status query.
        unsafe { ffi::OpenRFReadyToSend() != 0 }
    }

    fn send_packet(&mut self, destination: u32, packet_type: u8, payload: &[u8], preamble: u8) {
        let len = payload.len().min(crate::config::MAX_PAYLOAD);
        // SAFETY: the library copies `len` bytes out of the live slice.
        unsafe { ffi::OpenRFSendPacket(destination, packet_type, len as u8, payload.as_ptr(), preamble) };
    }
}

#[cfg(target_os = "espidf")]
impl RadioPort for MacLink {
    fn set_transmit_power(&mut self, level: u8) {
        // SAFETY: simple register write inside the radio driver.
        unsafe { ffi::RadioSetTransmitPower(level) };
    }

    fn rssi(&mut self) -> u8 {
        // SAFETY: read-only register access.
        unsafe { ffi::RadioReadRSSIValue() }
    }

    fn temperature(&mut self) -> u8 {
        // SAFETY: read-only register access.
        unsafe { ffi::RadioGetTemperature() }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation backend
// ───────────────────────────────────────────────────────────────

/// A packet handed to the simulated MAC.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    pub destination: u32,
    pub packet_type: u8,
    pub payload: Vec<u8>,
    pub preamble: u8,
}

#[cfg(not(target_os = "espidf"))]
struct InjectedFrame {
    packet_type: u8,
    sender: u32,
    payload: Vec<u8>,
    rssi: u8,
}

#[cfg(not(target_os = "espidf"))]
pub struct MacLink {
    init: Option<NetworkInit>,
    busy_steps: u32,
    steps: u64,
    inbound: VecDeque<InjectedFrame>,
    sent: Vec<SentPacket>,
    transmit_power: u8,
    rssi: u8,
    temperature: u8,
}

#[cfg(not(target_os = "espidf"))]
impl MacLink {
    pub fn new() -> Self {
        info!("MacLink: simulation backend");
        Self {
            init: None,
            busy_steps: 0,
            steps: 0,
            inbound: VecDeque::new(),
            sent: Vec::new(),
            transmit_power: 0,
            rssi: 0,
            temperature: 0,
        }
    }

    /// Queue a frame for delivery on a later step (one per step).
    pub fn inject(&mut self, packet_type: u8, sender: u32, payload: &[u8], rssi: u8) {
        self.inbound.push_back(InjectedFrame {
            packet_type,
            sender,
            payload: payload.to_vec(),
            rssi,
        });
    }

    /// Report not-ready for the next `steps` steps.
    pub fn set_busy(&mut self, steps: u32) {
        self.busy_steps = steps;
    }

    pub fn sent(&self) -> &[SentPacket] {
        &self.sent
    }

    pub fn last_init(&self) -> Option<&NetworkInit> {
        self.init.as_ref()
    }

    pub fn transmit_power(&self) -> u8 {
        self.transmit_power
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn set_radio_readings(&mut self, rssi: u8, temperature: u8) {
        self.rssi = rssi;
        self.temperature = temperature;
    }
}

#[cfg(not(target_os = "espidf"))]
impl NetworkPort for MacLink {
    fn initialize(&mut self, init: &NetworkInit) {
        self.init = Some(*init);
        info!("MacLink(sim): initialised net={:08X}", init.network_id);
    }

    fn step(&mut self, events: &mut dyn MacEvents) {
        self.steps += 1;
        self.busy_steps = self.busy_steps.saturating_sub(1);
        if let Some(f) = self.inbound.pop_front() {
            events.packet_received(f.packet_type, f.sender, &f.payload, f.rssi);
        }
    }

    fn ready_to_send(&self) -> bool {
        self.busy_steps == 0
    }

    fn send_packet(&mut self, destination: u32, packet_type: u8, payload: &[u8], preamble: u8) {
        self.sent.push(SentPacket {
            destination,
            packet_type,
            payload: payload.to_vec(),
            preamble,
        });
    }
}

#[cfg(not(target_os = "espidf"))]
impl RadioPort for MacLink {
    fn set_transmit_power(&mut self, level: u8) {
        self.transmit_power = level;
    }

    fn rssi(&mut self) -> u8 {
        self.rssi
    }

    fn temperature(&mut self) -> u8 {
        self.temperature
    }
}

impl Default for MacLink {
    fn default() -> Self {
        Self::new()
    }
}
