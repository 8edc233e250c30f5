//! rfBrick Firmware — Main Entry Point
//!
//! Transparent serial-to-radio bridge with an AT command mode and a
//! remote I/O peripheral mode, selected by a strap pin.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Uart + AtEscapeDetector   MacLink (OpenRF)   BoardPinBank     │
//! │  (SerialPort + AtPort)     (Network+Radio)    (IoPort)         │
//! │  NvsArea (PersistentStore) LogEventSink (EventSink)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                Bridge (pure logic)                     │    │
//! │  │  Dispatcher · TriggerEngine · RemoteIo · Inbox         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{info, warn};

use rfbrick::adapters::gpio::BoardPinBank;
use rfbrick::adapters::hardware::HardwareAdapter;
use rfbrick::adapters::log_sink::LogEventSink;
use rfbrick::adapters::mac_link::MacLink;
use rfbrick::adapters::nvs::NvsArea;
use rfbrick::adapters::uart::Uart;
use rfbrick::app::service::Bridge;
use rfbrick::app::trigger::ReadyWait;
use rfbrick::ticks::TICKS;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  rfBrick v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Persistent area (or an erased stand-in) ────────────
    let area = match NvsArea::new() {
        Ok(a) => a,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NvsArea::erased()
        }
    };

    // ── 3. Construct adapters ─────────────────────────────────
    let uart = Uart::new()?;
    let pins = BoardPinBank::from_board()?;
    let mut hw = HardwareAdapter::new(uart, MacLink::new(), pins, area, &TICKS);
    let mut log_sink = LogEventSink::new();

    // ── 4. Boot the bridge ────────────────────────────────────
    let mut bridge = Bridge::new(&TICKS, ReadyWait::Unbounded);
    bridge.boot(&mut hw, &mut log_sink);

    // ── 5. Main loop ──────────────────────────────────────────
    //
    // The MAC library's 1 ms callback advances the tick counters; the
    // yield keeps the idle task (and its watchdog) fed.
    loop {
        bridge.iterate(&mut hw, &mut log_sink);
        FreeRtos::delay_ms(1);
    }
}
