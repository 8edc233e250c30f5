//! Interrupt-driven tick counters.
//!
//! The MAC library calls back once per millisecond and once per second
//! from timer context.  Those callbacks only bump atomics; the main loop
//! reads them with relaxed ordering.  A one-tick skew between a read and
//! a concurrent increment is harmless for every consumer here (trigger
//! timeouts and the AT guard time both compare with `>`).
//!
//! ```text
//! ┌──────────────┐  fetch_add  ┌───────────────┐  load   ┌─────────────┐
//! │ 1 ms tick    │────────────▶│ TickCounters  │────────▶│ Main loop   │
//! │ 1 s tick     │────────────▶│ (lock-free)   │         │ (consumer)  │
//! └──────────────┘             └───────────────┘         └─────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Millisecond and second counters shared between tick context and the
/// bridge loop.
pub struct TickCounters {
    uptime_ms: AtomicU32,
    trigger_elapsed_ms: AtomicU32,
    rtc_secs: AtomicU32,
}

/// Counters fed by the MAC library's timer callbacks on target.
pub static TICKS: TickCounters = TickCounters::new();

impl TickCounters {
    pub const fn new() -> Self {
        Self {
            uptime_ms: AtomicU32::new(0),
            trigger_elapsed_ms: AtomicU32::new(0),
            rtc_secs: AtomicU32::new(0),
        }
    }

    // ── Tick context ──────────────────────────────────────────

    /// One millisecond elapsed.  Wraps silently.
    pub fn on_millisecond(&self) {
        self.uptime_ms.fetch_add(1, Ordering::Relaxed);
        self.trigger_elapsed_ms.fetch_add(1, Ordering::Relaxed);
    }

    /// One second elapsed on the real-time clock.
    pub fn on_second(&self) {
        self.rtc_secs.fetch_add(1, Ordering::Relaxed);
    }

    // ── Main-loop context ─────────────────────────────────────

    pub fn uptime_ms(&self) -> u32 {
        self.uptime_ms.load(Ordering::Relaxed)
    }

    /// Milliseconds since the transmit trigger timer was last restarted.
    pub fn trigger_elapsed_ms(&self) -> u32 {
        self.trigger_elapsed_ms.load(Ordering::Relaxed)
    }

    pub fn restart_trigger(&self) {
        self.trigger_elapsed_ms.store(0, Ordering::Relaxed);
    }

    pub fn rtc_secs(&self) -> u32 {
        self.rtc_secs.load(Ordering::Relaxed)
    }

    /// Replace the RTC time reference (`ATTS`).
    pub fn set_rtc_secs(&self, secs: u32) {
        self.rtc_secs.store(secs, Ordering::Relaxed);
    }

    /// Advance the millisecond counters by `ms` ticks at once.
    pub fn advance_ms(&self, ms: u32) {
        self.uptime_ms.fetch_add(ms, Ordering::Relaxed);
        self.trigger_elapsed_ms.fetch_add(ms, Ordering::Relaxed);
    }
}
