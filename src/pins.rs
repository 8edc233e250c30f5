//! GPIO / peripheral pin assignments for the rfBrick carrier board.
//!
//! Single source of truth — every adapter references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Host serial link (UART1)
// ---------------------------------------------------------------------------

/// UART peripheral carrying the host data/command link.
pub const HOST_UART_PORT: i32 = 1;
pub const HOST_UART_TX_GPIO: i32 = 17;
pub const HOST_UART_RX_GPIO: i32 = 18;
/// Driver-side RX ring size in bytes.
pub const HOST_UART_RX_BUFFER: i32 = 512;

// ---------------------------------------------------------------------------
// Mode strap
// ---------------------------------------------------------------------------

/// Digital input: HIGH = I/O peripheral, LOW = transparent bridge.
pub const MODE_SELECT_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Remote I/O: digital channels 0–4
// ---------------------------------------------------------------------------

pub const DIGITAL_INPUT_GPIOS: [i32; 5] = [4, 5, 6, 7, 15];
pub const DIGITAL_OUTPUT_GPIOS: [i32; 5] = [10, 11, 12, 13, 14];

// ---------------------------------------------------------------------------
// Remote I/O: analog channels (ADC1)
// ---------------------------------------------------------------------------

/// Remote channel number of the first analog input.
pub const ANALOG_FIRST_CHANNEL: u8 = 5;
/// ADC1 channel for each analog input, in remote-channel order.
pub const ANALOG_ADC1_CHANNELS: [u32; 6] = [0, 1, 2, 3, 4, 5];

/// Map a remote analog channel to its ADC1 channel.
pub fn adc1_channel_for(remote: u8) -> Option<u32> {
    let index = remote.checked_sub(ANALOG_FIRST_CHANNEL)?;
    ANALOG_ADC1_CHANNELS.get(index as usize).copied()
}
