//! Host-link UART driver.
//!
//! - **`target_os = "espidf"`** — raw ESP-IDF UART driver calls on
//!   [`HOST_UART_PORT`](crate::pins::HOST_UART_PORT), non-blocking reads.
//! - **`not(target_os = "espidf")`** — in-memory RX/TX queues so tests can
//!   inject host traffic and inspect what the bridge wrote back.

use log::{info, warn};

use crate::config::{DEFAULT_BAUD_CODE, baud_rate_for};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

pub struct Uart {
    baud_code: u8,
    #[cfg(not(target_os = "espidf"))]
    rx: VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    tx: Vec<u8>,
}

impl Uart {
    /// Install the driver at the factory baud rate.
    #[cfg(target_os = "espidf")]
    pub fn new() -> crate::error::Result<Self> {
        let port = pins::HOST_UART_PORT as uart_port_t;
        let cfg = uart_config_t {
            baud_rate: baud_rate_for(DEFAULT_BAUD_CODE).unwrap_or(115_200) as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: called once from main() before the bridge loop starts;
        // the driver is not yet installed on this port.
        unsafe {
            let ret = uart_driver_install(
                port,
                pins::HOST_UART_RX_BUFFER,
                0,
                0,
                core::ptr::null_mut(),
                0,
            );
            if ret != ESP_OK as i32 {
                return Err(crate::error::Error::Uart(ret));
            }
            let ret = uart_param_config(port, &cfg);
            if ret != ESP_OK as i32 {
                return Err(crate::error::Error::Uart(ret));
            }
            let ret = uart_set_pin(
                port,
                pins::HOST_UART_TX_GPIO,
                pins::HOST_UART_RX_GPIO,
                UART_PIN_NO_CHANGE,
                UART_PIN_NO_CHANGE,
            );
            if ret != ESP_OK as i32 {
                return Err(crate::error::Error::Uart(ret));
            }
        }

        info!("Uart: host link on UART{}", pins::HOST_UART_PORT);
        Ok(Self {
            baud_code: DEFAULT_BAUD_CODE,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> crate::error::Result<Self> {
        info!("Uart: simulation backend");
        Ok(Self {
            baud_code: DEFAULT_BAUD_CODE,
            rx: VecDeque::new(),
            tx: Vec::new(),
        })
    }

    pub fn baud_code(&self) -> u8 {
        self.baud_code
    }

    /// Switch line rate.  Unknown codes keep the current rate.
    pub fn set_baud_code(&mut self, code: u8) {
        let Some(rate) = baud_rate_for(code) else {
            warn!("Uart: ignoring unknown baud code {}", code);
            return;
        };

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: driver installed in new(); main-loop access only.
            let ret = unsafe { uart_set_baudrate(pins::HOST_UART_PORT as uart_port_t, rate) };
            if ret != ESP_OK as i32 {
                warn!("Uart: set baud {} failed ({})", rate, ret);
                return;
            }
        }

        self.baud_code = code;
        info!("Uart: {} baud", rate);
    }

    /// Pop one received byte without blocking.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        // SAFETY: one-byte buffer, zero timeout; driver installed in new().
        let n = unsafe {
            uart_read_bytes(
                pins::HOST_UART_PORT as uart_port_t,
                (&raw mut byte).cast(),
                1,
                0,
            )
        };
        (n == 1).then_some(byte)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    #[cfg(target_os = "espidf")]
    pub fn write(&mut self, bytes: &[u8]) {
        // SAFETY: pointer/length from a live slice; the driver copies it.
        let n = unsafe {
            uart_write_bytes(
                pins::HOST_UART_PORT as uart_port_t,
                bytes.as_ptr().cast(),
                bytes.len(),
            )
        };
        if n < 0 {
            warn!("Uart: write of {} bytes failed", bytes.len());
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn write(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Queue bytes as if the host had sent them.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Drain everything written to the host so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}
