//! Unified error type for adapter construction and boot.
//!
//! The bridge loop itself never fails: malformed commands, bad channels,
//! and send failures are all answered in-band.  What can fail is bringing
//! the peripherals up, so that is what this enum describes.

use core::fmt;

use crate::app::ports::StorageError;

/// Every fallible start-up operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The persistent area could not be opened or written.
    Storage(StorageError),
    /// A UART driver call failed (ESP-IDF error code).
    Uart(i32),
    /// A GPIO or ADC peripheral could not be configured.
    Gpio(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Uart(code) => write!(f, "uart: esp_err {code}"),
            Self::Gpio(msg) => write!(f, "gpio: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
