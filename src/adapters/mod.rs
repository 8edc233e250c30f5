//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements         | Connects to               |
//! |--------------|--------------------|---------------------------|
//! | `at_escape`  | ArgumentSource     | `+++` detector, line edit |
//! | `gpio`       | IoPort             | GPIO pins, ADC1 oneshot   |
//! | `hardware`   | all of the above   | composite for the bridge  |
//! | `log_sink`   | EventSink          | Serial log output         |
//! | `mac_link`   | NetworkPort        | OpenRF MAC library        |
//! |              | RadioPort          | Transceiver registers     |
//! | `nvs`        | PersistentStore    | NVS / in-memory area      |
//! | `uart`       | (raw bytes)        | Host UART driver          |

pub mod at_escape;
pub mod gpio;
pub mod hardware;
pub mod log_sink;
pub mod mac_link;
pub mod nvs;
pub mod uart;
