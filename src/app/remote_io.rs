//! Remote I/O protocol handler.
//!
//! In I/O-peripheral mode every inbound packet is a request.  Byte 0
//! selects the sub-command, byte 1 the channel, bytes 2.. carry values.
//! Each request gets exactly one reply whose first byte is [`ACK`] or
//! [`NACK`].  Value bytes past the end of the payload read as zero.

use heapless::Vec;
use log::debug;

use crate::config::{ANALOG_CHANNELS, DIGITAL_CHANNELS, DeviceConfiguration};

use super::ports::IoPort;

pub const ACK: u8 = 0x06;
pub const NACK: u8 = 0x15;

/// Sub-command selectors (payload byte 0).
pub mod sub_command {
    pub const READ_ANALOG: u8 = 0;
    pub const READ_DIGITAL: u8 = 1;
    pub const SET_DIGITAL: u8 = 2;
    pub const SET_DIGITAL_TRIGGER: u8 = 3;
    pub const SET_ANALOG_TRIGGER: u8 = 4;
}

/// Longest reply any sub-command produces.
pub const MAX_REPLY: usize = 3;

pub type Reply = Vec<u8, MAX_REPLY>;

/// A decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoRequest {
    ReadAnalog { channel: u8 },
    ReadDigital { channel: u8 },
    SetDigital { channel: u8, high: bool },
    SetDigitalTrigger { channel: u8, action: u8 },
    SetAnalogTrigger { channel: u8, threshold: u16 },
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoReject {
    Empty,
    UnknownSubCommand(u8),
    MissingChannel(u8),
    BadChannel { sub_command: u8, channel: u8 },
}

impl IoRequest {
    /// Parse and range-check a request payload.
    pub fn decode(payload: &[u8]) -> Result<Self, IoReject> {
        let Some(&sub) = payload.first() else {
            return Err(IoReject::Empty);
        };
        if sub > sub_command::SET_ANALOG_TRIGGER {
            return Err(IoReject::UnknownSubCommand(sub));
        }
        let Some(&channel) = payload.get(1) else {
            return Err(IoReject::MissingChannel(sub));
        };
        let value = |i: usize| payload.get(i).copied().unwrap_or(0);
        let bad = IoReject::BadChannel {
            sub_command: sub,
            channel,
        };
        let digital_ok = (channel as usize) < DIGITAL_CHANNELS;

        match sub {
            // Analog inputs sit above the digital channels on the mux.
            sub_command::READ_ANALOG if channel > 4 => Ok(Self::ReadAnalog { channel }),
            sub_command::READ_DIGITAL if digital_ok => Ok(Self::ReadDigital { channel }),
            sub_command::SET_DIGITAL if digital_ok => Ok(Self::SetDigital {
                channel,
                high: value(2) > 0,
            }),
            sub_command::SET_DIGITAL_TRIGGER if digital_ok => Ok(Self::SetDigitalTrigger {
                channel,
                action: value(2),
            }),
            sub_command::SET_ANALOG_TRIGGER if (channel as usize) < ANALOG_CHANNELS => {
                Ok(Self::SetAnalogTrigger {
                    channel,
                    threshold: u16::from_be_bytes([value(2), value(3)]),
                })
            }
            _ => Err(bad),
        }
    }
}

/// Execute one request and build its reply.
pub fn handle<H: IoPort + ?Sized>(
    payload: &[u8],
    cfg: &mut DeviceConfiguration,
    io: &mut H,
) -> Reply {
    let mut reply = Reply::new();
    let request = match IoRequest::decode(payload) {
        Ok(r) => r,
        Err(reject) => {
            debug!("RemoteIo: rejected {:?}", reject);
            let _ = reply.push(NACK);
            // Analog-trigger failures always carry the channel byte; a
            // missing channel reads as zero.
            match reject {
                IoReject::BadChannel {
                    sub_command: sub_command::SET_ANALOG_TRIGGER,
                    channel,
                } => {
                    let _ = reply.push(channel);
                }
                IoReject::MissingChannel(sub_command::SET_ANALOG_TRIGGER) => {
                    let _ = reply.push(0);
                }
                _ => {}
            }
            return reply;
        }
    };

    let mut body = [0u8; 2];
    let len = match request {
        IoRequest::ReadAnalog { channel } => {
            body = io.read_analog(channel).to_be_bytes();
            2
        }
        IoRequest::ReadDigital { channel } => {
            body[0] = u8::from(io.read_input(channel));
            1
        }
        IoRequest::SetDigital { channel, high } => {
            body[0] = u8::from(io.output_state(channel));
            io.write_output(channel, high);
            1
        }
        IoRequest::SetDigitalTrigger { channel, action } => {
            cfg.digital_triggers[channel as usize] = action;
            body[0] = action;
            1
        }
        IoRequest::SetAnalogTrigger { channel, threshold } => {
            cfg.analog_triggers[channel as usize] = threshold;
            body = threshold.to_be_bytes();
            2
        }
    };

    let _ = reply.push(ACK);
    let _ = reply.extend_from_slice(&body[..len]);
    reply
}
