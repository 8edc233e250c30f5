//! Bridge core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the serial/radio bridge: the
//! configuration store, AT command dispatch, the transmit trigger policy,
//! and the remote I/O protocol.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod config_store;
pub mod dispatcher;
pub mod events;
pub mod hex;
pub mod inbox;
pub mod ports;
pub mod remote_io;
pub mod service;
pub mod trigger;
