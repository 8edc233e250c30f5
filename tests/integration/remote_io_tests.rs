//! Integration tests for the remote I/O request handler.

use rfbrick::app::remote_io::{ACK, NACK, handle, sub_command};
use rfbrick::config::DeviceConfiguration;

use crate::mock_hw::MockHardware;

#[test]
fn read_digital_returns_pin_state() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    hw.inputs[2] = true;

    let reply = handle(&[sub_command::READ_DIGITAL, 2], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 1]);

    let reply = handle(&[sub_command::READ_DIGITAL, 3], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 0]);
}

#[test]
fn read_digital_bad_channel_is_nacked() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    let reply = handle(&[sub_command::READ_DIGITAL, 9], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[NACK]);
}

#[test]
fn read_analog_is_big_endian() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    hw.analog[6] = 0x02AB;

    let reply = handle(&[sub_command::READ_ANALOG, 6], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 0x02, 0xAB]);

    let reply = handle(&[sub_command::READ_ANALOG, 4], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[NACK]);
}

#[test]
fn set_digital_replies_prior_state() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    let reply = handle(&[sub_command::SET_DIGITAL, 1, 1], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 0]);
    assert!(hw.outputs[1]);

    let reply = handle(&[sub_command::SET_DIGITAL, 1, 0], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 1]);
    assert!(!hw.outputs[1]);
}

#[test]
fn set_digital_missing_value_drives_low() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    hw.outputs[4] = true;

    let reply = handle(&[sub_command::SET_DIGITAL, 4], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 1]);
    assert!(!hw.outputs[4]);
}

#[test]
fn triggers_are_stored_in_configuration() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    let reply = handle(&[sub_command::SET_DIGITAL_TRIGGER, 0, 7], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[ACK, 7]);
    assert_eq!(cfg.digital_triggers[0], 7);

    let reply = handle(
        &[sub_command::SET_ANALOG_TRIGGER, 5, 0x01, 0x2C],
        &mut cfg,
        &mut hw,
    );
    assert_eq!(reply.as_slice(), &[ACK, 0x01, 0x2C]);
    assert_eq!(cfg.analog_triggers[5], 300);
}

#[test]
fn bad_analog_trigger_channel_is_echoed() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let before = cfg.clone();

    let reply = handle(&[sub_command::SET_ANALOG_TRIGGER, 6, 1, 1], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[NACK, 6]);
    assert_eq!(cfg, before);
}

#[test]
fn short_analog_trigger_request_still_gets_two_byte_nack() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let before = cfg.clone();

    let reply = handle(&[sub_command::SET_ANALOG_TRIGGER], &mut cfg, &mut hw);
    assert_eq!(reply.as_slice(), &[NACK, 0]);
    assert_eq!(cfg, before);
}

#[test]
fn malformed_requests_are_nacked() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(handle(&[], &mut cfg, &mut hw).as_slice(), &[NACK]);
    assert_eq!(handle(&[9, 0], &mut cfg, &mut hw).as_slice(), &[NACK]);
    assert_eq!(
        handle(&[sub_command::READ_DIGITAL], &mut cfg, &mut hw).as_slice(),
        &[NACK]
    );
}
