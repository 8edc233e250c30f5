//! Integration tests for the AT command dispatcher.
//!
//! Each test queues one command line on the mock detector, polls it the
//! way the bridge does, and checks the serial reply, the configuration,
//! and any MAC re-initialisation.

use rfbrick::app::commands::{Command, CommandOutcome};
use rfbrick::app::config_store;
use rfbrick::app::dispatcher::{self, CommandContext};
use rfbrick::app::ports::{AtPort, StorageError};
use rfbrick::config::DeviceConfiguration;
use rfbrick::ticks::TickCounters;

use crate::mock_hw::MockHardware;

fn run_with(
    hw: &mut MockHardware,
    cfg: &mut DeviceConfiguration,
    ticks: &TickCounters,
    last_sender: u32,
    mnemonic: &str,
    args: &[u8],
) -> CommandOutcome {
    hw.queue_command(mnemonic, args);
    let opcode = hw.poll_command().expect("queued command");
    let mut ctx = CommandContext {
        config: cfg,
        ticks,
        last_sender,
    };
    dispatcher::execute(Command::from_opcode(opcode), &mut ctx, hw)
}

fn run(
    hw: &mut MockHardware,
    cfg: &mut DeviceConfiguration,
    mnemonic: &str,
    args: &[u8],
) -> CommandOutcome {
    let ticks = TickCounters::new();
    run_with(hw, cfg, &ticks, 0, mnemonic, args)
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn query_replies_fixed_width_hex_without_mutation() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let before = cfg.clone();

    assert_eq!(run(&mut hw, &mut cfg, "DL", b""), CommandOutcome::Queried);
    assert_eq!(hw.take_serial(), b"44332211");

    assert_eq!(run(&mut hw, &mut cfg, "TL", b""), CommandOutcome::Queried);
    assert_eq!(hw.take_serial(), b"04");

    assert_eq!(run(&mut hw, &mut cfg, "TT", b""), CommandOutcome::Queried);
    assert_eq!(hw.take_serial(), b"00C8");

    assert_eq!(cfg, before);
    assert!(hw.inits.is_empty());
}

#[test]
fn encryption_key_query_is_four_words() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    run(&mut hw, &mut cfg, "EK", b"");
    assert_eq!(hw.take_serial(), b"112233441A1B1C1D1E1F1A1B1C1D1E1F");
}

#[test]
fn radio_readings_and_version() {
    let mut hw = MockHardware::new();
    hw.rssi = 0x5A;
    hw.temperature = 0x19;
    let mut cfg = DeviceConfiguration::default();

    run(&mut hw, &mut cfg, "SS", b"");
    run(&mut hw, &mut cfg, "TE", b"");
    run(&mut hw, &mut cfg, "VR", b"");
    assert_eq!(hw.take_serial(), b"5A1901");
}

#[test]
fn last_sender_reports_context() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let ticks = TickCounters::new();
    run_with(&mut hw, &mut cfg, &ticks, 0xCAFE_BABE, "GS", b"");
    assert_eq!(hw.take_serial(), b"CAFEBABE");
}

// ── Sets ──────────────────────────────────────────────────────

#[test]
fn destination_set_does_not_touch_the_mac() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(run(&mut hw, &mut cfg, "DL", b"1A2B"), CommandOutcome::Applied);
    assert_eq!(cfg.destination_address, 0x1A2B);
    assert!(hw.inits.is_empty());
    assert!(hw.serial_tx.is_empty());
}

#[test]
fn network_id_set_reinitialises_with_new_value() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(
        run(&mut hw, &mut cfg, "NA", b"0000BEEF"),
        CommandOutcome::NetworkReinitialized
    );
    assert_eq!(hw.inits.len(), 1);
    assert_eq!(hw.inits[0].network_id, 0xBEEF);
    assert_eq!(hw.inits[0].mac_address, cfg.mac_address);
}

#[test]
fn every_radio_setting_reinitialises() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    run(&mut hw, &mut cfg, "RR", b"01");
    run(&mut hw, &mut cfg, "AR", b"03");
    run(&mut hw, &mut cfg, "AT", b"0040");
    run(&mut hw, &mut cfg, "HT", b"02");
    assert_eq!(hw.inits.len(), 4);

    let last = hw.inits[3];
    assert_eq!(last.radio_data_rate, 1);
    assert_eq!(last.ack_retries, 3);
    assert_eq!(last.ack_timeout, 0x40);
    assert_eq!(last.hop_table, 2);
}

#[test]
fn partial_encryption_key_is_rejected() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let key = cfg.encryption_key;

    assert_eq!(
        run(&mut hw, &mut cfg, "EK", b"11223344AABB"),
        CommandOutcome::Rejected
    );
    assert_eq!(cfg.encryption_key, key);
    assert!(hw.inits.is_empty());
}

#[test]
fn full_encryption_key_is_applied() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(
        run(&mut hw, &mut cfg, "EK", b"00000001000000020000000300000004"),
        CommandOutcome::NetworkReinitialized
    );
    assert_eq!(cfg.encryption_key, [1, 2, 3, 4]);
    assert_eq!(hw.inits[0].encryption_key, [1, 2, 3, 4]);
}

#[test]
fn set_without_hex_digit_leaves_field_untouched() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(run(&mut hw, &mut cfg, "TL", b"ZZ"), CommandOutcome::Rejected);
    assert_eq!(cfg.transmit_trigger_level, 4);
}

#[test]
fn set_reads_only_the_field_width() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(run(&mut hw, &mut cfg, "TL", b"1A2B3C"), CommandOutcome::Applied);
    assert_eq!(cfg.transmit_trigger_level, 0x1A);
}

#[test]
fn baud_rate_query_reports_live_setting() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    run(&mut hw, &mut cfg, "BD", b"");
    assert_eq!(hw.take_serial(), b"04");

    assert_eq!(run(&mut hw, &mut cfg, "BD", b"02"), CommandOutcome::Applied);
    assert_eq!(cfg.uart_baud_rate, 2);
    assert_eq!(hw.baud_code, 2);
}

#[test]
fn transmit_power_is_pushed_to_the_radio() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    run(&mut hw, &mut cfg, "TP", b"07");
    assert_eq!(cfg.transmit_power, 7);
    assert_eq!(hw.transmit_power, Some(7));
}

#[test]
fn time_reference_sets_and_reads_rtc() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let ticks = TickCounters::new();

    run_with(&mut hw, &mut cfg, &ticks, 0, "TS", b"0000012C");
    assert_eq!(ticks.rtc_secs(), 300);

    ticks.on_second();
    run_with(&mut hw, &mut cfg, &ticks, 0, "TS", b"");
    assert_eq!(hw.take_serial(), b"0000012D");
}

#[test]
fn unsupported_serial_settings_are_ignored() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    let before = cfg.clone();

    for m in ["NB", "SB", "%V"] {
        assert_eq!(run(&mut hw, &mut cfg, m, b"01"), CommandOutcome::Ignored);
    }
    assert_eq!(cfg, before);
    assert!(hw.serial_tx.is_empty());
}

// ── Control commands ──────────────────────────────────────────

#[test]
fn null_command_answers_ok() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(run(&mut hw, &mut cfg, "ZZ", b""), CommandOutcome::Acknowledged);
    assert_eq!(hw.take_serial(), b"OK");
}

#[test]
fn exit_command_mode_reaches_the_detector() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(run(&mut hw, &mut cfg, "CN", b""), CommandOutcome::ExitRequested);
    assert_eq!(hw.exit_requests, 1);
}

#[test]
fn factory_reset_keeps_baud_and_reinitialises() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    cfg.destination_address = 7;
    cfg.uart_baud_rate = 1;

    assert_eq!(
        run(&mut hw, &mut cfg, "RE", b""),
        CommandOutcome::NetworkReinitialized
    );
    assert_eq!(cfg.destination_address, 0x4433_2211);
    assert_eq!(cfg.uart_baud_rate, 1);
    assert_eq!(hw.inits.len(), 1);
}

#[test]
fn write_settings_round_trips_through_the_area() {
    let mut hw = MockHardware::new();
    let mut cfg = DeviceConfiguration::default();
    run(&mut hw, &mut cfg, "DL", b"00001234");
    run(&mut hw, &mut cfg, "TT", b"01F4");

    assert_eq!(run(&mut hw, &mut cfg, "WS", b""), CommandOutcome::Saved);
    assert_eq!(config_store::load(&hw), cfg);
}

#[test]
fn write_settings_failure_is_reported() {
    let mut hw = MockHardware::new();
    hw.fail_writes = true;
    let mut cfg = DeviceConfiguration::default();

    assert_eq!(
        run(&mut hw, &mut cfg, "WS", b""),
        CommandOutcome::SaveFailed(StorageError::IoError)
    );
}
