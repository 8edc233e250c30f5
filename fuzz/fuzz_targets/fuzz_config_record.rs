//! Fuzz target: `config_store::decode`
//!
//! Any 256-byte image must decode without panicking, and whatever it
//! decodes to must survive an encode/decode cycle unchanged.
//!
//! cargo fuzz run fuzz_config_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use rfbrick::app::config_store::{RECORD_LEN, decode, encode};

fuzz_target!(|data: &[u8]| {
    let Some(bytes) = data.get(..RECORD_LEN) else {
        return;
    };
    let mut record = [0u8; RECORD_LEN];
    record.copy_from_slice(bytes);

    let cfg = decode(&record);
    assert_eq!(decode(&encode(&cfg)), cfg);
});
