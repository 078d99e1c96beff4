//! Fuzz target for dataset JSON parsing.

#![no_main]

use cets_model::model::io_json::from_json_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_json_slice(data);
});
