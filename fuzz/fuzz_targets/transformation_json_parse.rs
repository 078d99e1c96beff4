//! Fuzz target for transformation decoding.
//!
//! Arbitrary UTF-8 documents are decoded as a single transformation,
//! which exercises the `type` dispatch and the sequence depth limit.

#![no_main]

use cets_model::model::io_json::transformation_from_json_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    let _ = transformation_from_json_str(json);
});
