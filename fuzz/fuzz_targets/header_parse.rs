//! Fuzz target for the MRC, EM and TIFF header parsers.
//!
//! Every parser sees the same bytes; none may panic or loop on a
//! malformed header.

#![no_main]

use cets_model::header::fuzz_parse_headers;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    fuzz_parse_headers(data);
});
