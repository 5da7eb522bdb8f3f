//! Fuzz target for decoding API payloads.
//!
//! Tests that external decoding handles arbitrary input without panicking.
//! API payloads come from untrusted callers.

#![no_main]

use dft_config::{decode_slice, TrustLevel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_slice(data, None, TrustLevel::External);
    let _ = decode_slice(data, Some("fuzz"), TrustLevel::External);
});
