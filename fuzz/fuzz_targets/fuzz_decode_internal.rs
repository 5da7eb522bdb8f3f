//! Fuzz target for decoding stored configs.
//!
//! Tests that internal decoding handles arbitrary input without panicking.

#![no_main]

use dft_config::{decode_slice, TrustLevel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_slice(data, None, TrustLevel::Internal);
});
