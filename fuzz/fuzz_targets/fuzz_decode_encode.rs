//! Fuzz target for decode/encode consistency.
//!
//! Any config that decodes must encode, and its internal-storage form must
//! decode again at internal trust with the same id.

#![no_main]

use arbitrary::Arbitrary;
use dft_config::{decode_slice, encode, encode_to_string, TrustLevel, View};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    internal: bool,
    url_id: Option<&'a str>,
    body: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let trust = if input.internal {
        TrustLevel::Internal
    } else {
        TrustLevel::External
    };
    let Ok(config) = decode_slice(input.body, input.url_id, trust) else {
        return;
    };

    let stored = encode_to_string(&config, View::InternalStorage)
        .expect("decoded config should encode");
    let restored = decode_slice(stored.as_bytes(), None, TrustLevel::Internal)
        .expect("stored form should decode");
    assert_eq!(restored.id(), config.id());

    let api = encode(&config, View::Api).expect("api view should encode");
    assert!(api.get("doc_type").is_none());
});
