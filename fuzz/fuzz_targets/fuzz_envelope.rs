#![no_main]

use bytestream::SignedEnvelope;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever decodes must re-encode to the same bytes.
    if let Ok(envelope) = SignedEnvelope::decode(data) {
        let encoded = envelope.encode().expect("decoded fields fit a varint");
        assert_eq!(SignedEnvelope::decode(&encoded), Ok(envelope));
    }
});
