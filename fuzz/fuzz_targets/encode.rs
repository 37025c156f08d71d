#![no_main]
use libfuzzer_sys::fuzz_target;
use scanprobe::encode::DebugEncoder;
use scanprobe::scanner::{Scanner, SourceScanner};

fuzz_target!(|data: &[u8]| {
    // Encoding and re-parsing any scanned input must round-trip.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(tokens) = SourceScanner.scan(s) {
            let encoded = DebugEncoder.encode_tokens(&tokens);
            let parsed = DebugEncoder.parse(&encoded).expect("own encoding reparses");
            assert_eq!(DebugEncoder.encode_tokens(&parsed), encoded);
        }
    }
});
