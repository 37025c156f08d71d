#![no_main]
use libfuzzer_sys::fuzz_target;
use scanprobe::scanner::{Scanner, SourceScanner};

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to the scanner - should never panic, and the
    // token texts must always reassemble to the input.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(tokens) = SourceScanner.scan(s) {
            assert_eq!(tokens.reassemble(), s);
        }
    }
});
