#![no_main]

use libfuzzer_sys::fuzz_target;
use skysnap::parser::SessionParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Decoding must never panic, whatever the line holds
        let mut parser = SessionParser::new();
        for line in input.lines() {
            let _ = parser.decode_line(line);
        }
    }
});
