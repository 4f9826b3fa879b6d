#![no_main]
use libfuzzer_sys::fuzz_target;
use smallxml::parser::{parse_str_with_options, ParseOptions, Scanner};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Scanning and parsing must never panic
        for token in Scanner::new(s) {
            if token.is_err() {
                break;
            }
        }
        let _ = parse_str_with_options(s, &ParseOptions::default().no_blanks(true));
    }
    // Byte input goes through encoding detection first
    let _ = smallxml::Document::parse_bytes(data);
});
