#![no_main]

use estate_custody::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing must never panic, and anything that parses must print back
    // to a string that parses to the same address.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(address) = s.parse::<Address>() {
            let printed = address.to_string();
            assert_eq!(printed.parse::<Address>().ok(), Some(address));
        }
    }
});
