#![no_main]

use libfuzzer_sys::fuzz_target;

use ladle::pipeline::quantity;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let parsed = quantity::parse_quantity(Some(text));
        // min ≤ max must hold for anything that parses.
        if let (Some(min), Some(max)) = (parsed.qty_min, parsed.qty_max) {
            assert!(min <= max);
        }
    }
});
