#![no_main]

use libfuzzer_sys::fuzz_target;

use ladle::pipeline::unit;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let norm = unit::normalize_unit(Some(text), true);
        // Enum and dimension always agree.
        match norm.unit_enum {
            Some(u) => assert_eq!(norm.original_dimension, Some(u.dimension())),
            None => assert!(norm.original_dimension.is_none()),
        }
    }
});
