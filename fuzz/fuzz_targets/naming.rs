#![no_main]

use fixtura_core::fixture::normalize_relative;
use fixtura_core::logical_name_for;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let name = logical_name_for(s);
        assert!(name.starts_with("test"));
        assert!(!name.contains('/') && !name.contains('.'));

        // Normalizing is idempotent
        let once = normalize_relative(s);
        assert_eq!(normalize_relative(&once), once);
    }
});
