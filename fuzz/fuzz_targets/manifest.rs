#![no_main]

use std::path::Path;

use fixtura::manifest::Manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything that parses must serialize and parse back to the same manifest
        if let Ok(manifest) = Manifest::parse(s, Path::new("fuzz.toml")) {
            if let Ok(text) = manifest.to_toml_string() {
                let reparsed = Manifest::parse(&text, Path::new("fuzz.toml"));
                assert_eq!(reparsed.ok(), Some(manifest));
            }
        }
    }
});
