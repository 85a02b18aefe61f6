#![no_main]
use libfuzzer_sys::fuzz_target;
use peprobe::{ParseLimits, PeImage};

fuzz_target!(|data: &[u8]| {
    // Parsing and table walks must never panic, whatever the bytes are.
    if let Ok(image) = PeImage::parse(data) {
        let limits = ParseLimits::default();
        let _ = image.exports(&limits);
        let _ = image.imports(&limits);
        let _ = image.is_managed();
    }
});
