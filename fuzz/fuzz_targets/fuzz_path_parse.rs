#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz target for dotted path notation.
//!
//! Parsing arbitrary text must never panic, and any accepted path must render
//! back to text that parses to the same path.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_path_parse

use delve_core::Path;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(path) = Path::parse(text) {
        let shown = path.to_string();
        let again = Path::parse(&shown);
        assert_eq!(again.as_ref(), Ok(&path), "{text:?} rendered as {shown:?}");
    }
});
