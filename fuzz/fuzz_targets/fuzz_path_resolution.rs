#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz target for path retrieval correctness.
//!
//! Resolves every path present in an arbitrary document and checks the result
//! against `serde_json::Value::pointer`, and that absent paths fail with
//! `Missing` at exactly the requested path.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_path_resolution

use delve_core::{Error, Json, Path, PathElement};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fn pointer(path: &Path) -> String {
    let mut out = String::new();
    for element in path {
        out.push('/');
        match element {
            PathElement::Key(k) => out.push_str(&k.replace('~', "~0").replace('/', "~1")),
            PathElement::Index(i) => out.push_str(&i.to_string()),
        }
    }
    out
}

fn generate_paths(value: &Value, prefix: &Path, paths: &mut Vec<Path>) {
    match value {
        Value::Object(obj) => {
            for (key, val) in obj {
                let next = prefix.key(key.as_str());
                paths.push(next.clone());
                // One step past the end of every object.
                paths.push(next.key("\u{0}absent"));
                generate_paths(val, &next, paths);
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                let next = prefix.index(i);
                paths.push(next.clone());
                generate_paths(val, &next, paths);
            }
            paths.push(prefix.index(arr.len()));
        }
        _ => {}
    }
}

fn verify(json: &Json, path: &Path) {
    let expected = json.as_value().pointer(&pointer(path));
    match (json.decode::<Value>(path), expected) {
        (Ok(found), Some(reference)) => {
            assert_eq!(&found, reference, "value mismatch at {path}");
        }
        (Err(Error::Missing { path: at }), None | Some(Value::Null)) => {
            assert_eq!(&at, path, "Missing must carry the requested path");
        }
        (Err(Error::TypeMismatch { path: at, .. }), None) => {
            assert_eq!(&at, path, "TypeMismatch must carry the requested path");
        }
        (Ok(found), None) => panic!("found {found} at {path} but pointer did not"),
        (Err(e), Some(reference)) => {
            panic!("failed with {e} at {path} but pointer found {reference}")
        }
        (Err(e), None) => panic!("unexpected error kind {e:?} at {path}"),
    }

    // Display output parses back to the same path.
    let shown = path.to_string();
    assert_eq!(Path::parse(&shown).as_ref(), Ok(path), "round trip of {shown}");
}

fuzz_target!(|data: &[u8]| {
    // Skip very large inputs
    if data.len() > 50_000 {
        return;
    }

    let Ok(json) = Json::from_slice(data) else {
        return;
    };

    let mut paths = vec![Path::root()];
    generate_paths(json.as_value(), &Path::root(), &mut paths);

    for path in &paths {
        verify(&json, path);
    }
});
