//! Fuzz target for Event::from_json
//!
//! This fuzzer tests wire-record deserialization with:
//! - Malformed JSON
//! - Wrong field types and missing fields
//! - Invalid hex in id, pubkey, and sig fields
//! - Unknown kind numbers
//! - Oversized inputs
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error,
//! and any record that parses must survive verification and re-serialization
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use veilwrap_proto::Event;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(event) = Event::from_json(json) else {
        return;
    };

    // Parsed records must be safe to validate and re-emit.
    let _ = event.verify();
    let reemitted = event.to_json().unwrap();
    let reparsed = Event::from_json(&reemitted).unwrap();
    assert_eq!(reparsed, event);
});
