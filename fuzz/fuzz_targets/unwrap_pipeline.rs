//! Fuzz target for the full unwrap pipeline
//!
//! Feeds arbitrary bytes to unwrap_envelope as if they arrived from a
//! relay:
//! - Malformed JSON and truncated records
//! - Valid-looking records with garbage ciphertext
//! - Records of the wrong kind at the outer layer
//! - Hostile author keys with no usable shared secret
//!
//! The pipeline should NEVER panic, and every failure must classify as
//! a rejection of hostile input rather than a local error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use veilwrap_core::unwrap_envelope;
use veilwrap_crypto::SecretKey;
use veilwrap_proto::Kind;

fuzz_target!(|data: &[u8]| {
    let Ok(wire) = std::str::from_utf8(data) else {
        return;
    };

    let receiver = SecretKey::from_bytes(&[42; 32]);

    match unwrap_envelope(&receiver, wire) {
        // Only a genuine envelope addressed to this key gets through,
        // and then the inner record is always a chat message.
        Ok(rumor) => assert_eq!(rumor.kind, Kind::ChatMessage),
        Err(err) => assert!(err.is_rejection()),
    }
});
