//! Fuzz target for the build → corrupt → unwrap cycle
//!
//! Builds a real envelope batch from fuzzer-chosen inputs, optionally
//! corrupts one wrap on the wire, and unwraps every copy.
//!
//! # Invariants
//!
//! - Untouched wraps always open for their recipient and yield the
//!   batch's rumor id
//! - A corrupted wrap never panics and never opens into a different
//!   message
//! - The wrong key never opens anything

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::StdRng;
use veilwrap_core::{EnvelopeRequest, Recipient, build_envelopes_at, unwrap_envelope};
use veilwrap_crypto::SecretKey;

#[derive(Debug, Arbitrary)]
struct RoundtripScenario {
    rng_seed: u64,
    content: String,
    subject: Option<String>,
    recipient_count: u8,
    corruption: Option<Corruption>,
}

#[derive(Debug, Arbitrary)]
struct Corruption {
    target: u8,
    position: u16,
    xor: u8,
}

fuzz_target!(|scenario: RoundtripScenario| {
    if scenario.content.len() > 4096
        || scenario.subject.as_ref().is_some_and(|s| s.len() > 256)
    {
        return;
    }

    let mut rng = StdRng::seed_from_u64(scenario.rng_seed);
    let sender = SecretKey::from_bytes(&[1; 32]);
    let recipient_count = (scenario.recipient_count % 4) as usize;

    let recipient_keys: Vec<SecretKey> =
        (0..recipient_count).map(|i| SecretKey::from_bytes(&[2 + i as u8; 32])).collect();

    let request = EnvelopeRequest {
        sender_relay: "wss://sender.example.com".to_owned(),
        recipients: recipient_keys
            .iter()
            .map(|key| Recipient::new(key.public_key(), "wss://relay.example.com"))
            .collect(),
        content: scenario.content.clone(),
        subject: scenario.subject.clone(),
        reply_to: None,
    };

    let batch = build_envelopes_at(&sender, &request, 1_700_000_000, &mut rng)
        .expect("building from valid inputs cannot fail");
    assert_eq!(batch.len(), recipient_count + 1);

    let readers: Vec<&SecretKey> =
        recipient_keys.iter().chain(std::iter::once(&sender)).collect();

    for (index, (reader, envelope)) in readers.iter().zip(batch.iter()).enumerate() {
        let corrupt_here = scenario
            .corruption
            .as_ref()
            .filter(|c| (c.target as usize) % batch.len() == index && c.xor != 0);

        let wire = match corrupt_here {
            None => envelope.gift_wrap().to_owned(),
            Some(corruption) => {
                let mut bytes = envelope.gift_wrap().to_owned().into_bytes();
                let position = (corruption.position as usize) % bytes.len();
                bytes[position] ^= corruption.xor;
                match String::from_utf8(bytes) {
                    Ok(wire) => wire,
                    Err(_) => continue,
                }
            },
        };

        match unwrap_envelope(reader, &wire) {
            Ok(rumor) => {
                // Corruption that survives to an Ok must not have
                // changed the message (e.g. a flipped bit in a relay
                // hint leaves the ciphertext intact).
                assert_eq!(&rumor.id, batch.rumor_id());
                assert_eq!(rumor.content, scenario.content);
            },
            Err(err) => {
                assert!(corrupt_here.is_some(), "untouched wrap failed: {err}");
                assert!(err.is_rejection());
            },
        }

        // The wrong key never opens an untouched wrap.
        let eve = SecretKey::from_bytes(&[99; 32]);
        assert!(unwrap_envelope(&eve, envelope.gift_wrap()).is_err());
    }
});
