//! Seal construction.
//!
//! The seal (kind 13) binds the chat message to its author: the sender
//! encrypts the serialized rumor to one recipient and signs the result
//! with their long-term key. The tag list is always empty, so the seal
//! leaks nothing about the conversation beyond "this sender sealed
//! something at roughly this time" — and even the time is jittered.

use rand::{CryptoRng, Rng};
use veilwrap_crypto::{ConversationKey, PublicKey, SecretKey, WrapSalt, payload};
use veilwrap_proto::{Event, Kind};

use crate::error::{EnvelopeError, Layer, Result};
use crate::timestamp::jittered_timestamp;

/// Encrypts `rumor` to `recipient` and signs the ciphertext as a kind-13
/// seal.
///
/// The salt is supplied by the caller so both layers of one wrap share
/// it; the payload layer still derives fresh message keys from it, so
/// the two ciphertexts never share key material.
pub fn seal_rumor<R: Rng + CryptoRng>(
    rumor: &Event,
    sender: &SecretKey,
    recipient: &PublicKey,
    salt: &WrapSalt,
    now: u64,
    rng: &mut R,
) -> Result<Event> {
    let key = ConversationKey::derive(sender, recipient).map_err(EnvelopeError::Derivation)?;

    let plaintext = rumor
        .to_json()
        .map_err(|source| EnvelopeError::Parse { layer: Layer::ChatMessage, source })?;
    let content = payload::seal(&key, salt, plaintext.as_bytes())
        .map_err(|source| EnvelopeError::Encryption { layer: Layer::Seal, source })?;

    let created_at = jittered_timestamp(now, rng);
    Event::signed(sender, created_at, Kind::Seal, Vec::new(), content)
        .map_err(|source| EnvelopeError::Parse { layer: Layer::Seal, source })
}
