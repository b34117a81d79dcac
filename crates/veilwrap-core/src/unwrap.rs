//! Receiving pipeline.
//!
//! Unwrapping walks the three layers inside out: parse the gift wrap,
//! decrypt it with the ephemeral author's key, verify the seal's
//! signature, decrypt the seal with the sender's key, parse the chat
//! message, and finally check that the seal's signer is the author the
//! chat message claims. The wrap's own signature is deliberately not
//! checked: the ephemeral key proves nothing, and the seal inside
//! carries the authentication that matters.

use veilwrap_crypto::{ConversationKey, SecretKey, payload};
use veilwrap_proto::{Event, EventError, Kind};

use crate::error::{EnvelopeError, Layer, Result};

/// Opens a serialized kind-1059 gift wrap addressed to `receiver` and
/// returns the verified inner chat message.
///
/// # Errors
///
/// Any ciphertext problem surfaces as an opaque
/// [`EnvelopeError::Decryption`] naming only the layer; a seal whose
/// signer differs from the chat message's author is rejected as
/// [`EnvelopeError::Impersonation`].
pub fn unwrap_envelope(receiver: &SecretKey, gift_wrap: &str) -> Result<Event> {
    // 1. Parse the outer wrap.
    let wrap = parse_layer(gift_wrap, Kind::GiftWrap, Layer::GiftWrap)?;

    // 2. Decrypt it with the conversation key shared with the ephemeral
    //    author. A hostile key that yields no usable shared secret is
    //    indistinguishable from any other broken ciphertext.
    let wrap_key = ConversationKey::derive(receiver, &wrap.pubkey)
        .map_err(|_| EnvelopeError::Decryption { layer: Layer::GiftWrap })?;
    let seal_bytes = payload::open(&wrap_key, &wrap.content)
        .map_err(|_| EnvelopeError::Decryption { layer: Layer::GiftWrap })?;

    // 3. Parse the seal and verify the sender's signature.
    let seal_json = decode_utf8(seal_bytes, Layer::Seal)?;
    let seal = parse_layer(&seal_json, Kind::Seal, Layer::Seal)?;
    seal.verify().map_err(EnvelopeError::Signature)?;

    // 4. Decrypt the seal with the conversation key shared with the
    //    sender.
    let seal_key = ConversationKey::derive(receiver, &seal.pubkey)
        .map_err(|_| EnvelopeError::Decryption { layer: Layer::Seal })?;
    let rumor_bytes = payload::open(&seal_key, &seal.content)
        .map_err(|_| EnvelopeError::Decryption { layer: Layer::Seal })?;

    // 5. Parse the chat message.
    let rumor_json = decode_utf8(rumor_bytes, Layer::ChatMessage)?;
    let rumor = parse_layer(&rumor_json, Kind::ChatMessage, Layer::ChatMessage)?;

    // 6. The seal's signer must be the author the chat message claims.
    if seal.pubkey != rumor.pubkey {
        return Err(EnvelopeError::Impersonation {
            sealed_by: seal.pubkey,
            claimed_author: rumor.pubkey,
        });
    }

    Ok(rumor)
}

fn parse_layer(json: &str, kind: Kind, layer: Layer) -> Result<Event> {
    let event =
        Event::from_json(json).map_err(|source| EnvelopeError::Parse { layer, source })?;
    event.expect_kind(kind).map_err(|source| EnvelopeError::Parse { layer, source })?;
    Ok(event)
}

fn decode_utf8(bytes: Vec<u8>, layer: Layer) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| EnvelopeError::Parse {
        layer,
        source: EventError::Malformed { reason: "record is not UTF-8".to_owned() },
    })
}
