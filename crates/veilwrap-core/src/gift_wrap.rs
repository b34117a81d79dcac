//! Gift-wrap construction.
//!
//! The outermost layer (kind 1059) hides the sender entirely: the seal
//! is encrypted to the recipient and signed with a single-use ephemeral
//! key that is wiped as soon as the wrap is built. An observer sees only
//! a random author, a jittered timestamp, and the recipient's routing
//! tag.

use rand::{CryptoRng, Rng};
use veilwrap_crypto::{ConversationKey, EphemeralKeypair, KEY_SIZE, PublicKey, WrapSalt, payload};
use veilwrap_proto::{Event, Kind, Tag};

use crate::error::{EnvelopeError, Layer, Result};
use crate::timestamp::jittered_timestamp;

/// Encrypts `seal` to `recipient` under a fresh ephemeral key and signs
/// the result as a kind-1059 gift wrap.
///
/// The wrap carries exactly one `p` tag naming the recipient and the
/// relay the wrap should be delivered to. The ephemeral key never
/// leaves this function.
pub fn wrap_seal<R: Rng + CryptoRng>(
    seal: &Event,
    recipient: &PublicKey,
    relay_hint: &str,
    salt: &WrapSalt,
    now: u64,
    rng: &mut R,
) -> Result<Event> {
    let mut seed = [0u8; KEY_SIZE];
    rng.fill_bytes(&mut seed);
    let ephemeral = EphemeralKeypair::from_seed(&mut seed);

    let key =
        ConversationKey::derive(ephemeral.secret(), recipient).map_err(EnvelopeError::Derivation)?;

    let plaintext = seal
        .to_json()
        .map_err(|source| EnvelopeError::Parse { layer: Layer::Seal, source })?;
    let content = payload::seal(&key, salt, plaintext.as_bytes())
        .map_err(|source| EnvelopeError::Encryption { layer: Layer::GiftWrap, source })?;

    let tags = vec![Tag::participant(recipient, relay_hint)];
    let created_at = jittered_timestamp(now, rng);
    Event::signed(ephemeral.secret(), created_at, Kind::GiftWrap, tags, content)
        .map_err(|source| EnvelopeError::Parse { layer: Layer::GiftWrap, source })
}
