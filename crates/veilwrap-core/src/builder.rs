//! Envelope fan-out.
//!
//! One send produces one gift wrap per recipient plus one addressed to
//! the sender, so the sender's own devices can replay the conversation.
//! Every wrap carries the same inner chat message but is otherwise
//! unlinkable: fresh ephemeral key, fresh salt, independently jittered
//! timestamps.

use std::collections::HashSet;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use veilwrap_crypto::{PublicKey, SALT_SIZE, SecretKey, WrapSalt};
use veilwrap_proto::EventId;

use crate::error::{EnvelopeError, Layer, Result};
use crate::gift_wrap::wrap_seal;
use crate::rumor::build_rumor;
use crate::seal::seal_rumor;
use crate::timestamp::unix_now;

/// A delivery target: who receives a wrap and which relay it should be
/// published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    public: PublicKey,
    relay: String,
}

impl Recipient {
    /// Creates a recipient from an already-validated public key.
    pub fn new(public: PublicKey, relay: impl Into<String>) -> Self {
        Self { public, relay: relay.into() }
    }

    /// Parses the public key from hex.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Key`] if the hex does not decode to a
    /// valid verifying key.
    pub fn from_hex(public_hex: &str, relay: impl Into<String>) -> Result<Self> {
        let public = PublicKey::from_hex(public_hex).map_err(EnvelopeError::Key)?;
        Ok(Self::new(public, relay))
    }

    /// The recipient's public key.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// The relay this recipient's wrap should be published to.
    pub fn relay(&self) -> &str {
        &self.relay
    }
}

/// Everything a single send needs.
#[derive(Debug, Clone)]
pub struct EnvelopeRequest {
    /// Relay advertised for replies to this conversation.
    pub sender_relay: String,
    /// Delivery targets, in the order they appear in the chat message.
    pub recipients: Vec<Recipient>,
    /// Message body.
    pub content: String,
    /// Optional conversation subject.
    pub subject: Option<String>,
    /// Message this send replies to, if any.
    pub reply_to: Option<EventId>,
}

/// One gift wrap, ready to publish.
#[derive(Debug, Clone)]
pub struct WrappedEnvelope {
    recipient: PublicKey,
    relay: String,
    gift_wrap: String,
}

impl WrappedEnvelope {
    /// Who this wrap is addressed to.
    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }

    /// Where this wrap should be published.
    pub fn relay(&self) -> &str {
        &self.relay
    }

    /// The serialized kind-1059 record.
    pub fn gift_wrap(&self) -> &str {
        &self.gift_wrap
    }
}

/// The full fan-out for one send: one wrap per recipient, self-copy
/// last.
#[derive(Debug, Clone)]
pub struct EnvelopeBatch {
    rumor_id: EventId,
    envelopes: Vec<WrappedEnvelope>,
}

impl EnvelopeBatch {
    /// Id of the inner chat message, identical across all wraps.
    pub fn rumor_id(&self) -> &EventId {
        &self.rumor_id
    }

    /// Number of wraps, including the sender's self-copy.
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    /// True when the batch holds no wraps. Never the case for a batch
    /// produced by [`build_envelopes`], which always includes the
    /// self-copy.
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Iterates wraps in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &WrappedEnvelope> {
        self.envelopes.iter()
    }

    /// The wrap addressed to `participant`, if one exists.
    pub fn for_participant(&self, participant: &PublicKey) -> Option<&WrappedEnvelope> {
        self.envelopes.iter().find(|envelope| envelope.recipient == *participant)
    }

    /// The sender's own copy. Always the last wrap in the batch.
    pub fn self_copy(&self) -> Option<&WrappedEnvelope> {
        self.envelopes.last()
    }
}

/// Builds the complete fan-out for one send using the system clock and
/// the operating-system RNG.
///
/// # Errors
///
/// Returns [`EnvelopeError::DuplicateRecipient`] if a recipient key
/// appears twice or names the sender, and propagates any layer failure.
pub fn build_envelopes(sender: &SecretKey, request: &EnvelopeRequest) -> Result<EnvelopeBatch> {
    build_envelopes_at(sender, request, unix_now(), &mut OsRng)
}

/// [`build_envelopes`] with the clock and RNG supplied by the caller.
pub fn build_envelopes_at<R: Rng + CryptoRng>(
    sender: &SecretKey,
    request: &EnvelopeRequest,
    now: u64,
    rng: &mut R,
) -> Result<EnvelopeBatch> {
    let sender_public = sender.public_key();
    reject_duplicates(&sender_public, &request.recipients)?;

    let rumor = build_rumor(
        &sender_public,
        &request.sender_relay,
        &request.recipients,
        &request.content,
        request.subject.as_deref(),
        request.reply_to.as_ref(),
        now,
    )?;

    let self_copy = Recipient::new(sender_public, request.sender_relay.clone());
    let targets = request.recipients.iter().chain(std::iter::once(&self_copy));

    let mut envelopes = Vec::with_capacity(request.recipients.len() + 1);
    for target in targets {
        let mut salt_bytes = [0u8; SALT_SIZE];
        rng.fill_bytes(&mut salt_bytes);
        let salt = WrapSalt::from_bytes(salt_bytes);

        let seal = seal_rumor(&rumor, sender, target.public(), &salt, now, rng)?;
        let wrap = wrap_seal(&seal, target.public(), target.relay(), &salt, now, rng)?;
        let gift_wrap = wrap
            .to_json()
            .map_err(|source| EnvelopeError::Parse { layer: Layer::GiftWrap, source })?;

        envelopes.push(WrappedEnvelope {
            recipient: *target.public(),
            relay: target.relay().to_owned(),
            gift_wrap,
        });
    }

    tracing::debug!(
        recipients = request.recipients.len(),
        envelopes = envelopes.len(),
        "Built envelope batch"
    );

    Ok(EnvelopeBatch { rumor_id: rumor.id, envelopes })
}

fn reject_duplicates(sender: &PublicKey, recipients: &[Recipient]) -> Result<()> {
    let mut seen = HashSet::with_capacity(recipients.len() + 1);
    seen.insert(*sender);
    for recipient in recipients {
        if !seen.insert(*recipient.public()) {
            return Err(EnvelopeError::DuplicateRecipient(*recipient.public()));
        }
    }
    Ok(())
}
