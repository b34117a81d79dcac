//! Chat-message construction.
//!
//! The chat message ("rumor") is the record every participant ultimately
//! reads. It is built once per send and shared across all wraps, so every
//! participant sees the same id, the same honest timestamp, and the same
//! participant list in the same order. It is never signed; a leaked copy
//! proves nothing about who wrote it.

use veilwrap_crypto::PublicKey;
use veilwrap_proto::{Event, EventId, Kind, Tag};

use crate::builder::Recipient;
use crate::error::{EnvelopeError, Layer, Result};

/// Builds the unsigned kind-14 chat message.
///
/// Tag order is fixed and deterministic: the sender's own `p` entry
/// first, recipients in caller order, then the optional subject and reply
/// reference. The reply reference carries the sender relay, where the
/// thread lives.
pub fn build_rumor(
    sender: &PublicKey,
    sender_relay: &str,
    recipients: &[Recipient],
    content: &str,
    subject: Option<&str>,
    reply_to: Option<&EventId>,
    created_at: u64,
) -> Result<Event> {
    let mut tags = Vec::with_capacity(recipients.len() + 3);
    tags.push(Tag::participant(sender, sender_relay));
    for recipient in recipients {
        tags.push(Tag::participant(recipient.public(), recipient.relay()));
    }
    if let Some(subject) = subject {
        tags.push(Tag::subject(subject));
    }
    if let Some(reply_to) = reply_to {
        tags.push(Tag::reply(reply_to, sender_relay));
    }

    Event::unsigned(*sender, created_at, Kind::ChatMessage, tags, content.to_owned())
        .map_err(|source| EnvelopeError::Parse { layer: Layer::ChatMessage, source })
}
