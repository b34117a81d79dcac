//! Record tags.
//!
//! Tags are ordered arrays of strings, and their order is part of the
//! record identity (the content address hashes the tag array). All
//! construction is explicit and positional; nothing here ever iterates a
//! map.

use serde::{Deserialize, Serialize};
use veilwrap_crypto::PublicKey;

use crate::event::EventId;

/// Tag name marking a participant entry.
pub const TAG_PARTICIPANT: &str = "p";

/// Tag name carrying the subject line.
pub const TAG_SUBJECT: &str = "subject";

/// Tag name referencing another record.
pub const TAG_REFERENCE: &str = "e";

/// Marker appended to reply references.
pub const REPLY_MARKER: &str = "reply";

/// One ordered tag, serialized as a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Vec<String>);

impl Tag {
    /// Participant entry: `["p", pubkey, relay hint]`.
    #[must_use]
    pub fn participant(public: &PublicKey, relay: &str) -> Self {
        Self(vec![TAG_PARTICIPANT.to_owned(), public.to_hex(), relay.to_owned()])
    }

    /// Subject line: `["subject", text]`.
    #[must_use]
    pub fn subject(text: &str) -> Self {
        Self(vec![TAG_SUBJECT.to_owned(), text.to_owned()])
    }

    /// Reply reference: `["e", id, relay hint, "reply"]`.
    #[must_use]
    pub fn reply(reference: &EventId, relay: &str) -> Self {
        Self(vec![
            TAG_REFERENCE.to_owned(),
            reference.to_hex(),
            relay.to_owned(),
            REPLY_MARKER.to_owned(),
        ])
    }

    /// Tag name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Primary value (second element), if present.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// Relay hint (third element), if present.
    #[must_use]
    pub fn relay(&self) -> Option<&str> {
        self.0.get(2).map(String::as_str)
    }

    /// Participant public key, if this is a well-formed `p` tag.
    #[must_use]
    pub fn as_participant(&self) -> Option<PublicKey> {
        if self.name() != Some(TAG_PARTICIPANT) {
            return None;
        }
        self.value().and_then(|hex| PublicKey::from_hex(hex).ok())
    }

    /// All elements in order.
    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.0
    }
}
