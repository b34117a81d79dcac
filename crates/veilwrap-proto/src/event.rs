//! Envelope wire records.
//!
//! Every layer of an envelope is the same record shape, serialized as
//! compact JSON:
//!
//! ```text
//! {
//!   "id":         content address (hex SHA-256)
//!   "pubkey":     claimed author or signer (hex)
//!   "created_at": unix seconds
//!   "kind":       14 | 13 | 1059
//!   "tags":       array of string arrays
//!   "content":    plaintext or sealed payload
//!   "sig":        detached signature over id (hex); absent on rumors
//! }
//! ```
//!
//! The content address is SHA-256 over the compact JSON array
//! `[0, pubkey, created_at, kind, tags, content]`, and the signature signs
//! the 32 address bytes. Signing therefore covers every field except the
//! signature itself.
//!
//! # Validation order
//!
//! [`Event::from_json`] checks the size ceiling before parsing, so hostile
//! input cannot force a large parse. [`Event::verify`] recomputes the
//! content address before touching the signature; a record whose id lies
//! about its contents never reaches signature verification.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use veilwrap_crypto::{PublicKey, SecretKey, Signature};

use crate::errors::{EventError, Result};
use crate::kind::Kind;
use crate::tag::Tag;

/// Largest serialized record accepted by [`Event::from_json`].
///
/// Generous enough for a gift wrap whose sealed seal carries a
/// maximum-size chat message, with room for tags.
pub const MAX_EVENT_SIZE: usize = 262_144;

/// Content address of a record: SHA-256 of its canonical serialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId([u8; 32]);

impl EventId {
    /// Wraps raw address bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a hex-encoded address.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Malformed`] if `hex` is not exactly 64 hex
    /// characters.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|_| EventError::Malformed { reason: "id must be 64 hex characters".into() })?;
        Ok(Self(bytes))
    }

    /// Lowercase hex form, as carried in wire records.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw address bytes; the signature input.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EventId").field(&self.to_hex()).finish()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for EventId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// One wire record: a chat message, a seal, or a gift wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Content address of the record.
    pub id: EventId,
    /// Claimed author (chat message) or signer (seal, gift wrap).
    #[serde(with = "pubkey_hex")]
    pub pubkey: PublicKey,
    /// Unix timestamp in seconds.
    pub created_at: u64,
    /// Record kind.
    pub kind: Kind,
    /// Ordered tags.
    pub tags: Vec<Tag>,
    /// Plaintext or sealed payload.
    pub content: String,
    /// Detached signature over the id. Absent on chat messages, which
    /// stay deliberately unsigned.
    #[serde(with = "signature_hex", skip_serializing_if = "Option::is_none", default)]
    pub sig: Option<Signature>,
}

impl Event {
    /// Builds an unsigned record with a computed content address.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Serialize`] if canonical serialization fails.
    pub fn unsigned(
        pubkey: PublicKey,
        created_at: u64,
        kind: Kind,
        tags: Vec<Tag>,
        content: String,
    ) -> Result<Self> {
        let id = canonical_id(&pubkey, created_at, kind, &tags, &content)?;
        Ok(Self { id, pubkey, created_at, kind, tags, content, sig: None })
    }

    /// Builds a record signed by `secret`; the matching public key becomes
    /// the record's `pubkey`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Serialize`] if canonical serialization fails.
    pub fn signed(
        secret: &SecretKey,
        created_at: u64,
        kind: Kind,
        tags: Vec<Tag>,
        content: String,
    ) -> Result<Self> {
        let mut event = Self::unsigned(secret.public_key(), created_at, kind, tags, content)?;
        event.sig = Some(secret.sign(event.id.as_bytes()));
        Ok(event)
    }

    /// Recomputes this record's content address from its fields.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Serialize`] if canonical serialization fails.
    pub fn compute_id(&self) -> Result<EventId> {
        canonical_id(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)
    }

    /// Verifies integrity and authenticity.
    ///
    /// Checks, in order: the id matches the record contents, a signature
    /// is present, and the signature verifies under the claimed `pubkey`.
    ///
    /// # Errors
    ///
    /// - [`EventError::IdMismatch`] if the id lies about the contents
    /// - [`EventError::MissingSignature`] if the record is unsigned
    /// - [`EventError::BadSignature`] if verification fails
    pub fn verify(&self) -> Result<()> {
        if self.compute_id()? != self.id {
            return Err(EventError::IdMismatch);
        }
        let sig = self.sig.as_ref().ok_or(EventError::MissingSignature)?;
        self.pubkey
            .verify(self.id.as_bytes(), sig)
            .map_err(|_| EventError::BadSignature)
    }

    /// Requires this record to be of `expected` kind.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnexpectedKind`] otherwise.
    pub fn expect_kind(&self, expected: Kind) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(EventError::UnexpectedKind {
                expected: expected.as_u16(),
                found: self.kind.as_u16(),
            })
        }
    }

    /// Serializes to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| EventError::Serialize { reason: err.to_string() })
    }

    /// Parses a record from JSON. The size ceiling is enforced before any
    /// parsing happens.
    ///
    /// # Errors
    ///
    /// - [`EventError::TooLarge`] if `json` exceeds [`MAX_EVENT_SIZE`]
    /// - [`EventError::Malformed`] if `json` does not parse
    pub fn from_json(json: &str) -> Result<Self> {
        if json.len() > MAX_EVENT_SIZE {
            return Err(EventError::TooLarge { len: json.len(), max: MAX_EVENT_SIZE });
        }
        serde_json::from_str(json).map_err(|err| EventError::Malformed { reason: err.to_string() })
    }
}

/// Canonical content address: SHA-256 over the compact JSON array
/// `[0, pubkey, created_at, kind, tags, content]`.
fn canonical_id(
    pubkey: &PublicKey,
    created_at: u64,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> Result<EventId> {
    let canonical =
        serde_json::to_string(&(0u8, pubkey.to_hex(), created_at, kind.as_u16(), tags, content))
            .map_err(|err| EventError::Serialize { reason: err.to_string() })?;
    Ok(EventId::from_bytes(Sha256::digest(canonical.as_bytes()).into()))
}

mod pubkey_hex {
    use serde::{Deserialize, Deserializer, Serializer};
    use veilwrap_crypto::PublicKey;

    pub fn serialize<S: Serializer>(
        key: &PublicKey,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<PublicKey, D::Error> {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

mod signature_hex {
    use serde::{Deserialize, Deserializer, Serializer};
    use veilwrap_crypto::Signature;

    pub fn serialize<S: Serializer>(
        sig: &Option<Signature>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match sig {
            Some(sig) => serializer.serialize_str(&sig.to_hex()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Signature>, D::Error> {
        let hex = Option::<String>::deserialize(deserializer)?;
        hex.map(|hex| Signature::from_hex(&hex).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(byte: u8) -> SecretKey {
        SecretKey::from_bytes(&[byte; 32])
    }

    fn sample_tags(byte: u8) -> Vec<Tag> {
        vec![Tag::participant(&secret(byte).public_key(), "wss://relay.example.com")]
    }

    #[test]
    fn unsigned_record_has_no_signature_field() {
        let event = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            sample_tags(2),
            "hi".into(),
        )
        .unwrap();

        assert_eq!(event.sig, None);
        let json = event.to_json().unwrap();
        assert!(!json.contains("\"sig\""), "unsigned json was: {json}");
    }

    #[test]
    fn id_is_deterministic() {
        let make = || {
            Event::unsigned(
                secret(1).public_key(),
                1_700_000_000,
                Kind::ChatMessage,
                sample_tags(2),
                "hi".into(),
            )
            .unwrap()
        };
        assert_eq!(make().id, make().id);
    }

    #[test]
    fn id_covers_every_field() {
        let base = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            sample_tags(2),
            "hi".into(),
        )
        .unwrap();

        let other_author = Event::unsigned(
            secret(3).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            sample_tags(2),
            "hi".into(),
        )
        .unwrap();
        let other_time = Event::unsigned(
            secret(1).public_key(),
            1_700_000_001,
            Kind::ChatMessage,
            sample_tags(2),
            "hi".into(),
        )
        .unwrap();
        let other_kind = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::Seal,
            sample_tags(2),
            "hi".into(),
        )
        .unwrap();
        let other_tags = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            sample_tags(4),
            "hi".into(),
        )
        .unwrap();
        let other_content = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            sample_tags(2),
            "ho".into(),
        )
        .unwrap();

        for variant in [other_author, other_time, other_kind, other_tags, other_content] {
            assert_ne!(base.id, variant.id);
        }
    }

    #[test]
    fn signature_does_not_change_the_id() {
        let key = secret(1);
        let unsigned = Event::unsigned(
            key.public_key(),
            1_700_000_000,
            Kind::Seal,
            Vec::new(),
            "payload".into(),
        )
        .unwrap();
        let signed =
            Event::signed(&key, 1_700_000_000, Kind::Seal, Vec::new(), "payload".into()).unwrap();
        assert_eq!(unsigned.id, signed.id);
    }

    #[test]
    fn signed_record_verifies() {
        let event =
            Event::signed(&secret(1), 1_700_000_000, Kind::Seal, Vec::new(), "payload".into())
                .unwrap();
        assert!(event.verify().is_ok());
    }

    #[test]
    fn verify_rejects_unsigned() {
        let event = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            Vec::new(),
            "hi".into(),
        )
        .unwrap();
        assert_eq!(event.verify(), Err(EventError::MissingSignature));
    }

    #[test]
    fn verify_rejects_edited_content() {
        let mut event =
            Event::signed(&secret(1), 1_700_000_000, Kind::Seal, Vec::new(), "payload".into())
                .unwrap();
        event.content = "edited".into();
        assert_eq!(event.verify(), Err(EventError::IdMismatch));
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let event =
            Event::signed(&secret(1), 1_700_000_000, Kind::Seal, Vec::new(), "payload".into())
                .unwrap();
        let foreign =
            Event::signed(&secret(2), 1_700_000_000, Kind::Seal, Vec::new(), "payload".into())
                .unwrap();

        let mut forged = event;
        forged.sig = foreign.sig;
        assert_eq!(forged.verify(), Err(EventError::BadSignature));
    }

    #[test]
    fn verify_rejects_forged_id() {
        let mut event =
            Event::signed(&secret(1), 1_700_000_000, Kind::Seal, Vec::new(), "payload".into())
                .unwrap();
        event.id = EventId::from_bytes([0u8; 32]);
        assert_eq!(event.verify(), Err(EventError::IdMismatch));
    }

    #[test]
    fn json_roundtrip_preserves_the_record() {
        let event = Event::signed(
            &secret(1),
            1_700_000_000,
            Kind::GiftWrap,
            sample_tags(2),
            "c2VhbGVk".into(),
        )
        .unwrap();

        let parsed = Event::from_json(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, event);
        assert!(parsed.verify().is_ok());
    }

    #[test]
    fn json_roundtrip_handles_escaped_content() {
        let event = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            Vec::new(),
            "line one\nline \"two\" \\ емодзі 🎁".into(),
        )
        .unwrap();

        let parsed = Event::from_json(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.compute_id().unwrap(), parsed.id);
    }

    #[test]
    fn from_json_rejects_oversized_input() {
        let big = "x".repeat(MAX_EVENT_SIZE + 1);
        assert_eq!(
            Event::from_json(&big),
            Err(EventError::TooLarge { len: MAX_EVENT_SIZE + 1, max: MAX_EVENT_SIZE })
        );
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(Event::from_json("{"), Err(EventError::Malformed { .. })));
        assert!(matches!(Event::from_json(""), Err(EventError::Malformed { .. })));
        assert!(matches!(Event::from_json("[1,2,3]"), Err(EventError::Malformed { .. })));
    }

    #[test]
    fn from_json_rejects_unknown_kind() {
        let event = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            Vec::new(),
            "hi".into(),
        )
        .unwrap();
        let json = event.to_json().unwrap().replace("\"kind\":14", "\"kind\":999");
        assert!(matches!(Event::from_json(&json), Err(EventError::Malformed { .. })));
    }

    #[test]
    fn from_json_rejects_invalid_pubkey_hex() {
        let event = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::ChatMessage,
            Vec::new(),
            "hi".into(),
        )
        .unwrap();
        let json = event
            .to_json()
            .unwrap()
            .replace(&event.pubkey.to_hex(), "zz");
        assert!(matches!(Event::from_json(&json), Err(EventError::Malformed { .. })));
    }

    #[test]
    fn expect_kind_checks_position() {
        let event = Event::unsigned(
            secret(1).public_key(),
            1_700_000_000,
            Kind::Seal,
            Vec::new(),
            "hi".into(),
        )
        .unwrap();
        assert!(event.expect_kind(Kind::Seal).is_ok());
        assert_eq!(
            event.expect_kind(Kind::GiftWrap),
            Err(EventError::UnexpectedKind { expected: 1059, found: 13 })
        );
    }

    #[test]
    fn event_id_hex_roundtrip() {
        let id = EventId::from_bytes([0x5C; 32]);
        assert_eq!(EventId::from_hex(&id.to_hex()).unwrap(), id);
        assert!(EventId::from_hex("abc").is_err());
    }
}
