//! Record kinds.
//!
//! The protocol is closed over three kinds; anything else fails decoding.
//! Unknown kinds are rejected rather than carried along, so a foreign
//! record can never ride through the unwrap pipeline unnoticed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::EventError;

/// Record kind discriminant carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Chat message: the innermost plaintext record, never signed.
    ChatMessage,
    /// Seal: signed by the sender; its content encrypts the chat message.
    Seal,
    /// Gift wrap: signed by an ephemeral key; its content encrypts the
    /// seal.
    GiftWrap,
}

impl Kind {
    /// Wire discriminant of this kind.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            Self::ChatMessage => 14,
            Self::Seal => 13,
            Self::GiftWrap => 1059,
        }
    }

    /// Parses a wire discriminant, returning `None` for kinds outside the
    /// protocol.
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            14 => Some(Self::ChatMessage),
            13 => Some(Self::Seal),
            1059 => Some(Self::GiftWrap),
            _ => None,
        }
    }
}

impl TryFrom<u16> for Kind {
    type Error = EventError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_u16(value).ok_or(EventError::UnknownKind(value))
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;
        Self::from_u16(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown record kind {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_roundtrip() {
        for kind in [Kind::ChatMessage, Kind::Seal, Kind::GiftWrap] {
            assert_eq!(Kind::from_u16(kind.as_u16()), Some(kind));
        }
    }

    #[test]
    fn wire_values_are_fixed() {
        assert_eq!(Kind::ChatMessage.as_u16(), 14);
        assert_eq!(Kind::Seal.as_u16(), 13);
        assert_eq!(Kind::GiftWrap.as_u16(), 1059);
    }

    #[test]
    fn unknown_discriminants_are_rejected() {
        assert_eq!(Kind::from_u16(0), None);
        assert_eq!(Kind::from_u16(1), None);
        assert_eq!(Kind::from_u16(1060), None);
        assert_eq!(Kind::try_from(99), Err(EventError::UnknownKind(99)));
    }

    #[test]
    fn serde_uses_wire_discriminants() {
        let json = serde_json::to_string(&Kind::GiftWrap).unwrap();
        assert_eq!(json, "1059");
        assert_eq!(serde_json::from_str::<Kind>("14").unwrap(), Kind::ChatMessage);
        assert!(serde_json::from_str::<Kind>("99").is_err());
    }
}
