//! Error types for record encoding, decoding, and verification.

use thiserror::Error;

/// Convenience alias for proto-layer results.
pub type Result<T> = std::result::Result<T, EventError>;

/// Errors produced while encoding, decoding, or verifying wire records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventError {
    /// Serialized record exceeds the accepted maximum.
    ///
    /// Checked before any parsing, so hostile input cannot force a large
    /// allocation.
    #[error("record too large: {len} bytes exceeds maximum {max}")]
    TooLarge {
        /// Offered size in bytes.
        len: usize,
        /// Hard ceiling in bytes.
        max: usize,
    },

    /// Input does not parse into a record.
    #[error("malformed record: {reason}")]
    Malformed {
        /// Parser diagnostic. Carries positions, never payload data.
        reason: String,
    },

    /// Kind value outside the protocol.
    #[error("unknown record kind {0}")]
    UnknownKind(u16),

    /// Record kind differs from the kind required in this position.
    #[error("unexpected record kind: expected {expected}, found {found}")]
    UnexpectedKind {
        /// Kind required here.
        expected: u16,
        /// Kind the record carries.
        found: u16,
    },

    /// Record carries no signature where one is required.
    #[error("record is unsigned")]
    MissingSignature,

    /// Record id does not match the record's contents.
    #[error("record id does not match contents")]
    IdMismatch,

    /// Signature does not verify under the record's claimed key.
    #[error("signature verification failed")]
    BadSignature,

    /// Record could not be serialized.
    #[error("serialization failed: {reason}")]
    Serialize {
        /// Serializer diagnostic.
        reason: String,
    },
}

impl EventError {
    /// True when the record arrived broken or forged, as opposed to a
    /// local construction problem.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Serialize { .. })
    }
}
