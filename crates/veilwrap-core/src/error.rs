//! Envelope error taxonomy.
//!
//! Every failure names the envelope layer it happened in, and nothing
//! more: variants never carry plaintext, derived keys, nonces, or salts.
//! Decryption failures are a single opaque case per layer, so a caller
//! relaying errors outward cannot become a decryption oracle.

use thiserror::Error;
use veilwrap_crypto::{CryptoError, PublicKey};
use veilwrap_proto::EventError;

/// Convenience alias for envelope results.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Envelope layer in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Outer ephemeral-signed record.
    GiftWrap,
    /// Sender-signed middle record.
    Seal,
    /// Innermost plaintext record.
    ChatMessage,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::GiftWrap => "gift wrap",
            Self::Seal => "seal",
            Self::ChatMessage => "chat message",
        })
    }
}

/// Errors produced while building or unwrapping envelopes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnvelopeError {
    /// A supplied key was unusable.
    #[error("key error: {0}")]
    Key(CryptoError),

    /// Conversation-key derivation failed.
    #[error("derivation error: {0}")]
    Derivation(CryptoError),

    /// A layer could not be sealed.
    #[error("encryption failed at the {layer} layer: {source}")]
    Encryption {
        /// Layer being sealed.
        layer: Layer,
        /// Underlying cause; sizes at most, never data.
        source: CryptoError,
    },

    /// A layer could not be opened.
    ///
    /// Tampering and a wrong key are deliberately indistinguishable.
    #[error("decryption failed at the {layer} layer")]
    Decryption {
        /// Layer whose payload failed to open.
        layer: Layer,
    },

    /// The seal's signature did not verify against its claimed signer.
    #[error("seal rejected: {0}")]
    Signature(EventError),

    /// A layer did not parse as the record required in its position.
    #[error("malformed {layer} record: {source}")]
    Parse {
        /// Layer being parsed.
        layer: Layer,
        /// Underlying cause.
        source: EventError,
    },

    /// The seal signer and the claimed chat-message author differ.
    #[error("impersonation detected: sealed by {sealed_by}, claims author {claimed_author}")]
    Impersonation {
        /// Key that signed the seal.
        sealed_by: PublicKey,
        /// Author the chat message claims.
        claimed_author: PublicKey,
    },

    /// The same participant would receive two wraps from one request.
    #[error("duplicate recipient {0}")]
    DuplicateRecipient(PublicKey),
}

impl EnvelopeError {
    /// True when a received envelope was rejected as broken or hostile,
    /// as opposed to a local construction problem.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Decryption { .. }
                | Self::Signature(_)
                | Self::Parse { .. }
                | Self::Impersonation { .. }
        )
    }
}
