//! Error types for key handling, derivation, and payload sealing.

use thiserror::Error;

/// Errors produced by the cryptographic layer.
///
/// Messages never contain key material, plaintext, or derived values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CryptoError {
    /// Key bytes do not encode a usable key.
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// What made the key unusable.
        reason: &'static str,
    },

    /// A signature failed to parse or verify.
    #[error("invalid signature: {reason}")]
    InvalidSignature {
        /// What made the signature unusable.
        reason: &'static str,
    },

    /// Key agreement or key expansion produced unusable output.
    #[error("key derivation failed: {reason}")]
    KeyDerivation {
        /// What went wrong during derivation.
        reason: &'static str,
    },

    /// Plaintext exceeds the sealable maximum.
    #[error("message too long: {len} bytes exceeds maximum {max}")]
    MessageTooLong {
        /// Offered plaintext length in bytes.
        len: usize,
        /// Hard ceiling in bytes.
        max: usize,
    },

    /// Payload could not be opened.
    ///
    /// Bad encoding, truncation, tampering, and a wrong key all surface as
    /// this one variant. Callers must not be able to tell them apart.
    #[error("decryption failed")]
    Decryption,
}

impl CryptoError {
    /// True for failures that indicate a malformed or hostile input rather
    /// than a local misuse of the API.
    #[must_use]
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey { .. } | Self::InvalidSignature { .. } | Self::Decryption
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_stable() {
        let err = CryptoError::InvalidKey { reason: "not a curve point" };
        assert_eq!(err.to_string(), "invalid key: not a curve point");

        let err = CryptoError::MessageTooLong { len: 70_000, max: 65_535 };
        assert_eq!(err.to_string(), "message too long: 70000 bytes exceeds maximum 65535");
    }

    #[test]
    fn decryption_error_carries_no_detail() {
        assert_eq!(CryptoError::Decryption.to_string(), "decryption failed");
    }

    #[test]
    fn input_failure_classification() {
        assert!(CryptoError::Decryption.is_input_failure());
        assert!(CryptoError::InvalidKey { reason: "short" }.is_input_failure());
        assert!(!CryptoError::MessageTooLong { len: 1, max: 0 }.is_input_failure());
    }
}
