//! Conversation-key derivation.
//!
//! Both directions of a key pair derive the same 32-byte symmetric key:
//!
//! ```text
//! derive(a_secret, b_public) == derive(b_secret, a_public)
//! ```
//!
//! The key is HKDF-SHA256 over the X25519 shared secret of the converted
//! Ed25519 keys, under a fixed protocol label. The label separates these
//! keys from any other use of the same ECDH pair.
//!
//! # Security
//!
//! - An all-zero shared secret (peer key of small order) is rejected
//!   before any key material is produced.
//! - Keys zeroize on drop.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::StaticSecret;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::keys::{KEY_SIZE, PublicKey, SecretKey};

/// Domain-separation salt for conversation keys.
const CONVERSATION_SALT: &[u8] = b"veilwrap-conversation-v1";

/// Symmetric key shared by one unordered key pair.
///
/// Serves as input keying material for per-payload key derivation; it is
/// never used as a cipher key directly.
pub struct ConversationKey {
    key: [u8; KEY_SIZE],
}

impl ConversationKey {
    /// Derives the conversation key between `secret` and `public`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if the peer key contributes
    /// nothing to the shared secret.
    pub fn derive(secret: &SecretKey, public: &PublicKey) -> Result<Self, CryptoError> {
        let scalar = StaticSecret::from(secret.to_x25519_scalar());
        let peer = x25519_dalek::PublicKey::from(public.to_x25519_public());
        let shared = scalar.diffie_hellman(&peer);
        if !shared.was_contributory() {
            return Err(CryptoError::KeyDerivation {
                reason: "peer key contributed nothing to the shared secret",
            });
        }

        let hkdf = Hkdf::<Sha256>::new(Some(CONVERSATION_SALT), shared.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        let Ok(()) = hkdf.expand(&[], &mut key) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };
        Ok(Self { key })
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl Drop for ConversationKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConversationKey(..)")
    }
}
