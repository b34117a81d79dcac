//! Identity and ephemeral keys.
//!
//! One Ed25519 keypair covers both things a participant does: signing
//! envelope records and agreeing on conversation keys. For key agreement
//! the secret converts to its X25519 scalar and the public key to its
//! Montgomery form, so nobody has to provision a second keypair.
//!
//! Constructors take raw bytes. Callers supply randomness, which keeps
//! everything here deterministic and testable with fixed seeds.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Byte length of secret seeds, public keys, and conversation keys.
pub const KEY_SIZE: usize = 32;

/// Byte length of a detached signature.
pub const SIGNATURE_SIZE: usize = 64;

/// Long-lived signing and key-agreement secret.
///
/// The inner signing key zeroizes its material on drop.
pub struct SecretKey {
    signing: SigningKey,
}

impl SecretKey {
    /// Builds a secret key from a 32-byte seed.
    ///
    /// Every 32-byte string is a valid seed. The seed bytes stay owned by
    /// the caller, who should zeroize them after use.
    #[must_use]
    pub fn from_bytes(seed: &[u8; KEY_SIZE]) -> Self {
        Self { signing: SigningKey::from_bytes(seed) }
    }

    /// Parses a hex-encoded 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `hex` is not exactly 64 hex
    /// characters.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let mut seed = [0u8; KEY_SIZE];
        hex::decode_to_slice(hex, &mut seed)
            .map_err(|_| CryptoError::InvalidKey { reason: "secret key must be 64 hex characters" })?;
        let key = Self::from_bytes(&seed);
        seed.zeroize();
        Ok(key)
    }

    /// Public half of this keypair.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key().to_bytes())
    }

    /// Signs `message` with Ed25519, returning a detached signature.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing.sign(message).to_bytes())
    }

    /// X25519 scalar bytes of this secret, for key agreement.
    pub(crate) fn to_x25519_scalar(&self) -> [u8; KEY_SIZE] {
        self.signing.to_scalar_bytes()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material must never reach logs or panic output.
        f.write_str("SecretKey(..)")
    }
}

/// Participant identity: a validated Ed25519 public key.
///
/// Construction checks that the bytes decode to a curve point, so a held
/// `PublicKey` is always usable for verification and key agreement.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_SIZE]);

impl PublicKey {
    /// Validates and wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the bytes are not a valid
    /// curve point.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| CryptoError::InvalidKey { reason: "public key is not a valid curve point" })?;
        Ok(Self(bytes))
    }

    /// Parses a hex-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `hex` is not exactly 64 hex
    /// characters or does not decode to a curve point.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_SIZE];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|_| CryptoError::InvalidKey { reason: "public key must be 64 hex characters" })?;
        Self::from_bytes(bytes)
    }

    /// Lowercase hex form, as carried in wire records.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Verifies an Ed25519 `signature` over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if the signature does not
    /// verify under this key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            unreachable!("constructor validated the curve point");
        };
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        key.verify(message, &sig)
            .map_err(|_| CryptoError::InvalidSignature { reason: "verification failed" })
    }

    /// Montgomery-form bytes of this key, for key agreement.
    pub(crate) fn to_x25519_public(&self) -> [u8; KEY_SIZE] {
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            unreachable!("constructor validated the curve point");
        };
        key.to_montgomery().to_bytes()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Detached Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    /// Wraps raw signature bytes.
    ///
    /// Validity is only established by [`PublicKey::verify`].
    #[must_use]
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parses a hex-encoded signature.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if `hex` is not exactly
    /// 128 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; SIGNATURE_SIZE];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|_| CryptoError::InvalidSignature { reason: "signature must be 128 hex characters" })?;
        Ok(Self(bytes))
    }

    /// Lowercase hex form, as carried in wire records.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw signature bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signature").field(&self.to_hex()).finish()
    }
}

/// Single-use keypair that signs exactly one gift wrap.
///
/// Not clonable. The secret zeroizes on drop; build one per wrap from
/// fresh random bytes and let it fall out of scope right after signing.
pub struct EphemeralKeypair {
    secret: SecretKey,
}

impl EphemeralKeypair {
    /// Builds the keypair from a fresh 32-byte seed and wipes the seed in
    /// place, so no readable copy stays behind in the caller's frame.
    #[must_use]
    pub fn from_seed(seed: &mut [u8; KEY_SIZE]) -> Self {
        let secret = SecretKey::from_bytes(seed);
        seed.zeroize();
        Self { secret }
    }

    /// Public half, placed in the gift wrap's signer field.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// Signs `message` with the ephemeral secret.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message)
    }

    /// Borrows the secret for conversation-key derivation.
    #[must_use]
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl std::fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EphemeralKeypair(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_key(byte: u8) -> SecretKey {
        SecretKey::from_bytes(&[byte; KEY_SIZE])
    }

    #[test]
    fn same_seed_same_public_key() {
        let a = fixed_key(7);
        let b = fixed_key(7);
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn different_seeds_different_public_keys() {
        assert_ne!(fixed_key(1).public_key(), fixed_key(2).public_key());
    }

    #[test]
    fn sign_verify_roundtrip() {
        let key = fixed_key(3);
        let sig = key.sign(b"envelope body");
        assert!(key.public_key().verify(b"envelope body", &sig).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_message() {
        let key = fixed_key(3);
        let sig = key.sign(b"envelope body");
        let err = key.public_key().verify(b"other body", &sig);
        assert_eq!(err, Err(CryptoError::InvalidSignature { reason: "verification failed" }));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let sig = fixed_key(3).sign(b"envelope body");
        assert!(fixed_key(4).public_key().verify(b"envelope body", &sig).is_err());
    }

    #[test]
    fn verify_rejects_corrupted_signature() {
        let key = fixed_key(5);
        let mut bytes = *key.sign(b"payload").as_bytes();
        bytes[10] ^= 0x01;
        let tampered = Signature::from_bytes(bytes);
        assert!(key.public_key().verify(b"payload", &tampered).is_err());
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let public = fixed_key(9).public_key();
        let parsed = PublicKey::from_hex(&public.to_hex()).unwrap();
        assert_eq!(public, parsed);
    }

    #[test]
    fn secret_key_hex_roundtrip() {
        let hex = hex::encode([0x42u8; KEY_SIZE]);
        let key = SecretKey::from_hex(&hex).unwrap();
        assert_eq!(key.public_key(), fixed_key(0x42).public_key());
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        assert!(SecretKey::from_hex("abcd").is_err());
        assert!(PublicKey::from_hex("abcd").is_err());
        assert!(Signature::from_hex("abcd").is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(SecretKey::from_hex(&bad).is_err());
    }

    #[test]
    fn ephemeral_matches_plain_key_for_same_seed() {
        let mut seed = [0x11u8; KEY_SIZE];
        let expected = SecretKey::from_bytes(&seed).public_key();
        let ephemeral = EphemeralKeypair::from_seed(&mut seed);
        assert_eq!(ephemeral.public_key(), expected);

        let sig = ephemeral.sign(b"wrap");
        assert!(ephemeral.public_key().verify(b"wrap", &sig).is_ok());
    }

    #[test]
    fn ephemeral_seed_is_wiped() {
        let mut seed = [0x11u8; KEY_SIZE];
        let _ephemeral = EphemeralKeypair::from_seed(&mut seed);
        assert_eq!(seed, [0u8; KEY_SIZE]);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let key = fixed_key(1);
        assert_eq!(format!("{key:?}"), "SecretKey(..)");
        let ephemeral = EphemeralKeypair::from_seed(&mut [2u8; KEY_SIZE]);
        assert_eq!(format!("{ephemeral:?}"), "EphemeralKeypair(..)");
    }
}
