//! Sealed payload format for envelope contents.
//!
//! A sealed payload is `base64(version ‖ salt ‖ ciphertext)`:
//!
//! ```text
//! Byte 0:      format version (0x01)
//! Bytes 1-32:  salt, fed back into HKDF on open
//! Bytes 33-..: XChaCha20-Poly1305 ciphertext and tag
//! ```
//!
//! The cipher key and nonce are derived per payload from
//! `HKDF-SHA256(salt, conversation key)`. Plaintext carries a two-byte
//! length prefix and is zero-padded, so ciphertext length reveals only a
//! coarse size bucket.
//!
//! # Salt reuse across layers
//!
//! One [`WrapSalt`] covers both layers of a single wrap invocation: the
//! seal layer is keyed by the sender↔recipient conversation key, the wrap
//! layer by the ephemeral↔recipient conversation key. Distinct input
//! keying material yields independent key and nonce pairs, so the same
//! salt never produces the same keystream twice. `WrapSalt` is not
//! clonable, which keeps one salt from serving two invocations.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::conversation::ConversationKey;
use crate::error::CryptoError;

/// Payload format version emitted and accepted by this crate.
pub const PAYLOAD_VERSION: u8 = 1;

/// Byte length of the per-invocation salt.
pub const SALT_SIZE: usize = 32;

/// Largest plaintext a single payload can carry.
pub const MAX_PLAINTEXT_SIZE: usize = 65_535;

/// AEAD authentication tag length.
const TAG_SIZE: usize = 16;

/// Smallest padded plaintext block.
const MIN_PADDED_SIZE: usize = 32;

/// Info label for per-payload key material.
const PAYLOAD_INFO: &[u8] = b"veilwrap-payload-v1";

/// 32-byte cipher key plus 24-byte extended nonce.
const MATERIAL_SIZE: usize = 56;

/// Per-invocation salt binding the two layers of one wrap.
///
/// Draw fresh random bytes for every wrap invocation. The type is neither
/// `Clone` nor `Copy`; it lives for exactly one seal-and-wrap sequence.
pub struct WrapSalt([u8; SALT_SIZE]);

impl WrapSalt {
    /// Wraps 32 fresh random bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw salt bytes. The salt travels in the clear inside the payload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for WrapSalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("WrapSalt").field(&hex::encode(self.0)).finish()
    }
}

/// Seals `plaintext` into a string suitable for a record's content field.
///
/// # Errors
///
/// Returns [`CryptoError::MessageTooLong`] if `plaintext` exceeds
/// [`MAX_PLAINTEXT_SIZE`].
pub fn seal(
    key: &ConversationKey,
    salt: &WrapSalt,
    plaintext: &[u8],
) -> Result<String, CryptoError> {
    let mut padded = pad(plaintext)?;
    let (mut cipher_key, nonce) = payload_material(key, salt.as_bytes());
    let cipher = XChaCha20Poly1305::new((&cipher_key).into());
    cipher_key.zeroize();

    let encrypted = cipher.encrypt(XNonce::from_slice(&nonce), padded.as_slice());
    padded.zeroize();
    let Ok(ciphertext) = encrypted else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut raw = Vec::with_capacity(1 + SALT_SIZE + ciphertext.len());
    raw.push(PAYLOAD_VERSION);
    raw.extend_from_slice(salt.as_bytes());
    raw.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(raw))
}

/// Opens a sealed payload.
///
/// # Errors
///
/// Returns [`CryptoError::Decryption`] for every failure mode: bad
/// encoding, unknown version, truncation, failed authentication, bad
/// padding. Callers cannot tell tampering apart from a wrong key.
pub fn open(key: &ConversationKey, payload: &str) -> Result<Vec<u8>, CryptoError> {
    let raw = BASE64.decode(payload).map_err(|_| CryptoError::Decryption)?;
    if raw.len() < 1 + SALT_SIZE + 2 + MIN_PADDED_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption);
    }
    if raw[0] != PAYLOAD_VERSION {
        return Err(CryptoError::Decryption);
    }

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&raw[1..1 + SALT_SIZE]);
    let (mut cipher_key, nonce) = payload_material(key, &salt);
    let cipher = XChaCha20Poly1305::new((&cipher_key).into());
    cipher_key.zeroize();

    let mut padded = cipher
        .decrypt(XNonce::from_slice(&nonce), &raw[1 + SALT_SIZE..])
        .map_err(|_| CryptoError::Decryption)?;
    let plaintext = unpad(&padded);
    padded.zeroize();
    plaintext
}

/// Derives the cipher key and nonce for one payload.
fn payload_material(key: &ConversationKey, salt: &[u8; SALT_SIZE]) -> ([u8; 32], [u8; 24]) {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), key.as_bytes());
    let mut okm = [0u8; MATERIAL_SIZE];
    let Ok(()) = hkdf.expand(PAYLOAD_INFO, &mut okm) else {
        unreachable!("56 bytes is a valid HKDF-SHA256 output length");
    };

    let mut cipher_key = [0u8; 32];
    cipher_key.copy_from_slice(&okm[..32]);
    let mut nonce = [0u8; 24];
    nonce.copy_from_slice(&okm[32..]);
    okm.zeroize();
    (cipher_key, nonce)
}

/// Padded body length for `len` plaintext bytes: 32 for short inputs,
/// then chunks of `max(32, next_power_of_two / 8)` toward the next power
/// of two.
fn padded_len(len: usize) -> usize {
    if len <= MIN_PADDED_SIZE {
        return MIN_PADDED_SIZE;
    }
    let next_power = len.next_power_of_two();
    let chunk = if next_power <= 256 { MIN_PADDED_SIZE } else { next_power / 8 };
    chunk * ((len - 1) / chunk + 1)
}

/// Length-prefixes and zero-pads `plaintext`.
fn pad(plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if plaintext.len() > MAX_PLAINTEXT_SIZE {
        return Err(CryptoError::MessageTooLong {
            len: plaintext.len(),
            max: MAX_PLAINTEXT_SIZE,
        });
    }
    let mut padded = vec![0u8; 2 + padded_len(plaintext.len())];
    padded[..2].copy_from_slice(&(plaintext.len() as u16).to_be_bytes());
    padded[2..2 + plaintext.len()].copy_from_slice(plaintext);
    Ok(padded)
}

/// Recovers the plaintext from a padded block.
fn unpad(padded: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if padded.len() < 2 {
        return Err(CryptoError::Decryption);
    }
    let len = usize::from(u16::from_be_bytes([padded[0], padded[1]]));
    if padded.len() != 2 + padded_len(len) || 2 + len > padded.len() {
        return Err(CryptoError::Decryption);
    }
    Ok(padded[2..2 + len].to_vec())
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;

    use super::*;
    use crate::keys::SecretKey;

    fn conversation(a: u8, b: u8) -> ConversationKey {
        let secret = SecretKey::from_bytes(&[a; 32]);
        let peer = SecretKey::from_bytes(&[b; 32]).public_key();
        ConversationKey::derive(&secret, &peer).unwrap()
    }

    fn salt(byte: u8) -> WrapSalt {
        WrapSalt::from_bytes([byte; SALT_SIZE])
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = conversation(1, 2);
        for plaintext in [&b""[..], b"x", b"hello world", &[0xAB; 31], &[0xCD; 32], &[0xEF; 33]] {
            let sealed = seal(&key, &salt(9), plaintext).unwrap();
            assert_eq!(open(&key, &sealed).unwrap(), plaintext);
        }
    }

    #[test]
    fn roundtrip_large_payload() {
        let key = conversation(1, 2);
        let plaintext = vec![0x5A; 40_000];
        let sealed = seal(&key, &salt(1), &plaintext).unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), plaintext);
    }

    #[test]
    fn oversized_plaintext_is_rejected() {
        let key = conversation(1, 2);
        let big = vec![0u8; MAX_PLAINTEXT_SIZE + 1];
        let err = seal(&key, &salt(1), &big).unwrap_err();
        assert_eq!(err, CryptoError::MessageTooLong { len: 65_536, max: 65_535 });
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = seal(&conversation(1, 2), &salt(1), b"secret").unwrap();
        assert_eq!(open(&conversation(1, 3), &sealed), Err(CryptoError::Decryption));
    }

    #[test]
    fn tampered_payload_fails_to_open() {
        let key = conversation(1, 2);
        let sealed = seal(&key, &salt(1), b"secret").unwrap();

        let mut raw = BASE64.decode(&sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = BASE64.encode(raw);
        assert_eq!(open(&key, &tampered), Err(CryptoError::Decryption));
    }

    #[test]
    fn tampered_salt_fails_to_open() {
        let key = conversation(1, 2);
        let sealed = seal(&key, &salt(1), b"secret").unwrap();

        let mut raw = BASE64.decode(&sealed).unwrap();
        raw[5] ^= 0x01;
        let tampered = BASE64.encode(raw);
        assert_eq!(open(&key, &tampered), Err(CryptoError::Decryption));
    }

    #[test]
    fn unknown_version_fails_to_open() {
        let key = conversation(1, 2);
        let sealed = seal(&key, &salt(1), b"secret").unwrap();

        let mut raw = BASE64.decode(&sealed).unwrap();
        raw[0] = 2;
        let reversioned = BASE64.encode(raw);
        assert_eq!(open(&key, &reversioned), Err(CryptoError::Decryption));
    }

    #[test]
    fn truncated_payload_fails_to_open() {
        let key = conversation(1, 2);
        let sealed = seal(&key, &salt(1), b"secret").unwrap();

        let raw = BASE64.decode(&sealed).unwrap();
        let truncated = BASE64.encode(&raw[..raw.len() / 2]);
        assert_eq!(open(&key, &truncated), Err(CryptoError::Decryption));
    }

    #[test]
    fn garbage_input_fails_to_open() {
        let key = conversation(1, 2);
        assert_eq!(open(&key, "not base64 at all!"), Err(CryptoError::Decryption));
        assert_eq!(open(&key, ""), Err(CryptoError::Decryption));
        assert_eq!(open(&key, &BASE64.encode([PAYLOAD_VERSION])), Err(CryptoError::Decryption));
    }

    #[test]
    fn padding_hides_exact_length() {
        let key = conversation(1, 2);
        let short = seal(&key, &salt(1), &[0x11; 33]).unwrap();
        let long = seal(&key, &salt(1), &[0x22; 60]).unwrap();
        assert_eq!(short.len(), long.len());
    }

    #[test]
    fn distinct_salts_produce_distinct_ciphertexts() {
        let key = conversation(1, 2);
        let first = seal(&key, &salt(1), b"same message").unwrap();
        let second = seal(&key, &salt(2), b"same message").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn same_salt_under_distinct_keys_is_independent() {
        // Both layers of one wrap reuse the salt; the keys must carry the
        // separation.
        let shared_salt_a = salt(7);
        let shared_salt_b = salt(7);
        let first = seal(&conversation(1, 2), &shared_salt_a, b"same message").unwrap();
        let second = seal(&conversation(3, 2), &shared_salt_b, b"same message").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn padded_len_buckets() {
        assert_eq!(padded_len(0), 32);
        assert_eq!(padded_len(1), 32);
        assert_eq!(padded_len(32), 32);
        assert_eq!(padded_len(33), 64);
        assert_eq!(padded_len(64), 64);
        assert_eq!(padded_len(65), 96);
        assert_eq!(padded_len(100), 128);
        assert_eq!(padded_len(256), 256);
        assert_eq!(padded_len(257), 320);
        assert_eq!(padded_len(320), 320);
        assert_eq!(padded_len(321), 384);
        assert_eq!(padded_len(65_535), 65_536);
    }

    #[test]
    fn unpad_rejects_inconsistent_length_prefix() {
        let mut padded = vec![0u8; 2 + 32];
        padded[0] = 0xFF;
        padded[1] = 0xFF;
        assert_eq!(unpad(&padded), Err(CryptoError::Decryption));
    }
}
