//! Veilwrap Cryptographic Primitives
//!
//! Key handling, conversation-key derivation, and payload sealing for the
//! veilwrap envelope protocol. Pure functions with deterministic outputs;
//! callers provide random bytes, which keeps every operation reproducible
//! under test.
//!
//! # Key Flow
//!
//! One Ed25519 identity serves both signing and key agreement. Each sealed
//! payload gets its own cipher key and nonce:
//!
//! ```text
//! Ed25519 identity keys
//!        │ convert (scalar / Montgomery form)
//!        ▼
//! X25519 ECDH → Conversation Key (same in both directions)
//!        │
//!        ▼
//! HKDF(salt) → Payload Key + Nonce (per payload)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → base64(version ‖ salt ‖ ciphertext)
//! ```
//!
//! # Security
//!
//! Confidentiality and integrity:
//! - XChaCha20-Poly1305 AEAD; any tampering fails authentication
//! - Per-payload keys derived under a protocol label, never raw ECDH output
//! - Padded plaintext, so ciphertext length reveals only a size bucket
//!
//! Failure behavior:
//! - Every open failure collapses into one opaque decryption error;
//!   tampering and a wrong key are indistinguishable
//! - Small-order peer keys are rejected during derivation
//!
//! Hygiene:
//! - Secret keys, conversation keys, and derived material zeroize on drop
//! - `Debug` output of secret-bearing types is redacted

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod conversation;
pub mod error;
pub mod keys;
pub mod payload;

pub use conversation::ConversationKey;
pub use error::CryptoError;
pub use keys::{EphemeralKeypair, KEY_SIZE, PublicKey, SIGNATURE_SIZE, SecretKey, Signature};
pub use payload::{MAX_PLAINTEXT_SIZE, PAYLOAD_VERSION, SALT_SIZE, WrapSalt, open, seal};
