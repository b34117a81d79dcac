//! Veilwrap Envelope Pipeline
//!
//! Sender-side fan-out and receiver-side unwrapping for the three-layer
//! private-message envelope. The layers nest strictly:
//!
//! ```text
//! Chat Message (kind 14, unsigned, real timestamp)
//!        │  encrypted to one recipient, signed by the sender
//!        ▼
//! Seal (kind 13, no tags, jittered timestamp)
//!        │  encrypted to the same recipient, signed by a
//!        │  single-use ephemeral key
//!        ▼
//! Gift Wrap (kind 1059, one routing tag, jittered timestamp)
//! ```
//!
//! One send produces one gift wrap per recipient plus a self-copy for
//! the sender's own devices. Each wrap uses a fresh ephemeral key and a
//! fresh salt, so wraps from the same send are unlinkable on the wire.
//!
//! # Security
//!
//! Metadata resistance:
//! - Gift wraps are signed by throwaway keys; the sender never appears
//!   in the outer record
//! - Seal and wrap timestamps are independently drawn from the past
//!   two days; only the inner chat message keeps the honest time
//! - The seal carries no tags, so participant lists stay encrypted
//!
//! Authenticity:
//! - The seal is signed by the sender's long-term key and verified
//!   before its payload is trusted
//! - A seal whose signer differs from the chat message's claimed author
//!   is rejected as impersonation
//!
//! Failure discipline:
//! - Every ciphertext problem collapses to an opaque per-layer
//!   decryption error; callers learn which layer failed and nothing
//!   else

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod error;
pub mod gift_wrap;
pub mod rumor;
pub mod seal;
pub mod timestamp;
pub mod unwrap;

pub use builder::{
    EnvelopeBatch, EnvelopeRequest, Recipient, WrappedEnvelope, build_envelopes,
    build_envelopes_at,
};
pub use error::{EnvelopeError, Layer, Result};
pub use gift_wrap::wrap_seal;
pub use rumor::build_rumor;
pub use seal::seal_rumor;
pub use timestamp::{TIMESTAMP_JITTER_WINDOW_SECS, jittered_timestamp};
pub use unwrap::unwrap_envelope;
