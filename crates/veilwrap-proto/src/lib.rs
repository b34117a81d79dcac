//! Veilwrap Wire Records
//!
//! The record layer of the veilwrap envelope protocol. Every envelope
//! layer — chat message, seal, gift wrap — is one [`Event`] record shape
//! with a content-address id, an optional detached signature, and ordered
//! tags, serialized as compact JSON.
//!
//! ```text
//! Chat message (kind 14)   unsigned, plaintext content
//!        │ sealed into
//!        ▼
//! Seal (kind 13)           signed by the sender, no tags
//!        │ sealed into
//!        ▼
//! Gift wrap (kind 1059)    signed by an ephemeral key, one `p` tag
//! ```
//!
//! # Security
//!
//! - Unknown kinds fail decoding; a foreign record cannot pass as an
//!   envelope layer
//! - Size ceilings are enforced before parsing
//! - Verification recomputes the content address before checking the
//!   signature, so the id can never lie about the signed contents

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod event;
pub mod kind;
pub mod tag;

pub use errors::{EventError, Result};
pub use event::{Event, EventId, MAX_EVENT_SIZE};
pub use kind::Kind;
pub use tag::{REPLY_MARKER, TAG_PARTICIPANT, TAG_REFERENCE, TAG_SUBJECT, Tag};
