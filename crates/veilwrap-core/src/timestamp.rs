//! Timestamp policy for envelope layers.
//!
//! Outer layers never carry the real send time. Seals and gift wraps each
//! get an independent uniform draw from a past window; only the chat
//! message keeps the honest timestamp, and that record is readable by
//! addressed participants alone.

use rand::{CryptoRng, Rng};

/// Width of the past window outer-layer timestamps are drawn from, in
/// seconds (48 hours).
pub const TIMESTAMP_JITTER_WINDOW_SECS: u64 = 48 * 60 * 60;

/// Draws a timestamp uniformly from `[now - window, now]`.
pub fn jittered_timestamp<R: Rng + CryptoRng>(now: u64, rng: &mut R) -> u64 {
    rng.gen_range(now.saturating_sub(TIMESTAMP_JITTER_WINDOW_SECS)..=now)
}

/// Current wall-clock time in unix seconds.
#[allow(clippy::expect_used)]
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("invariant: system clock is after Unix epoch (1970-01-01)")
        .as_secs()
}
