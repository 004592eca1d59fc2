//! Proof retention window.
//!
//! Assembled proofs are kept for `PROOF_EXPIRE_MINUTES` after creation and
//! may be discarded afterwards.

use cal_core::{CalendarConfig, Timestamp};

/// How long proofs are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofRetention {
    minutes: u32,
}

impl ProofRetention {
    pub fn new(minutes: u32) -> Self {
        Self { minutes }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::new(config.proof_expire_minutes)
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// The instant a proof created at `created` expires.
    pub fn expires_at(&self, created: Timestamp) -> Timestamp {
        created.plus_minutes(i64::from(self.minutes))
    }

    /// True once `now` has reached the expiry instant.
    pub fn is_expired(&self, created: Timestamp, now: Timestamp) -> bool {
        now >= self.expires_at(created)
    }
}
