//! # Node Configuration
//!
//! `CalendarConfig` is built once at process start and passed by reference
//! to whatever needs it. Every value is validated here; malformed input
//! fails fast instead of silently falling back to a default.
//!
//! Variables:
//!
//! - `CALENDAR_TABLE_NAME` (default: `calendar`): ledger table / file stem.
//! - `CALENDAR_PUBLIC_URI` (default: `http://127.0.0.1`): public URI of this node.
//! - `CALENDAR_STACK_ID` (default: host of the public URI): `stackId` stamped on blocks.
//! - `PROOF_EXPIRE_MINUTES` (default: 1440): proof retention window.
//! - `POST_HASHES_MAX` (default: 1000): candidates per batch append.
//! - `POST_VERIFY_PROOFS_MAX` (default: 1000): proofs per batch resolve.
//! - `GET_PROOFS_MAX_REST` (default: 250): blocks per range read.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{1,63}$").expect("static regex"));

/// Upper bounds on batch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    /// Maximum candidate blocks accepted in one batch append.
    pub post_hashes_max: usize,
    /// Maximum proofs resolved in one batch.
    pub post_verify_proofs_max: usize,
    /// Maximum blocks returned by one range read.
    pub get_proofs_max: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            post_hashes_max: 1000,
            post_verify_proofs_max: 1000,
            get_proofs_max: 250,
        }
    }
}

/// Configuration for a calendar node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Name of the ledger table (file stem for file-backed stores).
    pub table_name: String,
    /// Public URI of this node.
    pub public_uri: Url,
    /// Identifier stamped into the `stackId` of every block this node produces.
    pub stack_id: String,
    /// How long assembled proofs are retained, in minutes.
    pub proof_expire_minutes: u32,
    /// Batch submission limits.
    pub limits: SubmissionLimits,
}

impl CalendarConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = lookup("CALENDAR_TABLE_NAME").unwrap_or_else(|| "calendar".to_string());
        if !TABLE_NAME_RE.is_match(&table_name) {
            return Err(ConfigError::Invalid {
                var: "CALENDAR_TABLE_NAME",
                reason: format!("{table_name:?} must match [A-Za-z0-9_]{{1,63}}"),
            });
        }

        let raw_uri = lookup("CALENDAR_PUBLIC_URI").unwrap_or_else(|| "http://127.0.0.1".to_string());
        let public_uri = Url::parse(&raw_uri).map_err(|e| ConfigError::Invalid {
            var: "CALENDAR_PUBLIC_URI",
            reason: format!("{raw_uri:?} is not a valid URL: {e}"),
        })?;
        if !matches!(public_uri.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var: "CALENDAR_PUBLIC_URI",
                reason: format!("scheme must be http or https, got {}", public_uri.scheme()),
            });
        }

        let stack_id = match lookup("CALENDAR_STACK_ID") {
            Some(id) if id.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    var: "CALENDAR_STACK_ID",
                    reason: "must not be empty".to_string(),
                })
            }
            Some(id) => id,
            None => public_uri
                .host_str()
                .map(str::to_string)
                .ok_or(ConfigError::Invalid {
                    var: "CALENDAR_PUBLIC_URI",
                    reason: "has no host to derive a stack id from".to_string(),
                })?,
        };

        let proof_expire_minutes = positive(&lookup, "PROOF_EXPIRE_MINUTES", 1440)?;
        let limits = SubmissionLimits {
            post_hashes_max: positive(&lookup, "POST_HASHES_MAX", 1000)? as usize,
            post_verify_proofs_max: positive(&lookup, "POST_VERIFY_PROOFS_MAX", 1000)? as usize,
            get_proofs_max: positive(&lookup, "GET_PROOFS_MAX_REST", 250)? as usize,
        };

        Ok(Self {
            table_name,
            public_uri,
            stack_id,
            proof_expire_minutes,
            limits,
        })
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u32,
) -> Result<u32, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: format!("{raw:?} is not a positive integer: {e}"),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is present but malformed.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// The environment variable name.
        var: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}
