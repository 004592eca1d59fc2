use cal_core::MalformedProofError;
use thiserror::Error;

/// Errors from proof operations.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The proof does not have the branch/ops/anchors shape.
    #[error(transparent)]
    Malformed(#[from] MalformedProofError),

    /// A batch is larger than `POST_VERIFY_PROOFS_MAX`.
    #[error("batch of {requested} proofs exceeds the limit of {limit}")]
    LimitExceeded {
        /// Number of proofs submitted.
        requested: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Proof text is not valid JSON.
    #[error("proof is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
