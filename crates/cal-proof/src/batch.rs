//! Batch anchor resolution, bounded by the configured batch limit.
//!
//! Each proof in a batch is resolved independently: one malformed proof
//! yields an error in its own slot without hiding the results of the
//! others. Only an oversized batch fails as a whole.

use cal_core::{AnchorType, MalformedProofError, SubmissionLimits};
use serde_json::Value;

use crate::anchors::resolve;
use crate::error::ProofError;

/// Outcome for one proof in a batch.
pub type ProofResolution = Result<Vec<AnchorType>, MalformedProofError>;

/// Resolve every proof in `proofs`, in order.
pub fn resolve_batch(
    proofs: &[Value],
    limits: &SubmissionLimits,
) -> Result<Vec<ProofResolution>, ProofError> {
    if proofs.len() > limits.post_verify_proofs_max {
        return Err(ProofError::LimitExceeded {
            requested: proofs.len(),
            limit: limits.post_verify_proofs_max,
        });
    }
    let results: Vec<ProofResolution> = proofs.iter().map(resolve).collect();
    let malformed = results.iter().filter(|r| r.is_err()).count();
    if malformed > 0 {
        tracing::warn!(total = proofs.len(), malformed, "batch contained malformed proofs");
    }
    Ok(results)
}

/// Parse proof JSON text and resolve it.
pub fn resolve_text(text: &str) -> Result<Vec<AnchorType>, ProofError> {
    let proof: Value = serde_json::from_str(text)?;
    Ok(resolve(&proof)?)
}
