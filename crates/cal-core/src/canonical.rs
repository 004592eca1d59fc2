//! # Canonical Serialization: Block Hash Preimages
//!
//! `CanonicalBytes` is the sole construction path for bytes that feed a
//! block digest. The inner buffer is private; the only constructor runs the
//! value through float rejection and then RFC 8785 (JCS) serialization.
//!
//! ## Why JCS for a field tuple
//!
//! A block hash covers `id, time, version, stackId, type, dataId, dataVal,
//! prevHash` in that fixed order. Serialized as a JSON array, every string
//! is quoted and escaped and every integer has exactly one rendering, so
//! `("ab", "c")` and `("a", "bc")` can never produce the same bytes. Plain
//! concatenation cannot give that guarantee.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Numbers are integers; floats are rejected.
/// - Object keys are sorted, separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(cb: &CanonicalBytes) -> &str {
        std::str::from_utf8(cb.as_bytes()).unwrap()
    }

    #[test]
    fn block_tuple_renders_as_compact_array() {
        let tuple = (3u64, 1_500_000_000i64, 1i64, "a.example.org", "cal", "", "ab:cd");
        let cb = CanonicalBytes::new(&tuple).unwrap();
        assert_eq!(
            text(&cb),
            r#"[3,1500000000,1,"a.example.org","cal","","ab:cd"]"#
        );
    }

    #[test]
    fn shifted_boundaries_do_not_collide() {
        let a = CanonicalBytes::new(&("ab", "c")).unwrap();
        let b = CanonicalBytes::new(&("a", "bc")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn integer_vs_string_distinct() {
        let a = CanonicalBytes::new(&(12u64, "3")).unwrap();
        let b = CanonicalBytes::new(&(1u64, "23")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn object_keys_sorted() {
        let data = serde_json::json!({"prevHash": "00", "id": 1});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"id":1,"prevHash":"00"}"#);
    }

    #[test]
    fn float_rejected() {
        let data = serde_json::json!([1, 2.5]);
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 2.5),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn negative_integers_accepted() {
        let cb = CanonicalBytes::new(&(-5i64,)).unwrap();
        assert_eq!(text(&cb), "[-5]");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 4);
    }
}
