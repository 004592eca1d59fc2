//! # Anchor Completeness
//!
//! Which anchor types a proof has accumulated. A proof is a tree:
//!
//! ```json
//! {
//!   "branches": [
//!     {
//!       "ops": [ ... ],
//!       "branches": [
//!         { "ops": [ { "anchors": [ { "type": "btc-a" } ] } ] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every proof carries the calendar anchor implicitly, so the result always
//! starts with `cal`. After that come the anchor types found on the
//! sub-branches of each top-level branch, in document order: for each
//! sub-branch, the anchors attached to its ops in op order, then any
//! anchors attached to the sub-branch itself. Anchors at any other depth
//! are not collected. Duplicates are kept.
//!
//! Every branch level is shape-checked, collected or not. A proof that
//! does not have this shape is rejected with a [`MalformedProofError`]
//! carrying the JSON path of the first bad node.
//! There is no partial result: trust decisions are made on this list.

use cal_core::{AnchorType, MalformedProofError};
use serde_json::{Map, Value};

/// Depth of the branches whose anchors are collected; the root's
/// `branches` are depth 1.
const COLLECT_DEPTH: usize = 2;

/// Resolve the ordered anchor types of `proof`, starting with `cal`.
pub fn resolve(proof: &Value) -> Result<Vec<AnchorType>, MalformedProofError> {
    let root = proof
        .as_object()
        .ok_or_else(|| MalformedProofError::new("$", "proof must be a JSON object"))?;
    let branches = required_array(root, "branches", "$")?;

    let mut found = vec![AnchorType::Cal];
    for (i, branch) in branches.iter().enumerate() {
        walk_branch(branch, &format!("$.branches[{i}]"), 1, &mut found)?;
    }

    tracing::trace!(anchors = found.len(), "resolved proof anchors");
    Ok(found)
}

/// Shape-check `value` and every branch below it. Anchors on branches at
/// [`COLLECT_DEPTH`] go into `found`; anchors elsewhere are checked and
/// dropped.
fn walk_branch(
    value: &Value,
    path: &str,
    depth: usize,
    found: &mut Vec<AnchorType>,
) -> Result<(), MalformedProofError> {
    let (branch, ops) = branch_parts(value, path)?;

    let mut dropped = Vec::new();
    let out = if depth == COLLECT_DEPTH {
        &mut *found
    } else {
        &mut dropped
    };
    for (k, op) in ops.iter().enumerate() {
        if let Some(op) = op.as_object() {
            collect_anchors(op, &format!("{path}.ops[{k}]"), out)?;
        }
    }
    collect_anchors(branch, path, out)?;

    if let Some(subs) = optional_array(branch, "branches", path)? {
        for (j, sub) in subs.iter().enumerate() {
            walk_branch(sub, &format!("{path}.branches[{j}]"), depth + 1, found)?;
        }
    }
    Ok(())
}

/// [`resolve`], rendered as the wire tag strings.
pub fn resolve_strings(proof: &Value) -> Result<Vec<&'static str>, MalformedProofError> {
    Ok(resolve(proof)?.into_iter().map(|a| a.as_str()).collect())
}

fn branch_parts<'a>(
    value: &'a Value,
    path: &str,
) -> Result<(&'a Map<String, Value>, &'a Vec<Value>), MalformedProofError> {
    let obj = value
        .as_object()
        .ok_or_else(|| MalformedProofError::new(path, "branch must be an object"))?;
    let ops = required_array(obj, "ops", path)?;
    Ok((obj, ops))
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, MalformedProofError> {
    match obj.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(MalformedProofError::new(
            format!("{path}.{key}"),
            "must be an array",
        )),
        None => Err(MalformedProofError::new(
            format!("{path}.{key}"),
            "is required",
        )),
    }
}

fn optional_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Vec<Value>>, MalformedProofError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(MalformedProofError::new(
            format!("{path}.{key}"),
            "must be an array",
        )),
    }
}

fn collect_anchors(
    obj: &Map<String, Value>,
    path: &str,
    out: &mut Vec<AnchorType>,
) -> Result<(), MalformedProofError> {
    let Some(anchors) = optional_array(obj, "anchors", path)? else {
        return Ok(());
    };
    for (i, anchor) in anchors.iter().enumerate() {
        let anchor_path = format!("{path}.anchors[{i}]");
        let tag = anchor
            .as_object()
            .ok_or_else(|| MalformedProofError::new(&anchor_path, "anchor must be an object"))?
            .get("type")
            .ok_or_else(|| MalformedProofError::new(format!("{anchor_path}.type"), "is required"))?
            .as_str()
            .ok_or_else(|| {
                MalformedProofError::new(format!("{anchor_path}.type"), "must be a string")
            })?;
        let anchor_type = tag.parse::<AnchorType>().map_err(|_| {
            MalformedProofError::new(
                format!("{anchor_path}.type"),
                format!("unknown anchor type {tag:?}"),
            )
        })?;
        out.push(anchor_type);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_nested_anchors_is_cal_only() {
        let proof = json!({ "branches": [ { "ops": [ { "l": "ab" }, { "op": "sha-256" } ] } ] });
        assert_eq!(resolve_strings(&proof).unwrap(), vec!["cal"]);
    }

    #[test]
    fn empty_branch_list_is_cal_only() {
        assert_eq!(resolve_strings(&json!({ "branches": [] })).unwrap(), vec!["cal"]);
    }

    #[test]
    fn anchors_in_sub_branch_ops() {
        let proof = json!({
            "branches": [{
                "ops": [],
                "branches": [
                    { "ops": [ { "op": "sha-256" }, { "anchors": [ { "type": "btc-a", "anchor_id": "1" } ] } ] },
                    { "ops": [ { "anchors": [ { "type": "eth-a" } ] } ] }
                ]
            }]
        });
        assert_eq!(resolve_strings(&proof).unwrap(), vec!["cal", "btc-a", "eth-a"]);
    }

    #[test]
    fn branch_level_anchors_follow_op_anchors() {
        let proof = json!({
            "branches": [{
                "ops": [],
                "branches": [{
                    "ops": [ { "anchors": [ { "type": "btc-a" } ] } ],
                    "anchors": [ { "type": "nist" } ]
                }]
            }]
        });
        assert_eq!(resolve_strings(&proof).unwrap(), vec!["cal", "btc-a", "nist"]);
    }

    #[test]
    fn duplicates_preserved() {
        let proof = json!({
            "branches": [
                { "ops": [], "branches": [ { "ops": [ { "anchors": [ { "type": "btc-a" } ] } ] } ] },
                { "ops": [], "branches": [ { "ops": [ { "anchors": [ { "type": "btc-a" } ] } ] } ] }
            ]
        });
        assert_eq!(resolve_strings(&proof).unwrap(), vec!["cal", "btc-a", "btc-a"]);
    }

    #[test]
    fn top_level_and_deeper_anchors_not_collected() {
        let proof = json!({
            "branches": [{
                "ops": [ { "anchors": [ { "type": "cal" } ] } ],
                "anchors": [ { "type": "nist" } ],
                "branches": [{
                    "ops": [],
                    "branches": [
                        { "ops": [ { "anchors": [ { "type": "eth-a" } ] } ] }
                    ]
                }]
            }]
        });
        assert_eq!(resolve_strings(&proof).unwrap(), vec!["cal"]);
    }

    #[test]
    fn missing_branches_is_malformed() {
        let err = resolve(&json!({ "ops": [] })).unwrap_err();
        assert_eq!(err.path, "$.branches");
    }

    #[test]
    fn non_object_root_is_malformed() {
        assert_eq!(resolve(&json!([1])).unwrap_err().path, "$");
        assert_eq!(resolve(&json!(null)).unwrap_err().path, "$");
    }

    #[test]
    fn branch_without_ops_is_malformed() {
        let err = resolve(&json!({ "branches": [ {} ] })).unwrap_err();
        assert_eq!(err.path, "$.branches[0].ops");
    }

    #[test]
    fn sub_branch_shape_checked() {
        let err = resolve(&json!({ "branches": [ { "ops": [], "branches": {} } ] })).unwrap_err();
        assert_eq!(err.path, "$.branches[0].branches");

        let err = resolve(&json!({ "branches": [ { "ops": [], "branches": [ { "ops": 5 } ] } ] }))
            .unwrap_err();
        assert_eq!(err.path, "$.branches[0].branches[0].ops");
    }

    #[test]
    fn branches_below_depth_two_are_shape_checked() {
        let proof = json!({
            "branches": [{
                "ops": [],
                "branches": [{ "ops": [], "branches": [ { "nope": 1 }, 42 ] }]
            }]
        });
        let err = resolve(&proof).unwrap_err();
        assert_eq!(err.path, "$.branches[0].branches[0].branches[0].ops");

        let proof = json!({
            "branches": [{
                "ops": [],
                "branches": [{
                    "ops": [],
                    "branches": [ { "ops": [ { "anchors": [ "btc-a" ] } ] } ]
                }]
            }]
        });
        let err = resolve(&proof).unwrap_err();
        assert_eq!(err.path, "$.branches[0].branches[0].branches[0].ops[0].anchors[0]");
    }

    #[test]
    fn top_level_op_anchors_are_shape_checked() {
        let proof = json!({ "branches": [ { "ops": [ { "anchors": [ { "type": "reward" }, 7 ] } ] } ] });
        let err = resolve(&proof).unwrap_err();
        assert_eq!(err.path, "$.branches[0].ops[0].anchors[0].type");

        let proof = json!({ "branches": [ { "ops": [ { "anchors": [ { "type": "nist" }, 7 ] } ] } ] });
        let err = resolve(&proof).unwrap_err();
        assert_eq!(err.path, "$.branches[0].ops[0].anchors[1]");
    }

    #[test]
    fn bad_anchor_entries_are_malformed() {
        let wrap = |anchors: Value| {
            json!({ "branches": [ { "ops": [], "branches": [ { "ops": [ { "anchors": anchors } ] } ] } ] })
        };
        let base = "$.branches[0].branches[0].ops[0].anchors";
        assert_eq!(resolve(&wrap(json!("btc-a"))).unwrap_err().path, base);
        assert_eq!(resolve(&wrap(json!(["btc-a"]))).unwrap_err().path, format!("{base}[0]"));
        assert_eq!(resolve(&wrap(json!([{}]))).unwrap_err().path, format!("{base}[0].type"));
        assert_eq!(resolve(&wrap(json!([{ "type": 7 }]))).unwrap_err().path, format!("{base}[0].type"));
        assert_eq!(
            resolve(&wrap(json!([{ "type": "reward" }]))).unwrap_err().path,
            format!("{base}[0].type")
        );
    }
}
