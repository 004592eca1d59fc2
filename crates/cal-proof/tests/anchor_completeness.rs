//! Anchor completeness over realistic proof documents.

use cal_core::AnchorType;
use cal_proof::{resolve, resolve_strings, resolve_text};
use serde_json::json;

/// A proof as a calendar node hands it out right after aggregation, before
/// any external anchor has confirmed.
fn fresh_proof() -> serde_json::Value {
    json!({
        "@context": "https://w3id.org/chainpoint/v3",
        "type": "Chainpoint",
        "hash": "bdf8c9bdf076d6aff0292a1c9448691d2ae283f2ce41b045355e2c8cb8e85ef2",
        "branches": [{
            "label": "cal_anchor_branch",
            "ops": [
                { "l": "node_id:52b4b3d0-00bd-11e8-8ea6-01fc6a3bc6b0" },
                { "op": "sha-256" },
                { "r": "a1f2ac1e1e8b3f1f9c3fd9b5ac2c85d8ef3a3c83d0c7b5fb37a3a8dbf3cd1a42" },
                { "op": "sha-256" },
                { "anchors": [ { "type": "cal", "anchor_id": "985635", "uris": ["http://127.0.0.1/calendar/985635/hash"] } ] }
            ]
        }]
    })
}

fn anchored_proof() -> serde_json::Value {
    let mut proof = fresh_proof();
    proof["branches"][0]["branches"] = json!([
        {
            "label": "btc_anchor_branch",
            "ops": [
                { "l": "9f8e" },
                { "op": "sha-256-x2" },
                { "anchors": [ { "type": "btc-a", "anchor_id": "503519", "uris": [] } ] }
            ]
        },
        {
            "label": "eth_anchor_branch",
            "ops": [
                { "op": "sha-256" },
                { "anchors": [ { "type": "eth-a", "anchor_id": "5181722", "uris": [] } ] }
            ]
        }
    ]);
    proof
}

#[test]
fn calendar_only_proof() {
    assert_eq!(resolve_strings(&fresh_proof()).unwrap(), vec!["cal"]);
}

#[test]
fn btc_then_eth() {
    assert_eq!(
        resolve(&anchored_proof()).unwrap(),
        vec![AnchorType::Cal, AnchorType::BtcA, AnchorType::EthA]
    );
}

#[test]
fn missing_branches_never_defaults_to_cal() {
    let mut proof = fresh_proof();
    proof.as_object_mut().unwrap().remove("branches");
    let err = resolve(&proof).unwrap_err();
    assert_eq!(err.path, "$.branches");
}

#[test]
fn resolution_is_referentially_transparent() {
    let proof = anchored_proof();
    let first = resolve(&proof).unwrap();
    for _ in 0..10 {
        assert_eq!(resolve(&proof).unwrap(), first);
    }
}

#[test]
fn text_round_trip() {
    let text = serde_json::to_string(&anchored_proof()).unwrap();
    assert_eq!(resolve_text(&text).unwrap().len(), 3);
}
