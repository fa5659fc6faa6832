//! Display-only legacy rendering.
//!
//! Older wallets and signers expect the "StdTx" shape: sorted keys, a flat
//! `fee.gas` string, messages under `msg`, and signatures paired with their
//! public keys. This rendering is for humans and legacy tooling only. It is
//! never parsed back and plays no part in canonical round trips.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use super::DisplayEncoder;
use crate::error::{CodecError, Result};
use crate::transaction::{Any, Tx};

/// Type tag emitted at the top of the legacy rendering.
pub const LEGACY_TX_TYPE: &str = "txwire/StdTx";

/// Sorted-key legacy JSON renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyJsonDisplay;

impl DisplayEncoder for LegacyJsonDisplay {
    fn render(&self, tx: &Tx) -> Result<String> {
        serde_json::to_string_pretty(&legacy_value(tx))
            .map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

fn any_value(any: &Any) -> Value {
    json!({
        "type": any.type_url,
        "value": STANDARD.encode(&any.value),
    })
}

fn legacy_value(tx: &Tx) -> Value {
    let fee = &tx.auth_info.fee;
    let amount: Vec<Value> = fee
        .amount
        .iter()
        .map(|c| json!({ "amount": c.amount.to_string(), "denom": c.denom }))
        .collect();

    let msgs: Vec<Value> = tx.body.messages.iter().map(any_value).collect();

    let signatures: Vec<Value> = tx
        .signatures
        .iter()
        .enumerate()
        .map(|(i, sig)| {
            let signer = tx.auth_info.signer_infos.get(i);
            json!({
                "pub_key": signer.and_then(|s| s.public_key.as_ref()).map(any_value),
                "sequence": signer.map(|s| s.sequence.to_string()),
                "signature": STANDARD.encode(sig),
            })
        })
        .collect();

    // serde_json's default map is ordered by key, which gives the sorted
    // output legacy signers hash over.
    json!({
        "type": LEGACY_TX_TYPE,
        "value": {
            "fee": {
                "amount": amount,
                "gas": fee.gas_limit.to_string(),
                "granter": fee.granter,
                "payer": fee.payer,
            },
            "memo": tx.body.memo,
            "msg": msgs,
            "signatures": signatures,
            "timeout_height": tx.body.timeout_height.to_string(),
        }
    })
}
