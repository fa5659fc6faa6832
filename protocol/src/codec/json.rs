//! Canonical JSON codec.
//!
//! The JSON shape comes from the serde derives on [`Tx`] and its parts. This
//! module adds the two things derives alone do not give: error
//! classification (syntax vs. schema) and invariant checks on the parsed
//! value, so that anything accepted here re-encodes to valid canonical
//! binary.

use tracing::debug;

use super::JsonCodec;
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::transaction::Tx;

/// JSON codec backed by `serde_json`.
///
/// Parsed values are held to the same encoded-size limit as the binary
/// codec built from the same [`CodecConfig`].
#[derive(Debug, Clone, Copy)]
pub struct StandardJson {
    max_tx_bytes: usize,
}

impl StandardJson {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            max_tx_bytes: config.max_tx_bytes,
        }
    }
}

impl Default for StandardJson {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl JsonCodec for StandardJson {
    fn to_json(&self, tx: &Tx) -> Result<Vec<u8>> {
        serde_json::to_vec(tx).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn to_json_pretty(&self, tx: &Tx) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(tx).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn from_json(&self, bytes: &[u8]) -> Result<Tx> {
        let tx: Tx = serde_json::from_slice(bytes).map_err(CodecError::from_json_error)?;
        tx.validate_with_limit(self.max_tx_bytes)
            .map_err(|e| CodecError::SchemaMismatch(format!("{}: {}", e.field(), e)))?;
        debug!(len = bytes.len(), "parsed transaction JSON");
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::binary::encode_tx;
    use crate::transaction::{Any, Coin, SignMode, SignerInfo, TxBuilder};

    fn sample_tx() -> Tx {
        TxBuilder::new()
            .set_gas_limit(50_000)
            .set_fee_amount(vec![Coin::new("atom", 150)])
            .set_memo("foomemo")
            .build()
            .unwrap()
    }

    fn from_str(s: &str) -> Result<Tx> {
        StandardJson::default().from_json(s.as_bytes())
    }

    #[test]
    fn canonical_rendering() {
        let json = String::from_utf8(StandardJson::default().to_json(&sample_tx()).unwrap()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"body":{"messages":[],"memo":"foomemo","timeout_height":"0"},"#,
                r#""auth_info":{"signer_infos":[],"fee":{"amount":[{"denom":"atom","amount":"150"}],"#,
                r#""gas_limit":"50000","payer":"","granter":""}},"signatures":[]}"#
            )
        );
    }

    #[test]
    fn roundtrip_with_signers() {
        let tx = TxBuilder::new()
            .add_message(Any::new("/bank.MsgSend", vec![1, 2, 3, 4]))
            .set_signer_infos(vec![SignerInfo {
                public_key: Some(Any::new("/crypto.PubKey", vec![2; 33])),
                sign_mode: SignMode::Textual,
                sequence: 3,
            }])
            .set_fee_amount(vec![Coin::new("atom", 150)])
            .set_gas_limit(200_000)
            .set_signatures(vec![vec![0xAB; 64]])
            .build()
            .unwrap();
        let json = StandardJson::default().to_json(&tx).unwrap();
        let back = StandardJson::default().from_json(&json).unwrap();
        assert_eq!(back, tx);
        assert_eq!(encode_tx(&back), encode_tx(&tx));
    }

    #[test]
    fn pretty_output_parses_back() {
        let pretty = StandardJson::default().to_json_pretty(&sample_tx()).unwrap();
        assert!(pretty.contains(&b'\n'));
        assert_eq!(StandardJson::default().from_json(&pretty).unwrap(), sample_tx());
    }

    #[test]
    fn optional_fields_default() {
        let tx = from_str(
            r#"{"body":{},"auth_info":{"fee":{"amount":[],"gas_limit":"1"}},"signatures":[]}"#,
        )
        .unwrap();
        assert_eq!(tx.gas_limit(), 1);
        assert_eq!(tx.memo(), "");
    }

    #[test]
    fn syntax_error_is_malformed_json() {
        assert!(matches!(
            from_str(r#"{"body": {"#),
            Err(CodecError::MalformedJson(_))
        ));
        assert!(matches!(from_str(""), Err(CodecError::MalformedJson(_))));
        assert!(matches!(
            from_str("not json at all"),
            Err(CodecError::MalformedJson(_))
        ));
    }

    #[test]
    fn missing_fee_is_schema_mismatch() {
        let err = from_str(r#"{"body":{},"auth_info":{},"signatures":[]}"#).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
        assert!(err.to_string().contains("fee"));
    }

    #[test]
    fn missing_signatures_is_schema_mismatch() {
        let err = from_str(
            r#"{"body":{},"auth_info":{"fee":{"amount":[],"gas_limit":"1"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn negative_gas_is_schema_mismatch() {
        let err = from_str(
            r#"{"body":{},"auth_info":{"fee":{"amount":[],"gas_limit":"-5"}},"signatures":[]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
    }

    #[test]
    fn coin_list_shape_is_checked() {
        let not_a_list = r#"{"body":{},"auth_info":{"fee":{"amount":"150atom","gas_limit":"1"}},"signatures":[]}"#;
        assert!(matches!(
            from_str(not_a_list),
            Err(CodecError::SchemaMismatch(_))
        ));

        let bad_denom = r#"{"body":{},"auth_info":{"fee":{"amount":[{"denom":"a","amount":"1"}],"gas_limit":"1"}},"signatures":[]}"#;
        assert!(matches!(
            from_str(bad_denom),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn unsorted_coins_are_not_coerced() {
        let unsorted = r#"{"body":{},"auth_info":{"fee":{"amount":[{"denom":"stake","amount":"1"},{"denom":"atom","amount":"1"}],"gas_limit":"1"}},"signatures":[]}"#;
        let err = from_str(unsorted).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
        assert!(err.to_string().contains("not sorted"));
    }

    #[test]
    fn oversized_value_is_schema_mismatch() {
        let tx = TxBuilder::new()
            .set_gas_limit(1)
            .set_memo("foomemo")
            .build()
            .unwrap();
        let json = StandardJson::default().to_json(&tx).unwrap();

        let len = encode_tx(&tx).len();

        let tight = StandardJson::new(&CodecConfig::default().with_max_tx_bytes(len));
        assert_eq!(tight.from_json(&json).unwrap(), tx);

        let tighter = StandardJson::new(&CodecConfig::default().with_max_tx_bytes(len - 1));
        let err = tighter.from_json(&json).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch(_)));
        assert!(err.to_string().contains("tx: encoded transaction is"));
    }

    #[test]
    fn unknown_field_is_schema_mismatch() {
        let extra = r#"{"body":{"memo":"x","surprise":1},"auth_info":{"fee":{"amount":[],"gas_limit":"1"}},"signatures":[]}"#;
        assert!(matches!(from_str(extra), Err(CodecError::SchemaMismatch(_))));
    }
}
