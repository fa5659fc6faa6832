//! Transaction value and its builder.
//!
//! The [`TxBuilder`] enforces a disciplined construction flow: set the
//! fields, call `.build()`, and get back a [`Tx`] that satisfies every
//! invariant in [`super::validation`] or a construction error saying which
//! one it broke.
//!
//! The builder does not sign. Signatures arrive as opaque bytes produced by
//! whoever holds the keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::serde_fmt::{base64_list, decimal};
use super::types::{Any, Coin, Coins, Fee, SignerInfo};
use super::validation::{validate_tx, validate_tx_with_limit, ValidationError};
use crate::codec::binary::encode_tx;
use crate::config::MAX_TX_SIZE_BYTES;
use crate::error::{CodecError, Result};

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A transaction: what to do, who pays, and the signatures over it.
///
/// Field order here is the JSON field order. The binary layout is defined
/// separately in [`crate::codec::binary`] and does not depend on serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    /// One signature per signer info, in the same order. Base64 in JSON.
    #[serde(with = "base64_list")]
    pub signatures: Vec<Vec<u8>>,
}

/// The part of a transaction that describes what it does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxBody {
    /// Opaque messages, executed in order.
    #[serde(default)]
    pub messages: Vec<Any>,
    /// Free-text note attached by the sender.
    #[serde(default)]
    pub memo: String,
    /// Block height after which the transaction is invalid. 0 disables it.
    #[serde(default, with = "decimal")]
    pub timeout_height: u64,
}

/// Signer metadata and fee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthInfo {
    #[serde(default)]
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

impl Tx {
    /// Checks every structural invariant.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_tx(self)
    }

    /// Like [`Tx::validate`], with a caller-chosen bound on the encoded size.
    pub fn validate_with_limit(
        &self,
        max_tx_bytes: usize,
    ) -> std::result::Result<(), ValidationError> {
        validate_tx_with_limit(self, max_tx_bytes)
    }

    /// Upper-case hex SHA-256 of the canonical binary form.
    ///
    /// Stable across JSON round trips, because the binary form is.
    pub fn hash(&self) -> String {
        let digest = Sha256::digest(encode_tx(self));
        hex::encode_upper(digest)
    }

    /// Returns `true` if at least one signature is attached.
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    pub fn memo(&self) -> &str {
        &self.body.memo
    }

    pub fn gas_limit(&self) -> u64 {
        self.auth_info.fee.gas_limit
    }

    pub fn fee_amount(&self) -> &Coins {
        &self.auth_info.fee.amount
    }
}

// ---------------------------------------------------------------------------
// TxBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Tx`] values.
///
/// # Usage
///
/// ```
/// use txwire_protocol::transaction::{TxBuilder, Coin};
///
/// let tx = TxBuilder::new()
///     .set_gas_limit(50_000)
///     .set_fee_amount(vec![Coin::new("atom", 150)])
///     .set_memo("foomemo")
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.gas_limit(), 50_000);
/// assert_eq!(tx.fee_amount().to_string(), "150atom");
/// ```
///
/// Fee coins are sorted by denom on `build()`; duplicates, zero amounts, and
/// malformed denoms are rejected.
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    messages: Vec<Any>,
    memo: String,
    timeout_height: u64,
    signer_infos: Vec<SignerInfo>,
    fee_amount: Vec<Coin>,
    gas_limit: u64,
    payer: String,
    granter: String,
    signatures: Vec<Vec<u8>>,
    max_tx_bytes: Option<usize>,
}

impl TxBuilder {
    /// Creates an empty builder: no messages, no fee, zero gas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing transaction, e.g. to attach signatures to a
    /// decoded one.
    pub fn from_tx(tx: Tx) -> Self {
        Self {
            messages: tx.body.messages,
            memo: tx.body.memo,
            timeout_height: tx.body.timeout_height,
            signer_infos: tx.auth_info.signer_infos,
            fee_amount: tx.auth_info.fee.amount.as_slice().to_vec(),
            gas_limit: tx.auth_info.fee.gas_limit,
            payer: tx.auth_info.fee.payer,
            granter: tx.auth_info.fee.granter,
            signatures: tx.signatures,
            max_tx_bytes: None,
        }
    }

    /// Bounds the encoded size checked by `build()`. Without it the default
    /// [`MAX_TX_SIZE_BYTES`] applies.
    pub fn with_max_tx_bytes(mut self, max_tx_bytes: usize) -> Self {
        self.max_tx_bytes = Some(max_tx_bytes);
        self
    }

    pub fn set_messages(mut self, messages: Vec<Any>) -> Self {
        self.messages = messages;
        self
    }

    pub fn add_message(mut self, message: Any) -> Self {
        self.messages.push(message);
        self
    }

    pub fn set_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn set_timeout_height(mut self, height: u64) -> Self {
        self.timeout_height = height;
        self
    }

    pub fn set_signer_infos(mut self, signer_infos: Vec<SignerInfo>) -> Self {
        self.signer_infos = signer_infos;
        self
    }

    pub fn set_fee_amount(mut self, coins: Vec<Coin>) -> Self {
        self.fee_amount = coins;
        self
    }

    pub fn set_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn set_fee_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = payer.into();
        self
    }

    pub fn set_fee_granter(mut self, granter: impl Into<String>) -> Self {
        self.granter = granter.into();
        self
    }

    /// Replaces all signatures. Order must match the signer infos.
    pub fn set_signatures(mut self, signatures: Vec<Vec<u8>>) -> Self {
        self.signatures = signatures;
        self
    }

    /// Consumes the builder and produces a validated [`Tx`].
    ///
    /// # Errors
    ///
    /// [`CodecError::Construction`] naming the violated invariant.
    pub fn build(self) -> Result<Tx> {
        let amount = Coins::new(self.fee_amount).map_err(construction)?;

        let tx = Tx {
            body: TxBody {
                messages: self.messages,
                memo: self.memo,
                timeout_height: self.timeout_height,
            },
            auth_info: AuthInfo {
                signer_infos: self.signer_infos,
                fee: Fee {
                    amount,
                    gas_limit: self.gas_limit,
                    payer: self.payer,
                    granter: self.granter,
                },
            },
            signatures: self.signatures,
        };

        tx.validate_with_limit(self.max_tx_bytes.unwrap_or(MAX_TX_SIZE_BYTES))
            .map_err(construction)?;
        Ok(tx)
    }
}

fn construction(err: ValidationError) -> CodecError {
    CodecError::Construction(format!("{}: {}", err.field(), err))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_MEMO_LENGTH, MIN_TX_BYTES};
    use crate::transaction::types::SignMode;

    fn sample_tx() -> Tx {
        TxBuilder::new()
            .set_gas_limit(50_000)
            .set_fee_amount(vec![Coin::new("atom", 150)])
            .set_memo("foomemo")
            .build()
            .unwrap()
    }

    #[test]
    fn builder_sets_fields() {
        let tx = sample_tx();
        assert_eq!(tx.gas_limit(), 50_000);
        assert_eq!(tx.fee_amount().amount_of("atom"), 150);
        assert_eq!(tx.memo(), "foomemo");
        assert!(tx.body.messages.is_empty());
        assert!(!tx.is_signed());
    }

    #[test]
    fn empty_builder_is_valid() {
        let tx = TxBuilder::new().build().unwrap();
        assert_eq!(tx, Tx::default());
    }

    #[test]
    fn builder_sorts_fee_coins() {
        let tx = TxBuilder::new()
            .set_fee_amount(vec![Coin::new("stake", 5), Coin::new("atom", 150)])
            .build()
            .unwrap();
        assert_eq!(tx.fee_amount().to_string(), "150atom,5stake");
    }

    #[test]
    fn bad_denom_is_construction_error() {
        let err = TxBuilder::new()
            .set_fee_amount(vec![Coin::new("$$", 1)])
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::Construction(_)));
        assert!(err.to_string().contains("auth_info.fee.amount"));
    }

    #[test]
    fn long_memo_is_construction_error() {
        let err = TxBuilder::new()
            .set_memo("x".repeat(MAX_MEMO_LENGTH + 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::Construction(_)));
    }

    #[test]
    fn oversized_message_is_construction_error() {
        let err = TxBuilder::new()
            .add_message(Any::new("/bank.MsgSend", vec![0; 300 * 1024]))
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::Construction(_)));
        assert!(err.to_string().contains("tx: encoded transaction is"));
    }

    #[test]
    fn builder_limit_can_be_lowered() {
        let builder = TxBuilder::new().set_memo("foomemo");
        assert!(builder.clone().build().is_ok());
        assert!(matches!(
            builder.with_max_tx_bytes(MIN_TX_BYTES).build(),
            Err(CodecError::Construction(_))
        ));
    }

    #[test]
    fn hash_is_deterministic_upper_hex() {
        let a = sample_tx().hash();
        let b = sample_tx().hash();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_changes_with_memo() {
        let other = TxBuilder::from_tx(sample_tx())
            .set_memo("barmemo")
            .build()
            .unwrap();
        assert_ne!(sample_tx().hash(), other.hash());
    }

    #[test]
    fn from_tx_preserves_everything() {
        let tx = TxBuilder::new()
            .add_message(Any::new("/bank.MsgSend", vec![1, 2, 3]))
            .set_timeout_height(99)
            .set_signer_infos(vec![SignerInfo {
                public_key: Some(Any::new("/crypto.PubKey", vec![2; 33])),
                sign_mode: SignMode::Direct,
                sequence: 7,
            }])
            .set_fee_amount(vec![Coin::new("atom", 1)])
            .set_fee_payer("payer1")
            .set_fee_granter("granter1")
            .set_signatures(vec![vec![9; 64]])
            .build()
            .unwrap();
        let rebuilt = TxBuilder::from_tx(tx.clone()).build().unwrap();
        assert_eq!(rebuilt, tx);
        assert!(rebuilt.is_signed());
    }

    #[test]
    fn json_field_order_is_stable() {
        let json = serde_json::to_string(&sample_tx()).unwrap();
        let body = json.find("\"body\"").unwrap();
        let auth = json.find("\"auth_info\"").unwrap();
        let sigs = json.find("\"signatures\"").unwrap();
        assert!(body < auth && auth < sigs);
    }
}
