//! Structural invariants of a transaction value.
//!
//! [`Tx::validate`](super::Tx::validate) runs these checks. The same checks
//! back three different error kinds depending on who finds the problem: the
//! builder reports a construction error, the JSON codec a schema mismatch,
//! the binary codec a malformed-binary error.

use thiserror::Error;

use super::builder::Tx;
use crate::codec::binary::encoded_len;
use crate::config::{MAX_FEE_COINS, MAX_MEMO_LENGTH, MAX_MESSAGES, MAX_SIGNERS, MAX_TX_SIZE_BYTES};

/// A violated transaction invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid coin denomination {denom:?}")]
    InvalidDenom { denom: String },

    #[error("coin amount for {denom} must be positive")]
    ZeroAmount { denom: String },

    #[error("duplicate coin denomination {denom}")]
    DuplicateDenom { denom: String },

    #[error("coins not sorted: {previous} must come after {next}")]
    UnsortedCoins { previous: String, next: String },

    #[error("too many fee coins: {count} (max {max})")]
    TooManyFeeCoins { count: usize, max: usize },

    #[error("memo is {len} bytes (max {max})")]
    MemoTooLong { len: usize, max: usize },

    #[error("too many messages: {count} (max {max})")]
    TooManyMessages { count: usize, max: usize },

    #[error("too many signer infos: {count} (max {max})")]
    TooManySigners { count: usize, max: usize },

    #[error("too many signatures: {count} (max {max})")]
    TooManySignatures { count: usize, max: usize },

    #[error("{field} has an empty type URL")]
    EmptyTypeUrl { field: String },

    #[error("encoded transaction is {len} bytes (max {max})")]
    TxTooLarge { len: usize, max: usize },
}

impl ValidationError {
    /// Dotted path of the offending field.
    pub fn field(&self) -> String {
        match self {
            Self::InvalidDenom { .. }
            | Self::ZeroAmount { .. }
            | Self::DuplicateDenom { .. }
            | Self::UnsortedCoins { .. }
            | Self::TooManyFeeCoins { .. } => "auth_info.fee.amount".to_string(),
            Self::MemoTooLong { .. } => "body.memo".to_string(),
            Self::TooManyMessages { .. } => "body.messages".to_string(),
            Self::TooManySigners { .. } => "auth_info.signer_infos".to_string(),
            Self::TooManySignatures { .. } => "signatures".to_string(),
            Self::EmptyTypeUrl { field } => field.clone(),
            Self::TxTooLarge { .. } => "tx".to_string(),
        }
    }
}

/// Checks every invariant against the default size limit.
pub fn validate_tx(tx: &Tx) -> Result<(), ValidationError> {
    validate_tx_with_limit(tx, MAX_TX_SIZE_BYTES)
}

/// Checks every invariant, cheapest first. The canonical binary form must
/// fit in `max_tx_bytes`, so that anything accepted here also decodes.
pub fn validate_tx_with_limit(tx: &Tx, max_tx_bytes: usize) -> Result<(), ValidationError> {
    let memo_len = tx.body.memo.len();
    if memo_len > MAX_MEMO_LENGTH {
        return Err(ValidationError::MemoTooLong {
            len: memo_len,
            max: MAX_MEMO_LENGTH,
        });
    }

    let messages = tx.body.messages.len();
    if messages > MAX_MESSAGES {
        return Err(ValidationError::TooManyMessages {
            count: messages,
            max: MAX_MESSAGES,
        });
    }

    let signers = tx.auth_info.signer_infos.len();
    if signers > MAX_SIGNERS {
        return Err(ValidationError::TooManySigners {
            count: signers,
            max: MAX_SIGNERS,
        });
    }

    let signatures = tx.signatures.len();
    if signatures > MAX_SIGNERS {
        return Err(ValidationError::TooManySignatures {
            count: signatures,
            max: MAX_SIGNERS,
        });
    }

    let coins = tx.auth_info.fee.amount.len();
    if coins > MAX_FEE_COINS {
        return Err(ValidationError::TooManyFeeCoins {
            count: coins,
            max: MAX_FEE_COINS,
        });
    }
    tx.auth_info.fee.amount.validate()?;

    for (i, msg) in tx.body.messages.iter().enumerate() {
        if msg.type_url.is_empty() {
            return Err(ValidationError::EmptyTypeUrl {
                field: format!("body.messages[{}]", i),
            });
        }
    }

    for (i, signer) in tx.auth_info.signer_infos.iter().enumerate() {
        if let Some(ref key) = signer.public_key {
            if key.type_url.is_empty() {
                return Err(ValidationError::EmptyTypeUrl {
                    field: format!("auth_info.signer_infos[{}].public_key", i),
                });
            }
        }
    }

    let len = encoded_len(tx);
    if len > max_tx_bytes {
        return Err(ValidationError::TxTooLarge {
            len,
            max: max_tx_bytes,
        });
    }

    Ok(())
}
