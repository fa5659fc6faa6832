//! Canonical binary codec.
//!
//! The layout is a fixed field sequence with little-endian integers and
//! `u32` length prefixes, framed by magic bytes, a format version, and one
//! tag per top-level field:
//!
//! ```text
//! "TXWR" | version u16
//! 0x01 body       memo, timeout_height, messages
//! 0x02 auth_info  signer_infos, fee.amount, fee.gas_limit, fee.payer, fee.granter
//! 0x03 signatures
//! ```
//!
//! serde is intentionally not involved: the byte form must not depend on
//! derive output or field attributes, only on the code in this file.
//!
//! Decoding never panics and never reads past the buffer. Every failure is a
//! [`CodecError::MalformedBinary`] carrying the offset where parsing stopped
//! and the dotted path of the field being read.

use tracing::{debug, trace};

use super::BinaryCodec;
use crate::config::{
    CodecConfig, MAX_FEE_COINS, MAX_MESSAGES, MAX_SIGNERS, MIN_TX_BYTES, TAG_AUTH_INFO, TAG_BODY,
    TAG_SIGNATURES, WIRE_FORMAT_VERSION, WIRE_MAGIC,
};
use crate::error::{CodecError, Result};
use crate::transaction::types::{Any, Coin, Coins, Fee, SignMode, SignerInfo};
use crate::transaction::{AuthInfo, Tx, TxBody};

// ---------------------------------------------------------------------------
// WireCodec
// ---------------------------------------------------------------------------

/// The canonical binary codec, bound to [`WIRE_FORMAT_VERSION`].
#[derive(Debug, Clone, Copy)]
pub struct WireCodec {
    max_tx_bytes: usize,
}

impl WireCodec {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            max_tx_bytes: config.max_tx_bytes,
        }
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl BinaryCodec for WireCodec {
    fn encode(&self, tx: &Tx) -> Vec<u8> {
        encode_tx(tx)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Tx> {
        decode_tx(bytes, self.max_tx_bytes)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes `tx` in canonical binary form. Infallible: every [`Tx`] has
/// exactly one encoding.
pub fn encode_tx(tx: &Tx) -> Vec<u8> {
    let mut w = Writer::with_capacity(encoded_len(tx));

    w.raw(&WIRE_MAGIC);
    w.u16(WIRE_FORMAT_VERSION);

    w.u8(TAG_BODY);
    w.string(&tx.body.memo);
    w.u64(tx.body.timeout_height);
    w.len(tx.body.messages.len());
    for msg in &tx.body.messages {
        w.any(msg);
    }

    w.u8(TAG_AUTH_INFO);
    w.len(tx.auth_info.signer_infos.len());
    for signer in &tx.auth_info.signer_infos {
        match signer.public_key {
            Some(ref key) => {
                w.u8(1);
                w.any(key);
            }
            None => w.u8(0),
        }
        w.u8(signer.sign_mode.code());
        w.u64(signer.sequence);
    }
    let fee = &tx.auth_info.fee;
    w.len(fee.amount.len());
    for coin in &fee.amount {
        w.string(&coin.denom);
        w.u128(coin.amount);
    }
    w.u64(fee.gas_limit);
    w.string(&fee.payer);
    w.string(&fee.granter);

    w.u8(TAG_SIGNATURES);
    w.len(tx.signatures.len());
    for sig in &tx.signatures {
        w.bytes(sig);
    }

    let out = w.finish();
    trace!(len = out.len(), "encoded transaction");
    out
}

/// Length of [`encode_tx`]'s output, computed without encoding.
pub fn encoded_len(tx: &Tx) -> usize {
    fn prefixed(n: usize) -> usize {
        4 + n
    }
    fn any(a: &Any) -> usize {
        prefixed(a.type_url.len()) + prefixed(a.value.len())
    }

    let body = prefixed(tx.body.memo.len())
        + 8
        + 4
        + tx.body.messages.iter().map(any).sum::<usize>();

    let signers: usize = tx
        .auth_info
        .signer_infos
        .iter()
        .map(|s| 1 + s.public_key.as_ref().map_or(0, any) + 1 + 8)
        .sum();
    let fee = &tx.auth_info.fee;
    let coins: usize = fee
        .amount
        .iter()
        .map(|c| prefixed(c.denom.len()) + 16)
        .sum();
    let auth_info = 4
        + signers
        + 4
        + coins
        + 8
        + prefixed(fee.payer.len())
        + prefixed(fee.granter.len());

    let signatures = 4 + tx.signatures.iter().map(|s| prefixed(s.len())).sum::<usize>();

    WIRE_MAGIC.len() + 2 + 1 + body + 1 + auth_info + 1 + signatures
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.raw(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.raw(&v.to_le_bytes());
    }

    fn u128(&mut self, v: u128) {
        self.raw(&v.to_le_bytes());
    }

    fn len(&mut self, n: usize) {
        self.raw(&(n as u32).to_le_bytes());
    }

    fn bytes(&mut self, b: &[u8]) {
        self.len(b.len());
        self.raw(b);
    }

    fn string(&mut self, s: &str) {
        self.bytes(s.as_bytes());
    }

    fn any(&mut self, any: &Any) {
        self.string(&any.type_url);
        self.bytes(&any.value);
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a canonical binary transaction of at most `max_tx_bytes` bytes.
///
/// # Errors
///
/// [`CodecError::MalformedBinary`] on any structural problem: oversized or
/// undersized input, wrong magic or version, unexpected tag, truncation,
/// invalid UTF-8, unknown sign mode, trailing bytes, or a decoded value that
/// violates transaction invariants.
pub fn decode_tx(bytes: &[u8], max_tx_bytes: usize) -> Result<Tx> {
    if bytes.len() > max_tx_bytes {
        return Err(CodecError::malformed_binary(
            0,
            "tx",
            format!(
                "input is {} bytes, limit is {}",
                bytes.len(),
                max_tx_bytes
            ),
        ));
    }
    if bytes.len() < MIN_TX_BYTES {
        return Err(CodecError::malformed_binary(
            bytes.len(),
            "tx",
            format!(
                "input is {} bytes, minimum transaction size is {}",
                bytes.len(),
                MIN_TX_BYTES
            ),
        ));
    }

    let mut r = Reader::new(bytes);

    let magic: [u8; 4] = r.array("magic")?;
    if magic != WIRE_MAGIC {
        return Err(r.error_at(0, "magic", format!("bad magic bytes {}", hex::encode(magic))));
    }
    let version = r.u16("version")?;
    if version != WIRE_FORMAT_VERSION {
        return Err(r.error_at(
            4,
            "version",
            format!(
                "unsupported wire format version {} (expected {})",
                version, WIRE_FORMAT_VERSION
            ),
        ));
    }

    r.expect_tag(TAG_BODY, "body")?;
    let body = read_body(&mut r)?;

    r.expect_tag(TAG_AUTH_INFO, "auth_info")?;
    let auth_info = read_auth_info(&mut r)?;

    r.expect_tag(TAG_SIGNATURES, "signatures")?;
    let count = r.count("signatures", MAX_SIGNERS)?;
    let mut signatures = Vec::with_capacity(count);
    for i in 0..count {
        signatures.push(r.bytes(&format!("signatures[{}]", i))?);
    }

    r.finish()?;

    let tx = Tx {
        body,
        auth_info,
        signatures,
    };
    tx.validate_with_limit(max_tx_bytes)
        .map_err(|e| CodecError::malformed_binary(bytes.len(), e.field(), e.to_string()))?;

    debug!(
        len = bytes.len(),
        messages = tx.body.messages.len(),
        signatures = tx.signatures.len(),
        "decoded transaction"
    );
    Ok(tx)
}

fn read_body(r: &mut Reader<'_>) -> Result<TxBody> {
    let memo = r.string("body.memo")?;
    let timeout_height = r.u64("body.timeout_height")?;
    let count = r.count("body.messages", MAX_MESSAGES)?;
    let mut messages = Vec::with_capacity(count);
    for i in 0..count {
        messages.push(r.any(&format!("body.messages[{}]", i))?);
    }
    Ok(TxBody {
        messages,
        memo,
        timeout_height,
    })
}

fn read_auth_info(r: &mut Reader<'_>) -> Result<AuthInfo> {
    let count = r.count("auth_info.signer_infos", MAX_SIGNERS)?;
    let mut signer_infos = Vec::with_capacity(count);
    for i in 0..count {
        let path = format!("auth_info.signer_infos[{}]", i);
        let public_key = match r.u8(&format!("{}.public_key", path))? {
            0 => None,
            1 => Some(r.any(&format!("{}.public_key", path))?),
            flag => {
                return Err(r.error_back(
                    1,
                    &format!("{}.public_key", path),
                    format!("invalid presence flag 0x{:02x}", flag),
                ))
            }
        };
        let code = r.u8(&format!("{}.sign_mode", path))?;
        let sign_mode = SignMode::from_code(code).ok_or_else(|| {
            r.error_back(
                1,
                &format!("{}.sign_mode", path),
                format!("unknown sign mode {}", code),
            )
        })?;
        let sequence = r.u64(&format!("{}.sequence", path))?;
        signer_infos.push(SignerInfo {
            public_key,
            sign_mode,
            sequence,
        });
    }

    let count = r.count("auth_info.fee.amount", MAX_FEE_COINS)?;
    let mut coins = Vec::with_capacity(count);
    for i in 0..count {
        let denom = r.string(&format!("auth_info.fee.amount[{}].denom", i))?;
        let amount = r.u128(&format!("auth_info.fee.amount[{}].amount", i))?;
        coins.push(Coin { denom, amount });
    }
    let gas_limit = r.u64("auth_info.fee.gas_limit")?;
    let payer = r.string("auth_info.fee.payer")?;
    let granter = r.string("auth_info.fee.granter")?;

    Ok(AuthInfo {
        signer_infos,
        fee: Fee {
            amount: Coins::from_vec_unchecked(coins),
            gas_limit,
            payer,
            granter,
        },
    })
}

/// Bounds-checked cursor over the input buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn error_at(&self, offset: usize, field: &str, reason: impl Into<String>) -> CodecError {
        CodecError::malformed_binary(offset, field, reason)
    }

    /// Error pointing `back` bytes before the cursor, i.e. at a value that
    /// was read successfully but turned out to be invalid.
    fn error_back(&self, back: usize, field: &str, reason: impl Into<String>) -> CodecError {
        CodecError::malformed_binary(self.pos.saturating_sub(back), field, reason)
    }

    fn take(&mut self, n: usize, field: &str) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(self.error_at(
                self.pos,
                field,
                format!(
                    "unexpected end of input: need {} bytes, {} remaining",
                    n, remaining
                ),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    fn u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.array::<1>(field)?[0])
    }

    fn u16(&mut self, field: &str) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array(field)?))
    }

    fn u32(&mut self, field: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array(field)?))
    }

    fn u64(&mut self, field: &str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array(field)?))
    }

    fn u128(&mut self, field: &str) -> Result<u128> {
        Ok(u128::from_le_bytes(self.array(field)?))
    }

    fn expect_tag(&mut self, expected: u8, field: &str) -> Result<()> {
        let tag = self.u8(field)?;
        if tag != expected {
            return Err(self.error_back(
                1,
                field,
                format!("unexpected field tag 0x{:02x}, expected 0x{:02x}", tag, expected),
            ));
        }
        Ok(())
    }

    /// A byte-length prefix. Checked against the remaining input before
    /// anything is allocated.
    fn len(&mut self, field: &str) -> Result<usize> {
        let n = self.u32(field)? as usize;
        if n > self.remaining() {
            return Err(self.error_back(
                4,
                field,
                format!(
                    "unexpected end of input: length prefix {} exceeds {} remaining bytes",
                    n,
                    self.remaining()
                ),
            ));
        }
        Ok(n)
    }

    /// An element-count prefix, capped at `max`.
    fn count(&mut self, field: &str, max: usize) -> Result<usize> {
        let n = self.u32(field)? as usize;
        if n > max {
            return Err(self.error_back(
                4,
                field,
                format!("element count {} exceeds limit {}", n, max),
            ));
        }
        Ok(n)
    }

    fn bytes(&mut self, field: &str) -> Result<Vec<u8>> {
        let n = self.len(field)?;
        Ok(self.take(n, field)?.to_vec())
    }

    fn string(&mut self, field: &str) -> Result<String> {
        let start = self.pos;
        let bytes = self.bytes(field)?;
        String::from_utf8(bytes).map_err(|e| {
            self.error_at(
                start + 4 + e.utf8_error().valid_up_to(),
                field,
                "invalid UTF-8",
            )
        })
    }

    fn any(&mut self, field: &str) -> Result<Any> {
        let type_url = self.string(&format!("{}.type_url", field))?;
        let value = self.bytes(&format!("{}.value", field))?;
        Ok(Any { type_url, value })
    }

    fn finish(self) -> Result<()> {
        if self.remaining() > 0 {
            return Err(self.error_at(
                self.pos,
                "tx",
                format!("{} trailing bytes after signatures", self.remaining()),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
