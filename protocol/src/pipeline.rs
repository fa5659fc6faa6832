//! Encode and decode pipelines.
//!
//! ```text
//! encode: read JSON ─▶ from_json ─▶ binary encode ─▶ envelope wrap ─▶ emit
//! decode: envelope unwrap ─▶ binary decode ─▶ to_json | display ─▶ emit
//! ```
//!
//! Each run is a single synchronous pass over one transaction. Output is
//! all-or-nothing: the result is fully rendered in memory and written to the
//! sink in one call after every stage has succeeded. A failed or cancelled
//! run leaves the sink untouched.
//!
//! Cancellation is cooperative. The flag is checked before each stage; once
//! set, the next checkpoint returns [`CodecError::Cancelled`].

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::codec::{CodecSet, Envelope};
use crate::error::{CodecError, Result, Stage};
use crate::transaction::Tx;

/// What the decode pipeline emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeOutput {
    /// Canonical compact JSON.
    #[default]
    Json,
    /// Indented JSON; parses to the same value.
    PrettyJson,
    /// The codec set's display encoder.
    Display,
}

/// A configured encode/decode runner.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    codecs: &'a CodecSet,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(codecs: &'a CodecSet) -> Self {
        Self {
            codecs,
            cancel: None,
        }
    }

    /// Attaches a cancellation flag. Setting it to `true` aborts the run at
    /// the next stage boundary.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn checkpoint(&self, stage: Stage) -> Result<()> {
        match self.cancel {
            Some(ref flag) if flag.load(Ordering::SeqCst) => {
                debug!(%stage, "pipeline cancelled");
                Err(CodecError::Cancelled { stage })
            }
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    /// Reads a JSON transaction from `source` and returns its base64
    /// binary form.
    pub fn encode_json<R: Read>(&self, source: R) -> Result<String> {
        self.checkpoint(Stage::Read)?;
        let json = read_bounded(source, self.codecs.config().max_tx_bytes)?;

        self.checkpoint(Stage::Json)?;
        let tx = self.codecs.json().from_json(&json)?;

        self.checkpoint(Stage::Binary)?;
        let bytes = self.codecs.binary().encode(&tx);

        self.checkpoint(Stage::Envelope)?;
        let text = Envelope::Base64.wrap(&bytes);

        debug!(
            json_len = json.len(),
            binary_len = bytes.len(),
            txhash = %tx.hash(),
            "encoded transaction"
        );
        Ok(text)
    }

    /// Runs [`Pipeline::encode_json`] and writes the result to `out`.
    pub fn run_encode<R: Read, W: Write>(&self, source: R, out: &mut W) -> Result<()> {
        let text = self.encode_json(source)?;
        self.emit(out, &text)?;
        info!("encode complete");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    /// Unwraps and decodes `text` into a transaction.
    pub fn decode_tx(&self, text: &str, envelope: Envelope) -> Result<Tx> {
        self.checkpoint(Stage::Envelope)?;
        let bytes = envelope.unwrap(text)?;

        self.checkpoint(Stage::Binary)?;
        let tx = self.codecs.binary().decode(&bytes)?;

        debug!(binary_len = bytes.len(), txhash = %tx.hash(), "decoded transaction");
        Ok(tx)
    }

    /// Decodes `text` and renders it in the requested form.
    pub fn decode_text(&self, text: &str, envelope: Envelope, output: DecodeOutput) -> Result<String> {
        let tx = self.decode_tx(text, envelope)?;

        let rendered = match output {
            DecodeOutput::Json | DecodeOutput::PrettyJson => {
                self.checkpoint(Stage::Json)?;
                let json = if output == DecodeOutput::Json {
                    self.codecs.json().to_json(&tx)?
                } else {
                    self.codecs.json().to_json_pretty(&tx)?
                };
                String::from_utf8(json).map_err(|e| CodecError::Serialization(e.to_string()))?
            }
            DecodeOutput::Display => {
                self.checkpoint(Stage::Display)?;
                let display = self.codecs.display().ok_or_else(|| {
                    CodecError::Unsupported("codec set has no display encoder".to_string())
                })?;
                display.render(&tx)?
            }
        };
        Ok(rendered)
    }

    /// Runs [`Pipeline::decode_text`] and writes the result to `out`.
    pub fn run_decode<W: Write>(
        &self,
        text: &str,
        envelope: Envelope,
        output: DecodeOutput,
        out: &mut W,
    ) -> Result<()> {
        let rendered = self.decode_text(text, envelope, output)?;
        self.emit(out, &rendered)?;
        info!("decode complete");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Writes `text` plus a newline as one buffer.
    fn emit<W: Write>(&self, out: &mut W, text: &str) -> Result<()> {
        self.checkpoint(Stage::Write)?;
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        out.write_all(line.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|source| CodecError::Io {
                stage: Stage::Write,
                source,
            })
    }
}

/// Reads the whole source, failing once it exceeds `limit` bytes.
fn read_bounded<R: Read>(source: R, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    source
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(|source| CodecError::Io {
            stage: Stage::Read,
            source,
        })?;
    if buf.len() > limit {
        return Err(CodecError::InputTooLarge { limit });
    }
    Ok(buf)
}
