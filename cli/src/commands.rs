//! Subcommand runners.
//!
//! Each runner takes its codec set, a cancellation flag, and an output sink
//! explicitly, so tests can drive them with an in-memory buffer. Pipeline
//! failures are reported with the stage that failed.

use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};

use txwire_protocol::codec::{CodecSet, Envelope};
use txwire_protocol::pipeline::{DecodeOutput, Pipeline};
use txwire_protocol::CodecError;

use crate::cli::{DecodeArgs, EncodeArgs, HashArgs};

fn stage_error(command: &str, err: CodecError) -> anyhow::Error {
    let stage = err.stage();
    anyhow::Error::new(err).context(format!("{} failed at the {} stage", command, stage))
}

fn envelope(hex: bool) -> Envelope {
    if hex {
        Envelope::Hex
    } else {
        Envelope::Base64
    }
}

/// `txwire encode <FILE>`
pub fn encode<W: Write>(
    args: &EncodeArgs,
    codecs: &CodecSet,
    cancel: Arc<AtomicBool>,
    out: &mut W,
) -> Result<()> {
    let source: Box<dyn Read> = if args.file.as_os_str() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(&args.file).with_context(|| {
            format!("failed to open transaction file {}", args.file.display())
        })?)
    };

    tracing::debug!(file = %args.file.display(), "encoding transaction");
    Pipeline::new(codecs)
        .with_cancellation(cancel)
        .run_encode(source, out)
        .map_err(|e| stage_error("encode", e))
}

/// `txwire decode <STRING>`
pub fn decode<W: Write>(
    args: &DecodeArgs,
    codecs: &CodecSet,
    cancel: Arc<AtomicBool>,
    out: &mut W,
) -> Result<()> {
    let output = if args.display {
        DecodeOutput::Display
    } else if args.pretty {
        DecodeOutput::PrettyJson
    } else {
        DecodeOutput::Json
    };

    tracing::debug!(len = args.encoded.len(), hex = args.hex, ?output, "decoding transaction");
    Pipeline::new(codecs)
        .with_cancellation(cancel)
        .run_decode(&args.encoded, envelope(args.hex), output, out)
        .map_err(|e| stage_error("decode", e))
}

/// `txwire hash <STRING>`
pub fn hash<W: Write>(
    args: &HashArgs,
    codecs: &CodecSet,
    cancel: Arc<AtomicBool>,
    out: &mut W,
) -> Result<()> {
    let tx = Pipeline::new(codecs)
        .with_cancellation(cancel)
        .decode_tx(&args.encoded, envelope(args.hex))
        .map_err(|e| stage_error("hash", e))?;
    writeln!(out, "{}", tx.hash()).context("failed to write hash")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use txwire_protocol::transaction::Coin;

    fn not_cancelled() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    fn foomemo_json(codecs: &CodecSet) -> Vec<u8> {
        let tx = codecs
            .new_builder()
            .set_gas_limit(50_000)
            .set_fee_amount(vec![Coin::new("atom", 150)])
            .set_memo("foomemo")
            .build()
            .unwrap();
        codecs.json().to_json(&tx).unwrap()
    }

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn run_encode(codecs: &CodecSet, path: PathBuf) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = encode(&EncodeArgs { file: path }, codecs, not_cancelled(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn decode_args(encoded: &str) -> DecodeArgs {
        DecodeArgs {
            encoded: encoded.to_string(),
            hex: false,
            display: false,
            pretty: false,
        }
    }

    #[test]
    fn encode_then_decode_round_trip() {
        let codecs = CodecSet::default();
        let file = write_temp(&foomemo_json(&codecs));

        let (result, encoded) = run_encode(&codecs, file.path().to_path_buf());
        result.unwrap();
        let encoded = encoded.trim_end();
        assert!(!encoded.is_empty());

        let mut out = Vec::new();
        decode(&decode_args(encoded), &codecs, not_cancelled(), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["auth_info"]["fee"]["gas_limit"], "50000");
        assert_eq!(json["auth_info"]["fee"]["amount"][0]["denom"], "atom");
        assert_eq!(json["auth_info"]["fee"]["amount"][0]["amount"], "150");
        assert_eq!(json["body"]["memo"], "foomemo");
    }

    #[test]
    fn encode_reports_schema_stage_and_writes_nothing() {
        let codecs = CodecSet::default();
        let file = write_temp(br#"{"body":{},"signatures":[]}"#);
        let (result, output) = run_encode(&codecs, file.path().to_path_buf());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("encode failed at the json stage"));
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::SchemaMismatch(_))
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn encode_missing_file_is_an_error() {
        let codecs = CodecSet::default();
        let dir = tempfile::tempdir().unwrap();
        let (result, output) = run_encode(&codecs, dir.path().join("absent.json"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to open transaction file"));
        assert!(output.is_empty());
    }

    #[test]
    fn decode_bad_text_reports_envelope_stage() {
        let codecs = CodecSet::default();
        let mut out = Vec::new();
        let err = decode(&decode_args("%%%"), &codecs, not_cancelled(), &mut out).unwrap_err();
        assert!(err.to_string().contains("decode failed at the envelope stage"));
        assert!(out.is_empty());
    }

    #[test]
    fn decode_short_binary_reports_binary_stage() {
        let codecs = CodecSet::default();
        let mut out = Vec::new();
        let err = decode(&decode_args("AAAA"), &codecs, not_cancelled(), &mut out).unwrap_err();
        assert!(err.to_string().contains("decode failed at the binary stage"));
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::MalformedBinary { .. })
        ));
    }

    #[test]
    fn decode_default_output_is_canonical_json() {
        use crate::cli::{Commands, TxwireCli};
        use clap::Parser;

        let codecs = CodecSet::default();
        let tx = codecs.json().from_json(&foomemo_json(&codecs)).unwrap();
        let encoded = Envelope::Base64.wrap(&codecs.binary().encode(&tx));

        let cli = TxwireCli::parse_from(["txwire", "decode", encoded.as_str()]);
        let args = match cli.command {
            Commands::Decode(args) => args,
            other => panic!("expected decode, got {:?}", other),
        };

        let mut out = Vec::new();
        decode(&args, &codecs, not_cancelled(), &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(r#"{"denom":"atom","amount":"150"}"#));
        assert!(printed.contains(r#""gas_limit":"50000""#));
        assert!(printed.contains(r#""memo":"foomemo""#));
        assert_eq!(printed.lines().count(), 1);
        assert_eq!(printed.trim_end().as_bytes(), foomemo_json(&codecs).as_slice());
    }

    #[test]
    fn decode_pretty_is_indented() {
        let codecs = CodecSet::default();
        let tx = codecs.json().from_json(&foomemo_json(&codecs)).unwrap();
        let args = DecodeArgs {
            pretty: true,
            ..decode_args(&Envelope::Base64.wrap(&codecs.binary().encode(&tx)))
        };
        let mut out = Vec::new();
        decode(&args, &codecs, not_cancelled(), &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.lines().count() > 1);
        assert_eq!(codecs.json().from_json(printed.as_bytes()).unwrap(), tx);
    }

    #[test]
    fn decode_hex_and_display() {
        let codecs = CodecSet::default();
        let tx = codecs
            .json()
            .from_json(&foomemo_json(&codecs))
            .unwrap();
        let hex_text = Envelope::Hex.wrap(&codecs.binary().encode(&tx));

        let args = DecodeArgs {
            encoded: hex_text,
            hex: true,
            display: true,
            pretty: false,
        };
        let mut out = Vec::new();
        decode(&args, &codecs, not_cancelled(), &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("\"gas\": \"50000\""));
    }

    #[test]
    fn hash_matches_tx_hash() {
        let codecs = CodecSet::default();
        let tx = codecs
            .json()
            .from_json(&foomemo_json(&codecs))
            .unwrap();
        let encoded = Envelope::Base64.wrap(&codecs.binary().encode(&tx));

        let mut out = Vec::new();
        let args = HashArgs {
            encoded,
            hex: false,
        };
        hash(&args, &codecs, not_cancelled(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), tx.hash());
    }

    #[test]
    fn cancelled_encode_writes_nothing() {
        let codecs = CodecSet::default();
        let file = write_temp(&foomemo_json(&codecs));
        let mut out = Vec::new();
        let err = encode(
            &EncodeArgs {
                file: file.path().to_path_buf(),
            },
            &codecs,
            Arc::new(AtomicBool::new(true)),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::Cancelled { .. })
        ));
        assert!(out.is_empty());
    }
}
