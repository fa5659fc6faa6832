//! Field-level JSON formats for transaction values.
//!
//! Integers wider than 53 bits do not survive a round trip through most JSON
//! consumers, so `u64`/`u128` fields are rendered as decimal strings. Raw
//! bytes are rendered as standard base64.

/// `u64`/`u128` as a decimal string. Rejects JSON numbers, signs, and
/// anything that does not parse as an unsigned integer.
pub(crate) mod decimal {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(de::Error::custom(format!(
                "expected a non-negative decimal integer string, got {:?}",
                s
            )));
        }
        s.parse::<T>().map_err(de::Error::custom)
    }
}

/// `Vec<u8>` as a standard base64 string.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map_err(|e| de::Error::custom(format!("invalid base64: {}", e)))
    }
}

/// `Vec<Vec<u8>>` as a list of standard base64 strings.
pub(crate) mod base64_list {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(serde::Serialize)]
    struct Wrap<'a>(#[serde(with = "super::base64_bytes")] &'a [u8]);

    #[derive(Deserialize)]
    struct Unwrap(#[serde(with = "super::base64_bytes")] Vec<u8>);

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&Wrap(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let items = Vec::<Unwrap>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|Unwrap(bytes)| bytes).collect())
    }
}
