// ── Text encodings for key material ──
//
// Hex, base64 and PEM helpers shared by the registration effects, the
// material viewer and the raw JSON dump.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::CoreError;

const PEM_LINE: usize = 64;

pub fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Decode a hex string, ignoring surrounding and embedded whitespace.
pub fn hex_decode(text: &str) -> Result<Vec<u8>, CoreError> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(CoreError::decode("hex", "odd number of digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_digit(c: u8) -> Result<u8, CoreError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        other => Err(CoreError::decode(
            "hex",
            format!("unexpected character {:?}", char::from(other)),
        )),
    }
}

pub fn base64_decode(text: &str) -> Result<Vec<u8>, CoreError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| CoreError::decode("base64", e))
}

pub fn base64_encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// A decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    pub label: String,
    pub der: Vec<u8>,
}

pub fn pem_encode(label: &str, der: &[u8]) -> String {
    let body = BASE64.encode(der);
    let mut out = format!("-----BEGIN {label}-----\n");
    for line in body.as_bytes().chunks(PEM_LINE) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out
}

/// Parse the first PEM block in `text`.
pub fn pem_decode(text: &str) -> Result<Pem, CoreError> {
    let mut lines = text.lines().map(str::trim).skip_while(|l| l.is_empty());
    let header = lines
        .next()
        .ok_or_else(|| CoreError::decode("PEM", "empty input"))?;
    let label = header
        .strip_prefix("-----BEGIN ")
        .and_then(|rest| rest.strip_suffix("-----"))
        .ok_or_else(|| CoreError::decode("PEM", "missing BEGIN line"))?
        .to_owned();
    let footer = format!("-----END {label}-----");

    let mut body = String::new();
    for line in lines {
        if line == footer {
            let der = BASE64
                .decode(&body)
                .map_err(|e| CoreError::decode("PEM", e))?;
            return Ok(Pem { label, der });
        }
        if line.contains(':') {
            return Err(CoreError::decode("PEM", "encrypted PEM blocks are not supported"));
        }
        body.push_str(line);
    }
    Err(CoreError::decode("PEM", format!("missing END {label} line")))
}

/// Serialize byte buffers as lowercase hex in the raw JSON dump.
pub mod hex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hex_encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::hex_decode(&text).map_err(serde::de::Error::custom)
    }
}
