//! Character sets understood by [`GrowableBuffer::as_text`](super::GrowableBuffer::as_text).

use serde::{Deserialize, Serialize};

/// A text encoding for decoding buffered bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    #[default]
    #[serde(rename = "ISO-8859-1")]
    Latin1,
    /// UTF-8. Invalid sequences decode to U+FFFD.
    #[serde(rename = "UTF-8")]
    Utf8,
    /// US-ASCII. Bytes above 0x7F decode to U+FFFD.
    #[serde(rename = "US-ASCII")]
    Ascii,
}

impl Charset {
    /// Look up a charset by its IANA name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "iso-8859-1" | "latin1" | "iso8859-1" => Some(Charset::Latin1),
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "us-ascii" | "ascii" => Some(Charset::Ascii),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Charset::Latin1 => "ISO-8859-1",
            Charset::Utf8 => "UTF-8",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Decode `bytes` into a string.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        }
    }
}
