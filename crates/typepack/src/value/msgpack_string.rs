//! Dual-view string value: raw UTF-8 bytes and decoded text.

use std::hash::{Hash, Hasher};
use std::str::Utf8Error;
use std::sync::OnceLock;

use crate::error::PackError;

/// Which view of a [`MsgPackString`] is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    /// No strict decode has been attempted yet.
    Unknown,
    /// The payload decoded as valid UTF-8 text.
    String,
    /// A strict decode failed; only the byte view is meaningful.
    Blob,
}

/// A string value carrying up to two lazily-populated representations.
///
/// The raw (classic) MessagePack family conflates strings and blobs, so
/// a payload read off the wire may not be valid UTF-8. The value keeps
/// the bytes it was constructed from and attempts one strict decode on
/// first request; a failure is remembered and the value degrades to a
/// binary view without losing data.
///
/// At least one representation exists at all times; once both are
/// populated they agree under strict UTF-8.
#[derive(Debug, Clone, Default)]
pub struct MsgPackString {
    encoded: OnceLock<Vec<u8>>,
    decoded: OnceLock<Result<String, Utf8Error>>,
}

impl MsgPackString {
    /// Builds the value from decoded text; bytes are produced lazily.
    pub fn from_string(text: impl Into<String>) -> Self {
        let this = Self::default();
        let _ = this.decoded.set(Ok(text.into()));
        this
    }

    /// Builds the value from encoded bytes; text is decoded lazily.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let this = Self::default();
        let _ = this.encoded.set(bytes);
        this
    }

    /// The UTF-8 byte view, encoding from text on first request.
    pub fn as_bytes(&self) -> &[u8] {
        self.encoded.get_or_init(|| match self.decoded.get() {
            Some(Ok(text)) => text.clone().into_bytes(),
            // Unreachable by the constructor invariant: a value without
            // bytes always has decoded text.
            _ => Vec::new(),
        })
    }

    fn decoded_slot(&self) -> &Result<String, Utf8Error> {
        self.decoded.get_or_init(|| {
            let bytes = self.encoded.get().map(Vec::as_slice).unwrap_or_default();
            std::str::from_utf8(bytes).map(str::to_owned)
        })
    }

    /// The decoded text, attempting one strict decode on first request.
    ///
    /// Returns `None` once a decode has failed; the failure is sticky.
    pub fn try_str(&self) -> Option<&str> {
        match self.decoded_slot() {
            Ok(text) => Some(text),
            Err(_) => None,
        }
    }

    /// The decoded text, surfacing the stored decode error.
    pub fn get_str(&self) -> Result<&str, PackError> {
        match self.decoded_slot() {
            Ok(text) => Ok(text),
            Err(e) => Err(PackError::DecodingFailure(*e)),
        }
    }

    /// Which representation is authoritative so far.
    pub fn binary_kind(&self) -> BinaryKind {
        match self.decoded.get() {
            Some(Ok(_)) => BinaryKind::String,
            Some(Err(_)) => BinaryKind::Blob,
            None => BinaryKind::Unknown,
        }
    }

    fn has_text(&self) -> bool {
        matches!(self.decoded.get(), Some(Ok(_)))
    }
}

impl From<&str> for MsgPackString {
    fn from(text: &str) -> Self {
        Self::from_string(text)
    }
}

impl From<String> for MsgPackString {
    fn from(text: String) -> Self {
        Self::from_string(text)
    }
}

impl From<Vec<u8>> for MsgPackString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl PartialEq for MsgPackString {
    /// Text comparison when both sides have decoded text, raw-byte
    /// comparison when both lack it, decode-and-compare otherwise.
    fn eq(&self, other: &Self) -> bool {
        match (self.has_text(), other.has_text()) {
            (true, true) => self.try_str() == other.try_str(),
            (false, false) => self.as_bytes() == other.as_bytes(),
            _ => match (self.try_str(), other.try_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for MsgPackString {}

impl Hash for MsgPackString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(Ok(text)) = self.decoded.get() {
            text.hash(state);
        } else {
            let mut acc: u32 = 0;
            for (i, byte) in self.as_bytes().iter().enumerate() {
                acc ^= (*byte as u32) << ((i % 4) * 8);
            }
            acc.hash(state);
        }
    }
}
