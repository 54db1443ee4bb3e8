//! Error kinds shared across the codec and serializer layers.

use std::str::Utf8Error;

use thiserror::Error;
use typepack_buffers::BufferError;

/// Errors produced while packing or unpacking MessagePack data.
#[derive(Debug, Error)]
pub enum PackError {
    /// The input ended in the middle of a MessagePack token.
    #[error("unexpected end of stream")]
    EndOfStream,

    /// The input carries an undefined tag byte or an impossible length.
    #[error("invalid messagepack stream: {0}")]
    InvalidStream(&'static str),

    /// A typed read disagreed with the wire token.
    #[error("message type mismatch: expected {expected}, found {found}")]
    MessageTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A nil token was read for a target that does not admit nil.
    #[error("value of type `{0}` cannot be nil")]
    ValueCannotBeNull(&'static str),

    /// A member marked as required was missing or nil.
    #[error("missing required value for member `{0}`")]
    MissingRequiredValue(&'static str),

    /// A collection is too long for a MessagePack length prefix.
    #[error("collection length {0} exceeds the wire limit")]
    TooLargeCollection(usize),

    /// No serializer is registered for the requested type.
    #[error("no serializer registered for type `{0}`")]
    NotRegistered(String),

    /// A name-encoded enum value matched no declared member.
    #[error("unknown enum member `{0}`")]
    UnknownEnumMember(String),

    /// An integer-encoded enum value does not fit the underlying type.
    #[error("value {value} does not fit the underlying type of enum `{name}`")]
    EnumUnderlyingTypeMismatch { name: &'static str, value: i64 },

    /// A string payload failed strict UTF-8 decoding.
    ///
    /// Carried inside [`MsgPackString`](crate::value::MsgPackString) and
    /// surfaced only when decoded text is requested.
    #[error("string payload is not valid utf-8")]
    DecodingFailure(#[source] Utf8Error),

    /// The operation is not defined for the target type.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// The destination sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<BufferError> for PackError {
    fn from(_: BufferError) -> Self {
        PackError::EndOfStream
    }
}
