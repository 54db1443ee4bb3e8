//! Dynamic values: the tagged union, the dual-view string, and the
//! byte-blob newtype.

mod bytes;
mod msgpack_string;
mod msgpack_value;
mod to_json;

pub use bytes::Bytes;
pub use msgpack_string::{BinaryKind, MsgPackString};
pub use msgpack_value::MsgPackValue;
