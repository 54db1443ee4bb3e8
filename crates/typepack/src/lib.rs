//! MessagePack serialization engine for statically typed data.
//!
//! The crate is layered: [`codec`] speaks the MessagePack byte grammar
//! (a forward-only [`Packer`] and a pull-style [`Unpacker`] with
//! subtree navigation), [`ser`] maps typed values onto the codec
//! through the [`TypeSerializer`] contract, and [`context`] resolves a
//! type to its serializer, memoising one per type with re-entrant and
//! concurrent safety.
//!
//! ```
//! use typepack::{packable_record, SerializationContext, SerializerExt};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! packable_record! {
//!     Point {
//!         x: i32,
//!         y: i32,
//!     }
//! }
//!
//! # fn main() -> Result<(), typepack::PackError> {
//! let ctx = SerializationContext::new();
//! let ser = ctx.serializer_for::<Point>()?;
//! let bytes = ser.pack_bytes(&Point { x: 1, y: -2 })?;
//! assert_eq!(ser.unpack_bytes(&bytes)?, Point { x: 1, y: -2 });
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod context;
pub mod error;
mod macros;
pub mod ser;
pub mod value;

pub use codec::{Packer, PackerCompat, SubtreeUnpacker, Token, Unpacker};
pub use context::{
    default_context, set_default_context, EnumMethod, PrebuiltProvider, ProviderFlavor,
    SerializationContext, SerializationMethod, SerializationOptions, SerializerProvider,
    SerializerRepository,
};
pub use error::PackError;
pub use ser::{NilImplication, Packable, PackableEnum, SerializerExt, TypeSerializer};
pub use value::{BinaryKind, Bytes, MsgPackString, MsgPackValue};

/// Packs one value through the process default context.
pub fn to_bytes<T: Packable>(value: &T) -> Result<Vec<u8>, PackError> {
    default_context().serializer_for::<T>()?.pack_bytes(value)
}

/// Unpacks one value through the process default context.
pub fn from_bytes<T: Packable>(bytes: &[u8]) -> Result<T, PackError> {
    default_context().serializer_for::<T>()?.unpack_bytes(bytes)
}
