//! The typed serializer contract and the user-facing pack/unpack
//! surface.

use std::any::type_name;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::{EnumMethod, SerializationContext};
use crate::error::PackError;
use crate::value::MsgPackValue;

/// How a missing or nil wire entry maps onto a typed member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NilImplication {
    /// Leave the member at its type's default.
    #[default]
    MemberDefault,
    /// Set the member to its nil value; requires a type that admits nil.
    Null,
    /// Fail unpacking with
    /// [`MissingRequiredValue`](PackError::MissingRequiredValue).
    Prohibit,
}

/// Types with a natural nil value.
///
/// The `nil` policy token of [`packable_record!`](crate::packable_record)
/// requires the member type to implement this; requesting it for a
/// plain value type is a compile error.
pub trait AdmitsNil {
    fn nil() -> Self;
}

impl<T> AdmitsNil for Option<T> {
    fn nil() -> Self {
        None
    }
}

impl AdmitsNil for MsgPackValue {
    fn nil() -> Self {
        MsgPackValue::Nil
    }
}

/// The nil value of `T`; used by macro-generated member tables.
pub fn nil_of<T: AdmitsNil>() -> T {
    T::nil()
}

/// Encode/decode strategy for values of type `T`.
///
/// `pack_core` / `unpack_core` are the raw variants; the `pack_to` /
/// `unpack_from` wrappers add nil handling on top. Whether a target
/// admits nil is fixed at construction: option-like and dynamic-value
/// targets do, plain values do not.
pub trait TypeSerializer<T>: Send + Sync {
    /// Writes the value without nil handling.
    fn pack_core(&self, packer: &mut Packer, value: &T) -> Result<(), PackError>;

    /// Reads a value without nil handling.
    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<T, PackError>;

    /// Writes the value, emitting nil for absent nullable values.
    fn pack_to(&self, packer: &mut Packer, value: &T) -> Result<(), PackError> {
        self.pack_core(packer, value)
    }

    /// Reads a value; a nil token yields the nil value for targets that
    /// admit one and fails otherwise.
    fn unpack_from(&self, unpacker: &mut Unpacker<'_>) -> Result<T, PackError> {
        if unpacker.try_read_nil()? {
            if self.admits_nil() {
                self.nil_value()
            } else {
                Err(PackError::ValueCannotBeNull(self.target_name()))
            }
        } else {
            self.unpack_core(unpacker)
        }
    }

    /// Populates an existing collection without replacing its identity.
    ///
    /// A nil token is a no-op. Non-collection serializers fail with
    /// [`NotSupported`](PackError::NotSupported).
    fn unpack_into(&self, unpacker: &mut Unpacker<'_>, existing: &mut T) -> Result<(), PackError> {
        let _ = (unpacker, existing);
        Err(PackError::NotSupported(
            "unpack_into on a non-collection serializer",
        ))
    }

    /// Whether the target type admits a nil value.
    fn admits_nil(&self) -> bool {
        false
    }

    /// The target's nil value, for targets that admit one.
    fn nil_value(&self) -> Result<T, PackError> {
        Err(PackError::ValueCannotBeNull(self.target_name()))
    }

    /// A shallow clone with a different enum encoding method, for
    /// per-member overrides. Non-enum serializers return `None`.
    fn with_enum_method(&self, method: EnumMethod) -> Option<Arc<dyn TypeSerializer<T>>> {
        let _ = method;
        None
    }

    /// Compatibility flags captured from the owning context.
    fn compat(&self) -> PackerCompat {
        PackerCompat::empty()
    }

    fn target_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Whole-frame convenience surface over [`TypeSerializer`].
pub trait SerializerExt<T>: TypeSerializer<T> {
    /// Packs one value and writes the frame to `sink`.
    fn pack(&self, sink: &mut dyn Write, value: &T) -> Result<(), PackError> {
        let bytes = self.pack_bytes(value)?;
        sink.write_all(&bytes)?;
        Ok(())
    }

    /// Packs one value into a fresh byte frame.
    fn pack_bytes(&self, value: &T) -> Result<Vec<u8>, PackError> {
        let mut packer = Packer::with_compat(self.compat());
        self.pack_to(&mut packer, value)?;
        Ok(packer.into_bytes())
    }

    /// Reads `source` to its end and unpacks one value.
    fn unpack(&self, source: &mut dyn Read) -> Result<T, PackError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        self.unpack_bytes(&bytes)
    }

    /// Unpacks one value from a byte frame.
    fn unpack_bytes(&self, bytes: &[u8]) -> Result<T, PackError> {
        let mut unpacker = Unpacker::new(bytes);
        self.unpack_from(&mut unpacker)
    }
}

impl<T, S: TypeSerializer<T> + ?Sized> SerializerExt<T> for S {}

/// A type the context knows how to build a serializer for.
///
/// Built-in implementations cover primitives, strings, blobs,
/// collections, options, tuples and the dynamic value; user aggregates
/// and enums get theirs from [`packable_record!`](crate::packable_record)
/// and [`packable_enum!`](crate::packable_enum).
pub trait Packable: Sized + Send + Sync + 'static {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError>;
}
