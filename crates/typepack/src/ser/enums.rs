//! Enum serializer: by declared name or by underlying integer.

use std::marker::PhantomData;
use std::sync::Arc;

use super::contract::TypeSerializer;
use crate::codec::{Packer, Token, Unpacker};
use crate::context::{EnumMethod, SerializationContext};
use crate::error::PackError;

/// Variant tables for a unit enum; emitted by
/// [`packable_enum!`](crate::packable_enum).
pub trait PackableEnum: Copy + Send + Sync + 'static {
    const ENUM_NAME: &'static str;

    fn name_of(self) -> &'static str;
    fn from_name(name: &str) -> Option<Self>;
    fn to_underlying(self) -> i64;
    fn from_underlying(value: i64) -> Option<Self>;
    /// Whether `value` fits the enum's declared underlying width.
    fn underlying_fits(value: i64) -> bool;
}

/// Serializer for a [`PackableEnum`].
///
/// Packing follows the configured method; unpacking auto-detects from
/// the wire token, so either encoding is always readable.
pub struct EnumSerializer<E> {
    method: EnumMethod,
    _marker: PhantomData<fn() -> E>,
}

impl<E: PackableEnum> EnumSerializer<E> {
    pub fn new(method: EnumMethod) -> Self {
        Self {
            method,
            _marker: PhantomData,
        }
    }

    fn from_wire_int(value: i64) -> Result<E, PackError> {
        if !E::underlying_fits(value) {
            return Err(PackError::EnumUnderlyingTypeMismatch {
                name: E::ENUM_NAME,
                value,
            });
        }
        E::from_underlying(value)
            .ok_or_else(|| PackError::UnknownEnumMember(value.to_string()))
    }
}

impl<E: PackableEnum> TypeSerializer<E> for EnumSerializer<E> {
    fn pack_core(&self, packer: &mut Packer, value: &E) -> Result<(), PackError> {
        match self.method {
            EnumMethod::ByName => packer.pack_str(value.name_of()),
            EnumMethod::ByUnderlyingValue => {
                packer.pack_int(value.to_underlying());
                Ok(())
            }
        }
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<E, PackError> {
        if !unpacker.read()? {
            return Err(PackError::EndOfStream);
        }
        let token = unpacker
            .last_read()
            .cloned()
            .unwrap_or(Token::Nil);
        match token {
            Token::Str(s) => {
                let name = s
                    .try_str()
                    .ok_or_else(|| PackError::UnknownEnumMember("<non-utf8>".to_owned()))?;
                E::from_name(name)
                    .ok_or_else(|| PackError::UnknownEnumMember(name.to_owned()))
            }
            Token::Int(v) => Self::from_wire_int(v),
            Token::UInt(v) => match i64::try_from(v) {
                Ok(v) => Self::from_wire_int(v),
                Err(_) => Err(PackError::EnumUnderlyingTypeMismatch {
                    name: E::ENUM_NAME,
                    value: i64::MAX,
                }),
            },
            other => Err(PackError::MessageTypeMismatch {
                expected: "string or integer",
                found: other.kind_name(),
            }),
        }
    }

    /// Shallow clone with a different method; the canonical instance in
    /// the repository is left untouched.
    fn with_enum_method(&self, method: EnumMethod) -> Option<Arc<dyn TypeSerializer<E>>> {
        Some(Arc::new(Self::new(method)))
    }
}

/// Builds the enum serializer for `E` with the context's configured
/// method; used by [`packable_enum!`](crate::packable_enum).
pub fn build_enum_serializer<E: PackableEnum>(
    ctx: &Arc<SerializationContext>,
) -> Result<Arc<dyn TypeSerializer<E>>, PackError> {
    Ok(Arc::new(EnumSerializer::<E>::new(ctx.options().enum_method)))
}

// Concrete enum coverage lives in tests/enum_matrix.rs, driven through
// the public macro surface.
