//! Serializers for scalar types and text.

use std::sync::Arc;

use super::contract::{Packable, TypeSerializer};
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::SerializationContext;
use crate::error::PackError;

pub struct BoolSerializer;

impl TypeSerializer<bool> for BoolSerializer {
    fn pack_core(&self, packer: &mut Packer, value: &bool) -> Result<(), PackError> {
        packer.pack_bool(*value);
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<bool, PackError> {
        unpacker.read_bool()
    }
}

impl Packable for bool {
    fn build_serializer(
        _ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(BoolSerializer))
    }
}

macro_rules! signed_serializer {
    ($name:ident, $ty:ty) => {
        pub struct $name;

        impl TypeSerializer<$ty> for $name {
            fn pack_core(&self, packer: &mut Packer, value: &$ty) -> Result<(), PackError> {
                packer.pack_int(*value as i64);
                Ok(())
            }

            fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<$ty, PackError> {
                let wide = unpacker.read_i64()?;
                <$ty>::try_from(wide).map_err(|_| PackError::MessageTypeMismatch {
                    expected: stringify!($ty),
                    found: "out-of-range integer",
                })
            }
        }

        impl Packable for $ty {
            fn build_serializer(
                _ctx: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
                Ok(Arc::new($name))
            }
        }
    };
}

macro_rules! unsigned_serializer {
    ($name:ident, $ty:ty) => {
        pub struct $name;

        impl TypeSerializer<$ty> for $name {
            fn pack_core(&self, packer: &mut Packer, value: &$ty) -> Result<(), PackError> {
                packer.pack_uint(*value as u64);
                Ok(())
            }

            fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<$ty, PackError> {
                let wide = unpacker.read_u64()?;
                <$ty>::try_from(wide).map_err(|_| PackError::MessageTypeMismatch {
                    expected: stringify!($ty),
                    found: "out-of-range integer",
                })
            }
        }

        impl Packable for $ty {
            fn build_serializer(
                _ctx: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
                Ok(Arc::new($name))
            }
        }
    };
}

signed_serializer!(I8Serializer, i8);
signed_serializer!(I16Serializer, i16);
signed_serializer!(I32Serializer, i32);
signed_serializer!(I64Serializer, i64);
signed_serializer!(IsizeSerializer, isize);
unsigned_serializer!(U8Serializer, u8);
unsigned_serializer!(U16Serializer, u16);
unsigned_serializer!(U32Serializer, u32);
unsigned_serializer!(U64Serializer, u64);
unsigned_serializer!(UsizeSerializer, usize);

pub struct F32Serializer;

impl TypeSerializer<f32> for F32Serializer {
    fn pack_core(&self, packer: &mut Packer, value: &f32) -> Result<(), PackError> {
        packer.pack_f32(*value);
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<f32, PackError> {
        unpacker.read_f32()
    }
}

impl Packable for f32 {
    fn build_serializer(
        _ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(F32Serializer))
    }
}

pub struct F64Serializer;

impl TypeSerializer<f64> for F64Serializer {
    fn pack_core(&self, packer: &mut Packer, value: &f64) -> Result<(), PackError> {
        packer.pack_f64(*value);
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<f64, PackError> {
        unpacker.read_f64()
    }
}

impl Packable for f64 {
    fn build_serializer(
        _ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(F64Serializer))
    }
}

pub struct CharSerializer;

impl TypeSerializer<char> for CharSerializer {
    fn pack_core(&self, packer: &mut Packer, value: &char) -> Result<(), PackError> {
        let mut buf = [0u8; 4];
        packer.pack_str(value.encode_utf8(&mut buf))
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<char, PackError> {
        let s = unpacker.read_str()?;
        let text = s.get_str()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(PackError::MessageTypeMismatch {
                expected: "single-character string",
                found: "string",
            }),
        }
    }
}

impl Packable for char {
    fn build_serializer(
        _ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(CharSerializer))
    }
}

/// Strict text serializer: decoding non-UTF-8 payloads fails.
pub struct StringSerializer {
    compat: PackerCompat,
}

impl StringSerializer {
    pub fn new(compat: PackerCompat) -> Self {
        Self { compat }
    }
}

impl TypeSerializer<String> for StringSerializer {
    fn pack_core(&self, packer: &mut Packer, value: &String) -> Result<(), PackError> {
        packer.pack_str(value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<String, PackError> {
        let s = unpacker.read_str()?;
        Ok(s.get_str()?.to_owned())
    }

    fn compat(&self) -> PackerCompat {
        self.compat
    }
}

impl Packable for String {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(StringSerializer::new(ctx.options().compat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::SerializerExt;

    #[test]
    fn integer_round_trips_with_width_checks() {
        let ser = U8Serializer;
        let bytes = ser.pack_bytes(&200u8).unwrap();
        assert_eq!(bytes, vec![0xcc, 200]);
        assert_eq!(ser.unpack_bytes(&bytes).unwrap(), 200);

        // 300 does not fit u8.
        let wide = U16Serializer.pack_bytes(&300u16).unwrap();
        assert!(matches!(
            ser.unpack_bytes(&wide),
            Err(PackError::MessageTypeMismatch { .. })
        ));
    }

    #[test]
    fn signed_rejects_unsigned_overflow() {
        let bytes = U64Serializer.pack_bytes(&u64::MAX).unwrap();
        assert!(I64Serializer.unpack_bytes(&bytes).is_err());
    }

    #[test]
    fn string_round_trip() {
        let ser = StringSerializer::new(PackerCompat::empty());
        let bytes = ser.pack_bytes(&"héllo".to_owned()).unwrap();
        assert_eq!(ser.unpack_bytes(&bytes).unwrap(), "héllo");
    }

    #[test]
    fn string_rejects_invalid_utf8_payload() {
        let ser = StringSerializer::new(PackerCompat::empty());
        // fixstr header carrying invalid utf-8
        let bytes = [0xa2, 0xff, 0xfe];
        assert!(matches!(
            ser.unpack_bytes(&bytes),
            Err(PackError::DecodingFailure(_))
        ));
    }

    #[test]
    fn nil_for_plain_scalar_is_rejected() {
        assert!(matches!(
            I32Serializer.unpack_bytes(&[0xc0]),
            Err(PackError::ValueCannotBeNull(_))
        ));
    }

    #[test]
    fn char_round_trip() {
        let bytes = CharSerializer.pack_bytes(&'é').unwrap();
        assert_eq!(CharSerializer.unpack_bytes(&bytes).unwrap(), 'é');
    }
}
