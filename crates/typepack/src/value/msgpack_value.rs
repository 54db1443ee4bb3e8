//! Dynamic tagged-union value for schema-free callers.

use super::MsgPackString;
use crate::codec::Packer;
use crate::error::PackError;

/// A dynamic MessagePack value.
///
/// The variant split preserves the wire family a value was read as
/// (signed vs unsigned integer, float32 vs float64, string vs binary),
/// and re-packing always emits the narrowest encoding compatible with
/// the variant, so decode→encode round trips are stable.
///
/// Non-negative integers that fit `i64` normalize to [`Int`]; only
/// values above `i64::MAX` use [`UInt`].
///
/// [`Int`]: MsgPackValue::Int
/// [`UInt`]: MsgPackValue::UInt
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MsgPackValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Str(MsgPackString),
    Bin(Vec<u8>),
    Array(Vec<MsgPackValue>),
    Map(Vec<(MsgPackValue, MsgPackValue)>),
    Ext(i8, Vec<u8>),
}

impl MsgPackValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, MsgPackValue::Nil)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MsgPackValue::Int(v) => Some(*v),
            MsgPackValue::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MsgPackValue::F32(v) => Some(*v as f64),
            MsgPackValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MsgPackValue::Str(s) => s.try_str(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[MsgPackValue]> {
        match self {
            MsgPackValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Writes the value through a packer, emitting the narrowest
    /// compatible encoding for each node.
    pub fn write_to(&self, packer: &mut Packer) -> Result<(), PackError> {
        match self {
            MsgPackValue::Nil => packer.pack_nil(),
            MsgPackValue::Bool(b) => packer.pack_bool(*b),
            MsgPackValue::Int(v) => packer.pack_int(*v),
            MsgPackValue::UInt(v) => packer.pack_uint(*v),
            MsgPackValue::F32(v) => packer.pack_f32(*v),
            MsgPackValue::F64(v) => packer.pack_f64(*v),
            MsgPackValue::Str(s) => packer.pack_str_bytes(s.as_bytes())?,
            MsgPackValue::Bin(b) => packer.pack_bin(b)?,
            MsgPackValue::Array(items) => {
                packer.pack_array_header(items.len())?;
                for item in items {
                    item.write_to(packer)?;
                }
            }
            MsgPackValue::Map(entries) => {
                packer.pack_map_header(entries.len())?;
                for (key, value) in entries {
                    key.write_to(packer)?;
                    value.write_to(packer)?;
                }
            }
            MsgPackValue::Ext(tag, data) => packer.pack_ext(*tag, data)?,
        }
        Ok(())
    }
}

impl From<bool> for MsgPackValue {
    fn from(v: bool) -> Self {
        MsgPackValue::Bool(v)
    }
}

impl From<i64> for MsgPackValue {
    fn from(v: i64) -> Self {
        MsgPackValue::Int(v)
    }
}

impl From<u64> for MsgPackValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => MsgPackValue::Int(i),
            Err(_) => MsgPackValue::UInt(v),
        }
    }
}

impl From<f64> for MsgPackValue {
    fn from(v: f64) -> Self {
        MsgPackValue::F64(v)
    }
}

impl From<&str> for MsgPackValue {
    fn from(v: &str) -> Self {
        MsgPackValue::Str(MsgPackString::from_string(v))
    }
}

impl From<String> for MsgPackValue {
    fn from(v: String) -> Self {
        MsgPackValue::Str(MsgPackString::from_string(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_emits_narrowest_forms() {
        let mut packer = Packer::new();
        MsgPackValue::Int(5).write_to(&mut packer).unwrap();
        assert_eq!(packer.bytes(), vec![0x05]);

        MsgPackValue::UInt(u64::MAX).write_to(&mut packer).unwrap();
        assert_eq!(packer.bytes()[0], 0xcf);

        MsgPackValue::Array(vec![MsgPackValue::Nil, MsgPackValue::Bool(true)])
            .write_to(&mut packer)
            .unwrap();
        assert_eq!(packer.bytes(), vec![0x92, 0xc0, 0xc3]);
    }

    #[test]
    fn u64_normalizes_into_int_when_it_fits() {
        assert_eq!(MsgPackValue::from(7u64), MsgPackValue::Int(7));
        assert!(matches!(
            MsgPackValue::from(u64::MAX),
            MsgPackValue::UInt(_)
        ));
    }
}
