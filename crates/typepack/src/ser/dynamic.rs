//! Serializer for the dynamic tagged-union value.

use std::sync::Arc;

use super::contract::{Packable, TypeSerializer};
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::SerializationContext;
use crate::error::PackError;
use crate::value::MsgPackValue;

pub struct ValueSerializer {
    compat: PackerCompat,
}

impl ValueSerializer {
    pub fn new(compat: PackerCompat) -> Self {
        Self { compat }
    }
}

impl TypeSerializer<MsgPackValue> for ValueSerializer {
    fn pack_core(&self, packer: &mut Packer, value: &MsgPackValue) -> Result<(), PackError> {
        value.write_to(packer)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<MsgPackValue, PackError> {
        unpacker.read_value()
    }

    fn admits_nil(&self) -> bool {
        true
    }

    fn nil_value(&self) -> Result<MsgPackValue, PackError> {
        Ok(MsgPackValue::Nil)
    }

    fn compat(&self) -> PackerCompat {
        self.compat
    }
}

impl Packable for MsgPackValue {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(ValueSerializer::new(ctx.options().compat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::SerializerExt;

    #[test]
    fn dynamic_round_trip() {
        let ser = ValueSerializer::new(PackerCompat::empty());
        let value = MsgPackValue::Map(vec![
            (MsgPackValue::from("k"), MsgPackValue::Int(-3)),
            (
                MsgPackValue::from("arr"),
                MsgPackValue::Array(vec![MsgPackValue::Nil, MsgPackValue::Bool(true)]),
            ),
        ]);
        let bytes = ser.pack_bytes(&value).unwrap();
        assert_eq!(ser.unpack_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn nil_token_yields_nil_value() {
        let ser = ValueSerializer::new(PackerCompat::empty());
        assert_eq!(ser.unpack_bytes(&[0xc0]).unwrap(), MsgPackValue::Nil);
    }
}
