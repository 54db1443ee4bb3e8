//! Serializers for byte payloads and the dual-view string.

use std::sync::Arc;

use super::contract::{Packable, TypeSerializer};
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::SerializationContext;
use crate::error::PackError;
use crate::value::{Bytes, MsgPackString};

/// Blob serializer: bin family, or raw headers in classic mode.
pub struct BytesSerializer {
    compat: PackerCompat,
}

impl BytesSerializer {
    pub fn new(compat: PackerCompat) -> Self {
        Self { compat }
    }
}

impl TypeSerializer<Bytes> for BytesSerializer {
    fn pack_core(&self, packer: &mut Packer, value: &Bytes) -> Result<(), PackError> {
        packer.pack_bin(value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Bytes, PackError> {
        // Accepts either family: classic peers write blobs as raw.
        Ok(Bytes::new(unpacker.read_bin()?))
    }

    fn compat(&self) -> PackerCompat {
        self.compat
    }
}

impl Packable for Bytes {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(BytesSerializer::new(ctx.options().compat)))
    }
}

/// Tolerant text serializer: invalid UTF-8 survives as a blob view.
pub struct MsgPackStringSerializer {
    compat: PackerCompat,
}

impl MsgPackStringSerializer {
    pub fn new(compat: PackerCompat) -> Self {
        Self { compat }
    }
}

impl TypeSerializer<MsgPackString> for MsgPackStringSerializer {
    fn pack_core(&self, packer: &mut Packer, value: &MsgPackString) -> Result<(), PackError> {
        packer.pack_str_bytes(value.as_bytes())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<MsgPackString, PackError> {
        unpacker.read_str()
    }

    fn compat(&self) -> PackerCompat {
        self.compat
    }
}

impl Packable for MsgPackString {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(MsgPackStringSerializer::new(ctx.options().compat)))
    }
}
