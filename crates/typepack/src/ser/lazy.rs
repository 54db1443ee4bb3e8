//! Lazy delegating serializer: breaks construction cycles for
//! self-referential types.

use std::any::type_name;
use std::sync::{Arc, OnceLock, Weak};

use super::contract::{Packable, TypeSerializer};
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::{EnumMethod, SerializationContext};
use crate::error::PackError;

/// A serializer handle that resolves the real serializer on first use.
///
/// Handed out when a type's build re-enters the build protocol for the
/// same type (a record holding a member of its own type). By the time
/// any value flows through it, the primary build has published the real
/// serializer to the repository, so resolution is a plain lookup.
pub struct LazySerializer<T: Packable> {
    owner: Weak<SerializationContext>,
    resolved: OnceLock<Arc<dyn TypeSerializer<T>>>,
}

impl<T: Packable> LazySerializer<T> {
    pub fn new(owner: Weak<SerializationContext>) -> Self {
        Self {
            owner,
            resolved: OnceLock::new(),
        }
    }

    fn resolve(&self) -> Result<&Arc<dyn TypeSerializer<T>>, PackError> {
        if let Some(ser) = self.resolved.get() {
            return Ok(ser);
        }
        let ctx = self.owner.upgrade().ok_or_else(|| {
            PackError::NotRegistered(format!(
                "{} (owning context dropped)",
                type_name::<T>()
            ))
        })?;
        let ser = ctx.serializer_for::<T>()?;
        Ok(self.resolved.get_or_init(|| ser))
    }
}

impl<T: Packable> TypeSerializer<T> for LazySerializer<T> {
    fn pack_core(&self, packer: &mut Packer, value: &T) -> Result<(), PackError> {
        self.resolve()?.pack_core(packer, value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<T, PackError> {
        self.resolve()?.unpack_core(unpacker)
    }

    fn pack_to(&self, packer: &mut Packer, value: &T) -> Result<(), PackError> {
        self.resolve()?.pack_to(packer, value)
    }

    fn unpack_from(&self, unpacker: &mut Unpacker<'_>) -> Result<T, PackError> {
        self.resolve()?.unpack_from(unpacker)
    }

    fn unpack_into(&self, unpacker: &mut Unpacker<'_>, existing: &mut T) -> Result<(), PackError> {
        self.resolve()?.unpack_into(unpacker, existing)
    }

    fn admits_nil(&self) -> bool {
        self.resolve().map(|ser| ser.admits_nil()).unwrap_or(false)
    }

    fn nil_value(&self) -> Result<T, PackError> {
        self.resolve()?.nil_value()
    }

    fn with_enum_method(&self, method: EnumMethod) -> Option<Arc<dyn TypeSerializer<T>>> {
        self.resolve().ok()?.with_enum_method(method)
    }

    fn compat(&self) -> PackerCompat {
        self.resolve()
            .map(|ser| ser.compat())
            .unwrap_or_else(|_| PackerCompat::empty())
    }
}
