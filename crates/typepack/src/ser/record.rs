//! Member-table serializer for user aggregate types.
//!
//! [`packable_record!`](crate::packable_record) emits a binder per
//! member; binding resolves each member's child serializer through the
//! owning context and captures typed pack/unpack closures. The record
//! then drives the codec over its members in declaration order.

use std::sync::{Arc, Weak};

use super::contract::TypeSerializer;
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::{SerializationContext, SerializationMethod};
use crate::error::PackError;

/// One member after binding: wire name plus typed accessors.
pub struct BoundMember<T> {
    pub name: &'static str,
    pub pack: Box<dyn Fn(&mut Packer, &T) -> Result<(), PackError> + Send + Sync>,
    pub unpack: Box<dyn Fn(&mut Unpacker<'_>, &mut T) -> Result<(), PackError> + Send + Sync>,
    /// Applied when an array-shaped stream ends before this member.
    pub apply_missing: Box<dyn Fn(&mut T) -> Result<(), PackError> + Send + Sync>,
}

/// Resolves one member against a context; emitted by the record macro.
pub type MemberBinder<T> =
    fn(&Arc<SerializationContext>) -> Result<BoundMember<T>, PackError>;

/// Map- or array-shaped serializer over a bound member table.
pub struct RecordSerializer<T> {
    members: Vec<BoundMember<T>>,
    method: SerializationMethod,
    compat: PackerCompat,
    /// Non-owning link back to the owner; keeps a replaced default
    /// context collectable.
    #[allow(dead_code)]
    owner: Weak<SerializationContext>,
}

impl<T: Default + Send + Sync + 'static> RecordSerializer<T> {
    /// Binds every member against `ctx` and captures the context's
    /// encoding options.
    pub fn build(
        ctx: &Arc<SerializationContext>,
        binders: &[MemberBinder<T>],
    ) -> Result<Self, PackError> {
        let members = binders
            .iter()
            .map(|bind| bind(ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            members,
            method: ctx.options().method,
            compat: ctx.options().compat,
            owner: Arc::downgrade(ctx),
        })
    }

    fn unpack_map_shape(
        &self,
        unpacker: &mut Unpacker<'_>,
        instance: &mut T,
    ) -> Result<(), PackError> {
        let count = unpacker.items_count()?;
        let mut subtree = unpacker.read_subtree()?;
        for _ in 0..count {
            let key = subtree.read_str()?;
            let member = key
                .try_str()
                .and_then(|name| self.members.iter().find(|m| m.name == name));
            match member {
                Some(m) => subtree.item(|u| (m.unpack)(u, instance))?,
                // Unknown member names are skipped: additions on the
                // wire must not break older readers.
                None => subtree.skip_item()?,
            }
        }
        subtree.close()
    }

    fn unpack_array_shape(
        &self,
        unpacker: &mut Unpacker<'_>,
        instance: &mut T,
    ) -> Result<(), PackError> {
        let count = unpacker.items_count()?;
        let mut subtree = unpacker.read_subtree()?;
        for (index, member) in self.members.iter().enumerate() {
            if index < count {
                subtree.item(|u| (member.unpack)(u, instance))?;
            } else {
                (member.apply_missing)(instance)?;
            }
        }
        // Entries beyond the member count are skipped on close.
        subtree.close()
    }
}

impl<T: Default + Send + Sync + 'static> TypeSerializer<T> for RecordSerializer<T> {
    fn pack_core(&self, packer: &mut Packer, value: &T) -> Result<(), PackError> {
        match self.method {
            SerializationMethod::Map => {
                packer.pack_map_header(self.members.len())?;
                for member in &self.members {
                    packer.pack_str(member.name)?;
                    (member.pack)(packer, value)?;
                }
            }
            SerializationMethod::Array => {
                packer.pack_array_header(self.members.len())?;
                for member in &self.members {
                    (member.pack)(packer, value)?;
                }
            }
        }
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<T, PackError> {
        let mut instance = T::default();
        if !unpacker.read()? {
            return Err(PackError::EndOfStream);
        }
        if unpacker.is_map_header() {
            self.unpack_map_shape(unpacker, &mut instance)?;
        } else if unpacker.is_array_header() {
            self.unpack_array_shape(unpacker, &mut instance)?;
        } else {
            return Err(PackError::MessageTypeMismatch {
                expected: "map or array header",
                found: unpacker
                    .last_read()
                    .map_or("nothing", |token| token.kind_name()),
            });
        }
        Ok(instance)
    }

    fn compat(&self) -> PackerCompat {
        self.compat
    }
}

// Tests live in tests/record_matrix.rs, where record types can be
// declared through the public macro surface.
