//! Serializers for sequences, sets, maps, options and boxes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

use super::contract::{NilImplication, Packable, TypeSerializer};
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::SerializationContext;
use crate::error::PackError;

fn unpack_item<T>(
    item: &Arc<dyn TypeSerializer<T>>,
    policy: NilImplication,
    unpacker: &mut Unpacker<'_>,
) -> Result<T, PackError> {
    if policy == NilImplication::Prohibit && unpacker.try_read_nil()? {
        return Err(PackError::ValueCannotBeNull(item.target_name()));
    }
    item.unpack_from(unpacker)
}

macro_rules! seq_serializer {
    ($name:ident, $coll:ident, $insert:ident, { $($bound:tt)* }) => {
        pub struct $name<T> {
            item: Arc<dyn TypeSerializer<T>>,
            item_nil: NilImplication,
            compat: PackerCompat,
        }

        impl<T: Send + Sync + 'static $($bound)*> $name<T> {
            fn fill(
                &self,
                unpacker: &mut Unpacker<'_>,
                existing: &mut $coll<T>,
            ) -> Result<(), PackError> {
                let count = unpacker.read_array_header()?;
                let mut subtree = unpacker.read_subtree()?;
                for _ in 0..count {
                    let value = subtree.item(|u| unpack_item(&self.item, self.item_nil, u))?;
                    existing.$insert(value);
                }
                subtree.close()
            }
        }

        impl<T: Send + Sync + 'static $($bound)*> TypeSerializer<$coll<T>> for $name<T> {
            fn pack_core(
                &self,
                packer: &mut Packer,
                value: &$coll<T>,
            ) -> Result<(), PackError> {
                packer.pack_array_header(value.len())?;
                for item in value.iter() {
                    self.item.pack_to(packer, item)?;
                }
                Ok(())
            }

            fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<$coll<T>, PackError> {
                let mut out = <$coll<T>>::default();
                self.fill(unpacker, &mut out)?;
                Ok(out)
            }

            fn unpack_into(
                &self,
                unpacker: &mut Unpacker<'_>,
                existing: &mut $coll<T>,
            ) -> Result<(), PackError> {
                if unpacker.try_read_nil()? {
                    return Ok(());
                }
                self.fill(unpacker, existing)
            }

            fn compat(&self) -> PackerCompat {
                self.compat
            }
        }

        impl<T: Packable $($bound)*> Packable for $coll<T> {
            fn build_serializer(
                ctx: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
                Ok(Arc::new($name {
                    item: ctx.serializer_for::<T>()?,
                    item_nil: ctx.options().collection_item_nil,
                    compat: ctx.options().compat,
                }))
            }
        }
    };
}

seq_serializer!(VecSerializer, Vec, push, {});
seq_serializer!(VecDequeSerializer, VecDeque, push_back, {});
seq_serializer!(HashSetSerializer, HashSet, insert, { + Eq + Hash });
seq_serializer!(BTreeSetSerializer, BTreeSet, insert, { + Ord });

macro_rules! map_serializer {
    ($name:ident, $coll:ident, { $($bound:tt)* }) => {
        pub struct $name<K, V> {
            key: Arc<dyn TypeSerializer<K>>,
            value: Arc<dyn TypeSerializer<V>>,
            key_nil: NilImplication,
            item_nil: NilImplication,
            compat: PackerCompat,
        }

        impl<K: Send + Sync + 'static $($bound)*, V: Send + Sync + 'static> $name<K, V> {
            fn fill(
                &self,
                unpacker: &mut Unpacker<'_>,
                existing: &mut $coll<K, V>,
            ) -> Result<(), PackError> {
                let count = unpacker.read_map_header()?;
                let mut subtree = unpacker.read_subtree()?;
                for _ in 0..count {
                    let key = subtree.item(|u| unpack_item(&self.key, self.key_nil, u))?;
                    let value = subtree.item(|u| unpack_item(&self.value, self.item_nil, u))?;
                    existing.insert(key, value);
                }
                subtree.close()
            }
        }

        impl<K: Send + Sync + 'static $($bound)*, V: Send + Sync + 'static>
            TypeSerializer<$coll<K, V>> for $name<K, V>
        {
            fn pack_core(
                &self,
                packer: &mut Packer,
                value: &$coll<K, V>,
            ) -> Result<(), PackError> {
                packer.pack_map_header(value.len())?;
                for (k, v) in value.iter() {
                    self.key.pack_to(packer, k)?;
                    self.value.pack_to(packer, v)?;
                }
                Ok(())
            }

            fn unpack_core(
                &self,
                unpacker: &mut Unpacker<'_>,
            ) -> Result<$coll<K, V>, PackError> {
                let mut out = <$coll<K, V>>::default();
                self.fill(unpacker, &mut out)?;
                Ok(out)
            }

            fn unpack_into(
                &self,
                unpacker: &mut Unpacker<'_>,
                existing: &mut $coll<K, V>,
            ) -> Result<(), PackError> {
                if unpacker.try_read_nil()? {
                    return Ok(());
                }
                self.fill(unpacker, existing)
            }

            fn compat(&self) -> PackerCompat {
                self.compat
            }
        }

        impl<K: Packable $($bound)*, V: Packable> Packable for $coll<K, V> {
            fn build_serializer(
                ctx: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
                Ok(Arc::new($name {
                    key: ctx.serializer_for::<K>()?,
                    value: ctx.serializer_for::<V>()?,
                    key_nil: ctx.options().map_key_nil,
                    item_nil: ctx.options().collection_item_nil,
                    compat: ctx.options().compat,
                }))
            }
        }
    };
}

map_serializer!(HashMapSerializer, HashMap, { + Eq + Hash });
map_serializer!(BTreeMapSerializer, BTreeMap, { + Ord });

/// Nullable wrapper: `None` packs as nil.
pub struct OptionSerializer<T> {
    item: Arc<dyn TypeSerializer<T>>,
    compat: PackerCompat,
}

impl<T: Send + Sync + 'static> TypeSerializer<Option<T>> for OptionSerializer<T> {
    fn pack_core(&self, packer: &mut Packer, value: &Option<T>) -> Result<(), PackError> {
        match value {
            Some(inner) => self.item.pack_to(packer, inner),
            None => {
                packer.pack_nil();
                Ok(())
            }
        }
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Option<T>, PackError> {
        self.item.unpack_from(unpacker).map(Some)
    }

    fn admits_nil(&self) -> bool {
        true
    }

    fn nil_value(&self) -> Result<Option<T>, PackError> {
        Ok(None)
    }

    fn compat(&self) -> PackerCompat {
        self.compat
    }
}

impl<T: Packable> Packable for Option<T> {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(OptionSerializer {
            item: ctx.serializer_for::<T>()?,
            compat: ctx.options().compat,
        }))
    }
}

/// Transparent delegation through a box.
pub struct BoxSerializer<T> {
    inner: Arc<dyn TypeSerializer<T>>,
}

impl<T: Send + Sync + 'static> TypeSerializer<Box<T>> for BoxSerializer<T> {
    fn pack_core(&self, packer: &mut Packer, value: &Box<T>) -> Result<(), PackError> {
        self.inner.pack_core(packer, value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Box<T>, PackError> {
        self.inner.unpack_core(unpacker).map(Box::new)
    }

    fn pack_to(&self, packer: &mut Packer, value: &Box<T>) -> Result<(), PackError> {
        self.inner.pack_to(packer, value)
    }

    fn unpack_from(&self, unpacker: &mut Unpacker<'_>) -> Result<Box<T>, PackError> {
        self.inner.unpack_from(unpacker).map(Box::new)
    }

    fn admits_nil(&self) -> bool {
        self.inner.admits_nil()
    }

    fn nil_value(&self) -> Result<Box<T>, PackError> {
        self.inner.nil_value().map(Box::new)
    }

    fn compat(&self) -> PackerCompat {
        self.inner.compat()
    }
}

impl<T: Packable> Packable for Box<T> {
    fn build_serializer(
        ctx: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
        Ok(Arc::new(BoxSerializer {
            inner: ctx.serializer_for::<T>()?,
        }))
    }
}
