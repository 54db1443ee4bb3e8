//! Array-shaped serializers for small tuples.

use std::sync::Arc;

use super::contract::{NilImplication, Packable, TypeSerializer};
use crate::codec::{Packer, PackerCompat, Unpacker};
use crate::context::SerializationContext;
use crate::error::PackError;

fn missing_item<T>(
    item: &Arc<dyn TypeSerializer<T>>,
    policy: NilImplication,
) -> Result<T, PackError> {
    match policy {
        NilImplication::Prohibit => Err(PackError::MissingRequiredValue("tuple item")),
        _ => item.nil_value(),
    }
}

macro_rules! tuple_serializer {
    ($name:ident, $( $t:ident / $field:ident / $idx:tt ),+ ) => {
        pub struct $name<$($t),+> {
            $( $field: Arc<dyn TypeSerializer<$t>>, )+
            nil: NilImplication,
            compat: PackerCompat,
        }

        impl<$($t: Send + Sync + 'static),+> TypeSerializer<($($t,)+)> for $name<$($t),+> {
            fn pack_core(
                &self,
                packer: &mut Packer,
                value: &($($t,)+),
            ) -> Result<(), PackError> {
                const LEN: usize = [$(stringify!($t)),+].len();
                packer.pack_array_header(LEN)?;
                $( self.$field.pack_to(packer, &value.$idx)?; )+
                Ok(())
            }

            fn unpack_core(
                &self,
                unpacker: &mut Unpacker<'_>,
            ) -> Result<($($t,)+), PackError> {
                let count = unpacker.read_array_header()?;
                let mut subtree = unpacker.read_subtree()?;
                let mut taken = 0usize;
                $(
                    let $field: $t = if taken < count {
                        taken += 1;
                        subtree.item(|u| self.$field.unpack_from(u))?
                    } else {
                        missing_item(&self.$field, self.nil)?
                    };
                )+
                subtree.close()?;
                Ok(($($field,)+))
            }

            fn compat(&self) -> PackerCompat {
                self.compat
            }
        }

        impl<$($t: Packable),+> Packable for ($($t,)+) {
            fn build_serializer(
                ctx: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn TypeSerializer<Self>>, PackError> {
                Ok(Arc::new($name {
                    $( $field: ctx.serializer_for::<$t>()?, )+
                    nil: ctx.options().tuple_item_nil,
                    compat: ctx.options().compat,
                }))
            }
        }
    };
}

tuple_serializer!(Tuple1Serializer, A / a / 0);
tuple_serializer!(Tuple2Serializer, A / a / 0, B / b / 1);
tuple_serializer!(Tuple3Serializer, A / a / 0, B / b / 1, C / c / 2);
tuple_serializer!(Tuple4Serializer, A / a / 0, B / b / 1, C / c / 2, D / d / 3);
