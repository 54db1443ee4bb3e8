//! Declarative derivation of serializer member tables.
//!
//! Without runtime reflection, member discovery happens at compile
//! time: [`packable_record!`] emits a binder per field and
//! [`packable_enum!`] emits variant name/value tables. Both attach a
//! [`Packable`](crate::Packable) implementation to an already-defined
//! type.

/// Declares a struct as a packable record.
///
/// Each member is `field [as "WireName"] : Type [=> policy]` where the
/// policy token is one of `default`, `nil`, `prohibit` (nil
/// implication) or `by_name` / `by_value` (enum method override for
/// this member). The struct must implement `Default`; the `nil` policy
/// requires a member type with a nil value (`Option<_>` or
/// `MsgPackValue`) and fails to compile otherwise.
///
/// ```
/// use typepack::packable_record;
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Account {
///     id: u64,
///     name: String,
///     tags: Option<Vec<String>>,
/// }
///
/// packable_record! {
///     Account {
///         id: u64 => prohibit,
///         name as "Name": String,
///         tags: Option<Vec<String>> => nil,
///     }
/// }
/// ```
#[macro_export]
macro_rules! packable_record {
    ($ty:ident { $( $field:ident $( as $wire:literal )? : $fty:ty $( => $policy:ident )? ),+ $(,)? }) => {
        impl $crate::Packable for $ty {
            fn build_serializer(
                ctx: &::std::sync::Arc<$crate::SerializationContext>,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn $crate::TypeSerializer<Self>>,
                $crate::PackError,
            > {
                let binders: &[$crate::ser::MemberBinder<$ty>] = &[
                    $(
                        $crate::packable_record!(
                            @member $ty, $field, ( $( $wire )? ), $fty, ( $( $policy )? )
                        )
                    ),+
                ];
                ::std::result::Result::Ok(::std::sync::Arc::new(
                    $crate::ser::RecordSerializer::build(ctx, binders)?,
                ))
            }
        }
    };

    (@member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, ()) => {
        $crate::packable_record!(@member $ty, $field, ( $( $wire )? ), $fty, (default))
    };

    (@member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, (default)) => {
        |ctx: &::std::sync::Arc<$crate::SerializationContext>| {
            let ser = ctx.serializer_for::<$fty>()?;
            let name: &'static str = $crate::packable_record!(@name $field, ( $( $wire )? ));
            ::std::result::Result::Ok($crate::ser::BoundMember::<$ty> {
                name,
                pack: {
                    let ser = ::std::sync::Arc::clone(&ser);
                    ::std::boxed::Box::new(move |p: &mut $crate::Packer, v: &$ty| {
                        ser.pack_to(p, &v.$field)
                    })
                },
                unpack: ::std::boxed::Box::new(move |u: &mut $crate::Unpacker<'_>, v: &mut $ty| {
                    if u.try_read_nil()? {
                        return ::std::result::Result::Ok(());
                    }
                    v.$field = ser.unpack_from(u)?;
                    ::std::result::Result::Ok(())
                }),
                apply_missing: ::std::boxed::Box::new(|_v: &mut $ty| ::std::result::Result::Ok(())),
            })
        }
    };

    (@member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, (nil)) => {
        |ctx: &::std::sync::Arc<$crate::SerializationContext>| {
            let ser = ctx.serializer_for::<$fty>()?;
            let name: &'static str = $crate::packable_record!(@name $field, ( $( $wire )? ));
            ::std::result::Result::Ok($crate::ser::BoundMember::<$ty> {
                name,
                pack: {
                    let ser = ::std::sync::Arc::clone(&ser);
                    ::std::boxed::Box::new(move |p: &mut $crate::Packer, v: &$ty| {
                        ser.pack_to(p, &v.$field)
                    })
                },
                unpack: ::std::boxed::Box::new(move |u: &mut $crate::Unpacker<'_>, v: &mut $ty| {
                    if u.try_read_nil()? {
                        v.$field = $crate::ser::nil_of::<$fty>();
                        return ::std::result::Result::Ok(());
                    }
                    v.$field = ser.unpack_from(u)?;
                    ::std::result::Result::Ok(())
                }),
                apply_missing: ::std::boxed::Box::new(|v: &mut $ty| {
                    v.$field = $crate::ser::nil_of::<$fty>();
                    ::std::result::Result::Ok(())
                }),
            })
        }
    };

    (@member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, (prohibit)) => {
        |ctx: &::std::sync::Arc<$crate::SerializationContext>| {
            let ser = ctx.serializer_for::<$fty>()?;
            let name: &'static str = $crate::packable_record!(@name $field, ( $( $wire )? ));
            ::std::result::Result::Ok($crate::ser::BoundMember::<$ty> {
                name,
                pack: {
                    let ser = ::std::sync::Arc::clone(&ser);
                    ::std::boxed::Box::new(move |p: &mut $crate::Packer, v: &$ty| {
                        ser.pack_to(p, &v.$field)
                    })
                },
                unpack: ::std::boxed::Box::new(move |u: &mut $crate::Unpacker<'_>, v: &mut $ty| {
                    if u.try_read_nil()? {
                        return ::std::result::Result::Err(
                            $crate::PackError::MissingRequiredValue(name),
                        );
                    }
                    v.$field = ser.unpack_from(u)?;
                    ::std::result::Result::Ok(())
                }),
                apply_missing: ::std::boxed::Box::new(move |_v: &mut $ty| {
                    ::std::result::Result::Err($crate::PackError::MissingRequiredValue(name))
                }),
            })
        }
    };

    (@member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, (by_name)) => {
        $crate::packable_record!(@enum_member $ty, $field, ( $( $wire )? ), $fty, ByName)
    };

    (@member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, (by_value)) => {
        $crate::packable_record!(@enum_member $ty, $field, ( $( $wire )? ), $fty, ByUnderlyingValue)
    };

    (@enum_member $ty:ident, $field:ident, ( $( $wire:literal )? ), $fty:ty, $method:ident) => {
        |ctx: &::std::sync::Arc<$crate::SerializationContext>| {
            let base = ctx.serializer_for::<$fty>()?;
            // The override is a shallow clone; the canonical serializer
            // stays in the repository.
            let ser = base
                .with_enum_method($crate::EnumMethod::$method)
                .unwrap_or(base);
            let name: &'static str = $crate::packable_record!(@name $field, ( $( $wire )? ));
            ::std::result::Result::Ok($crate::ser::BoundMember::<$ty> {
                name,
                pack: {
                    let ser = ::std::sync::Arc::clone(&ser);
                    ::std::boxed::Box::new(move |p: &mut $crate::Packer, v: &$ty| {
                        ser.pack_to(p, &v.$field)
                    })
                },
                unpack: ::std::boxed::Box::new(move |u: &mut $crate::Unpacker<'_>, v: &mut $ty| {
                    if u.try_read_nil()? {
                        return ::std::result::Result::Ok(());
                    }
                    v.$field = ser.unpack_from(u)?;
                    ::std::result::Result::Ok(())
                }),
                apply_missing: ::std::boxed::Box::new(|_v: &mut $ty| ::std::result::Result::Ok(())),
            })
        }
    };

    (@name $field:ident, ()) => {
        ::std::stringify!($field)
    };
    (@name $field:ident, ($wire:literal)) => {
        $wire
    };
}

/// Declares a unit enum as packable, with its underlying integer type
/// and explicit discriminants.
///
/// ```
/// use typepack::packable_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Color {
///     Red = 0,
///     Green = 1,
///     Blue = 2,
/// }
///
/// packable_enum! {
///     Color: u8 {
///         Red = 0,
///         Green = 1,
///         Blue = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! packable_enum {
    ($ty:ident : $repr:ty { $( $variant:ident = $val:expr ),+ $(,)? }) => {
        impl $crate::ser::PackableEnum for $ty {
            const ENUM_NAME: &'static str = ::std::stringify!($ty);

            fn name_of(self) -> &'static str {
                match self {
                    $( $ty::$variant => ::std::stringify!($variant), )+
                }
            }

            fn from_name(name: &str) -> ::std::option::Option<Self> {
                $(
                    if name == ::std::stringify!($variant) {
                        return ::std::option::Option::Some($ty::$variant);
                    }
                )+
                ::std::option::Option::None
            }

            fn to_underlying(self) -> i64 {
                match self {
                    $( $ty::$variant => $val as i64, )+
                }
            }

            fn from_underlying(value: i64) -> ::std::option::Option<Self> {
                $(
                    if value == $val as i64 {
                        return ::std::option::Option::Some($ty::$variant);
                    }
                )+
                ::std::option::Option::None
            }

            fn underlying_fits(value: i64) -> bool {
                <$repr as ::std::convert::TryFrom<i64>>::try_from(value).is_ok()
            }
        }

        impl $crate::Packable for $ty {
            fn build_serializer(
                ctx: &::std::sync::Arc<$crate::SerializationContext>,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn $crate::TypeSerializer<Self>>,
                $crate::PackError,
            > {
                $crate::ser::build_enum_serializer::<$ty>(ctx)
            }
        }
    };
}
