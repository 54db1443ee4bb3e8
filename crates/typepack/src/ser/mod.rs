//! The serializer layer: the typed contract, built-in serializers, and
//! the record/enum/lazy machinery.

pub mod blobs;
pub mod collections;
pub mod contract;
pub mod dynamic;
pub mod enums;
pub mod lazy;
pub mod primitives;
pub mod record;
pub mod tuples;

pub use contract::{nil_of, AdmitsNil, NilImplication, Packable, SerializerExt, TypeSerializer};
pub use enums::{build_enum_serializer, EnumSerializer, PackableEnum};
pub use lazy::LazySerializer;
pub use record::{BoundMember, MemberBinder, RecordSerializer};
