//! Context configuration.

use std::sync::Arc;

use super::provider::SerializerProvider;
use crate::codec::PackerCompat;
use crate::ser::NilImplication;

/// Aggregate encoding shape for record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializationMethod {
    /// Member-name keys; tolerant of reordering and additions.
    #[default]
    Map,
    /// Positional values in declaration order; compact.
    Array,
}

/// Enum encoding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumMethod {
    /// The variant's declared name as a string.
    #[default]
    ByName,
    /// The underlying integer.
    ByUnderlyingValue,
}

/// Which group of pre-generated serializer providers the context
/// consults. Orthogonal to behaviour: providers only change where a
/// serializer instance comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderFlavor {
    #[default]
    Precompiled,
    Handwritten,
}

/// Options captured when a context is created.
///
/// Serializers read options once at build time; changing options for
/// already-built types requires a fresh context.
#[derive(Clone)]
pub struct SerializationOptions {
    pub compat: PackerCompat,
    pub method: SerializationMethod,
    pub enum_method: EnumMethod,
    /// Nil handling for collection items. Default: `Null`.
    pub collection_item_nil: NilImplication,
    /// Nil handling for map keys. Default: `Prohibit`.
    pub map_key_nil: NilImplication,
    /// Nil handling for tuple items. Default: `Null`.
    pub tuple_item_nil: NilImplication,
    /// Which provider group to consult before building.
    pub flavor: ProviderFlavor,
    /// Pre-generated serializer backends, each tagged with the flavor
    /// that activates it.
    pub providers: Vec<(ProviderFlavor, Arc<dyn SerializerProvider>)>,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializationOptions {
    pub fn new() -> Self {
        Self {
            compat: PackerCompat::empty(),
            method: SerializationMethod::Map,
            enum_method: EnumMethod::ByName,
            collection_item_nil: NilImplication::Null,
            map_key_nil: NilImplication::Prohibit,
            tuple_item_nil: NilImplication::Null,
            flavor: ProviderFlavor::Precompiled,
            providers: Vec::new(),
        }
    }
}
