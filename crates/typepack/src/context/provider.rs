//! Interface for pre-generated serializer backends.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ser::TypeSerializer;

/// An opaque factory of pre-built serializers keyed by type.
///
/// Implementations must return the same instance for the same type on
/// every call and take no other action; the context registers whatever
/// they hand back, after which the repository serves all lookups.
pub trait SerializerProvider: Send + Sync {
    /// The serializer for `type_id`, type-erased as an
    /// `Arc<dyn Any + Send + Sync>` wrapping an
    /// `Arc<dyn TypeSerializer<T>>`.
    fn provide(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// A provider over a fixed table of hand-built serializers.
#[derive(Default)]
pub struct PrebuiltProvider {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl PrebuiltProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a serializer for `T`. Later inserts for the same type win;
    /// the table is fixed once the provider is handed to a context.
    pub fn insert<T: 'static>(&mut self, serializer: Arc<dyn TypeSerializer<T>>) {
        self.entries
            .insert(TypeId::of::<T>(), Arc::new(serializer));
    }
}

impl SerializerProvider for PrebuiltProvider {
    fn provide(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(&type_id).cloned()
    }
}
