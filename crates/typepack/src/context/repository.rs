//! Type-keyed serializer storage with race-collapsing registration.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::ser::TypeSerializer;

/// One published serializer, type-erased for storage.
///
/// The inner `Any` wraps an `Arc<dyn TypeSerializer<T>>` for the `T`
/// the entry is keyed by; entries are never replaced or mutated after
/// publication.
#[derive(Clone)]
struct Registration {
    type_name: &'static str,
    erased: Arc<dyn Any + Send + Sync>,
}

/// Mapping `TypeId → serializer` with concurrent readers.
///
/// Registration goes through the map's entry API, so when several
/// threads finish building a serializer for the same type at once,
/// exactly one instance wins and every caller receives it.
#[derive(Default)]
pub struct SerializerRepository {
    table: DashMap<TypeId, Registration>,
}

impl SerializerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.table.contains_key(&TypeId::of::<T>())
    }

    /// Looks up the serializer registered for `T`.
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn TypeSerializer<T>>> {
        let entry = self.table.get(&TypeId::of::<T>())?;
        trace!(type_name = entry.type_name, "repository hit");
        entry
            .erased
            .downcast_ref::<Arc<dyn TypeSerializer<T>>>()
            .cloned()
    }

    /// Registers `serializer` for `T` unless one is already present.
    /// Returns the winning instance either way.
    pub fn register<T: 'static>(
        &self,
        serializer: Arc<dyn TypeSerializer<T>>,
    ) -> Arc<dyn TypeSerializer<T>> {
        let entry = self
            .table
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Registration {
                type_name: std::any::type_name::<T>(),
                erased: Arc::new(Arc::clone(&serializer)),
            });
        entry
            .erased
            .downcast_ref::<Arc<dyn TypeSerializer<T>>>()
            .cloned()
            // The key is T's own TypeId, so the stored type always
            // matches; the fallback keeps this panic-free regardless.
            .unwrap_or(serializer)
    }

    /// The type-erased entry for a runtime type id, if registered.
    pub fn get_erased(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.table.get(&type_id).map(|entry| entry.erased.clone())
    }

    /// The registered type's name, for diagnostics.
    pub fn type_name_of(&self, type_id: TypeId) -> Option<&'static str> {
        self.table.get(&type_id).map(|entry| entry.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::primitives::BoolSerializer;

    #[test]
    fn register_collapses_to_first_instance() {
        let repo = SerializerRepository::new();
        let first = repo.register::<bool>(Arc::new(BoolSerializer));
        let second = repo.register::<bool>(Arc::new(BoolSerializer));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.len(), 1);
        assert!(repo.contains::<bool>());
    }

    #[test]
    fn get_returns_typed_handle() {
        let repo = SerializerRepository::new();
        assert!(repo.get::<bool>().is_none());
        repo.register::<bool>(Arc::new(BoolSerializer));
        assert!(repo.get::<bool>().is_some());
        assert!(repo.get::<u8>().is_none());
    }
}
