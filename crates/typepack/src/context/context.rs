//! The serialization context: options, repository, and the re-entrant
//! memoised build protocol.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Weak};
use std::thread::{self, ThreadId};

use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::options::SerializationOptions;
use super::repository::SerializerRepository;
use crate::error::PackError;
use crate::ser::{LazySerializer, Packable, TypeSerializer};

/// Per-type build lock. The creating thread is the primary builder;
/// everyone else waits here until the build is published.
struct BuildSlot {
    owner: ThreadId,
    done: Mutex<bool>,
    cond: Condvar,
}

impl BuildSlot {
    fn new(owner: ThreadId) -> Self {
        Self {
            owner,
            done: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.cond.wait(&mut done);
        }
    }

    fn finish(&self) {
        *self.done.lock() = true;
        self.cond.notify_all();
    }
}

enum BuildRole {
    Primary(Arc<BuildSlot>),
    Reentrant,
    Waiter(Arc<BuildSlot>),
}

/// Configuration scope and serializer registry.
///
/// Contexts are always handled as `Arc<SerializationContext>`; the
/// serializers a context builds keep only a weak back-reference, so a
/// replaced default context stays collectable.
///
/// Resolution order for [`serializer_for`](Self::serializer_for):
/// repository, then providers of the active flavor, then the build
/// protocol driving [`Packable::build_serializer`].
pub struct SerializationContext {
    options: SerializationOptions,
    repository: SerializerRepository,
    builds: Mutex<HashMap<TypeId, Arc<BuildSlot>>>,
    self_ref: Weak<SerializationContext>,
}

impl SerializationContext {
    pub fn new() -> Arc<Self> {
        Self::with_options(SerializationOptions::new())
    }

    pub fn with_options(options: SerializationOptions) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            options,
            repository: SerializerRepository::new(),
            builds: Mutex::new(HashMap::new()),
            self_ref: weak.clone(),
        })
    }

    pub fn options(&self) -> &SerializationOptions {
        &self.options
    }

    pub fn repository(&self) -> &SerializerRepository {
        &self.repository
    }

    /// A non-owning handle to this context, for serializers that need
    /// to resolve children later.
    pub fn weak(&self) -> Weak<SerializationContext> {
        self.self_ref.clone()
    }

    fn owner_arc(&self) -> Result<Arc<Self>, PackError> {
        self.self_ref
            .upgrade()
            .ok_or_else(|| PackError::NotRegistered("serialization context dropped".to_owned()))
    }

    /// Resolves the serializer for `T`, building and registering one on
    /// first use.
    ///
    /// Concurrent first requests collapse to a single registered
    /// instance. A re-entrant request for a type already being built on
    /// this thread receives a [`LazySerializer`], which breaks the
    /// construction cycle of self-referential types.
    pub fn serializer_for<T: Packable>(&self) -> Result<Arc<dyn TypeSerializer<T>>, PackError> {
        loop {
            if let Some(ser) = self.repository.get::<T>() {
                return Ok(ser);
            }
            if let Some(ser) = self.from_providers::<T>() {
                debug!(ty = type_name::<T>(), "registering provider serializer");
                return Ok(self.repository.register::<T>(ser));
            }

            let role = {
                let mut builds = self.builds.lock();
                match builds.get(&TypeId::of::<T>()) {
                    Some(slot) if slot.owner == thread::current().id() => BuildRole::Reentrant,
                    Some(slot) => BuildRole::Waiter(Arc::clone(slot)),
                    None => {
                        let slot = Arc::new(BuildSlot::new(thread::current().id()));
                        builds.insert(TypeId::of::<T>(), Arc::clone(&slot));
                        BuildRole::Primary(slot)
                    }
                }
            };

            match role {
                BuildRole::Reentrant => {
                    debug!(ty = type_name::<T>(), "re-entrant build, deferring via lazy serializer");
                    return Ok(Arc::new(LazySerializer::<T>::new(self.self_ref.clone())));
                }
                BuildRole::Waiter(slot) => {
                    slot.wait();
                    // Re-query; the primary has published by now.
                }
                BuildRole::Primary(slot) => {
                    debug!(ty = type_name::<T>(), "building serializer");
                    let built = self
                        .owner_arc()
                        .and_then(|owner| T::build_serializer(&owner));
                    let result = built.map(|ser| self.repository.register::<T>(ser));
                    // Only the primary removes the slot, so latecomers
                    // and the primary agree on ownership.
                    self.builds.lock().remove(&TypeId::of::<T>());
                    slot.finish();
                    return result;
                }
            }
        }
    }

    fn from_providers<T: Packable>(&self) -> Option<Arc<dyn TypeSerializer<T>>> {
        let type_id = TypeId::of::<T>();
        self.options
            .providers
            .iter()
            .filter(|(flavor, _)| *flavor == self.options.flavor)
            .find_map(|(_, provider)| provider.provide(type_id))
            .and_then(|erased| {
                erased
                    .downcast_ref::<Arc<dyn TypeSerializer<T>>>()
                    .cloned()
            })
    }

    /// Registers a hand-written serializer for `T` ahead of any build.
    /// Returns the winning instance if one was already registered.
    pub fn register<T: Packable>(
        &self,
        serializer: Arc<dyn TypeSerializer<T>>,
    ) -> Arc<dyn TypeSerializer<T>> {
        self.repository.register::<T>(serializer)
    }

    /// Looks up a registered serializer by runtime type id, type-erased.
    pub fn serializer_erased(
        &self,
        type_id: TypeId,
    ) -> Result<Arc<dyn Any + Send + Sync>, PackError> {
        self.repository
            .get_erased(type_id)
            .ok_or_else(|| PackError::NotRegistered(format!("{type_id:?}")))
    }
}

static DEFAULT_CONTEXT: LazyLock<ArcSwap<SerializationContext>> =
    LazyLock::new(|| ArcSwap::from(SerializationContext::new()));

/// The process-wide default context.
pub fn default_context() -> Arc<SerializationContext> {
    DEFAULT_CONTEXT.load_full()
}

/// Atomically replaces the process-wide default context.
///
/// Serializers already resolved through the previous default keep
/// working; they hold their own configuration and only a weak link to
/// the context that built them.
pub fn set_default_context(ctx: Arc<SerializationContext>) {
    DEFAULT_CONTEXT.store(ctx);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializer_for_memoises() {
        let ctx = SerializationContext::new();
        let a = ctx.serializer_for::<u32>().unwrap();
        let b = ctx.serializer_for::<u32>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(ctx.repository().contains::<u32>());
    }

    #[test]
    fn nested_types_register_their_parts() {
        let ctx = SerializationContext::new();
        ctx.serializer_for::<Vec<Option<String>>>().unwrap();
        assert!(ctx.repository().contains::<Option<String>>());
        assert!(ctx.repository().contains::<String>());
    }

    #[test]
    fn erased_lookup_reports_unregistered_types() {
        let ctx = SerializationContext::new();
        assert!(matches!(
            ctx.serializer_erased(TypeId::of::<u128>()),
            Err(PackError::NotRegistered(_))
        ));
        ctx.serializer_for::<bool>().unwrap();
        assert!(ctx.serializer_erased(TypeId::of::<bool>()).is_ok());
    }

    #[test]
    fn default_context_swaps_atomically() {
        let original = default_context();
        let replacement = SerializationContext::new();
        set_default_context(Arc::clone(&replacement));
        assert!(Arc::ptr_eq(&default_context(), &replacement));
        set_default_context(original);
    }
}
