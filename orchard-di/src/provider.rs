//! Deferred access to instances. A [Provider] is injected instead of the instance itself, when the
//! instance is expensive to construct, might not be needed at all, or when two bindings need to
//! refer to each other.

use crate::error::InjectorError;
use crate::instance_provider::{downcast, Injectable, InstancePtr, WeakResolverPtr};
use crate::key::TypeKey;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// Handle resolving an instance of `T` on demand. Every call to [Provider::resolve] returns the
/// same instance as the owning [Injector](crate::injector::Injector) would.
///
/// Providers keep only a weak reference to their injector, so they don't keep it alive by
/// themselves.
pub struct Provider<T: ?Sized> {
    resolver: WeakResolverPtr,
    key: TypeKey,
    _phantom: PhantomData<fn() -> InstancePtr<T>>,
}

impl<T: Injectable + ?Sized> Provider<T> {
    pub(crate) fn new(resolver: WeakResolverPtr, key: TypeKey) -> Self {
        Self {
            resolver,
            key,
            _phantom: PhantomData,
        }
    }

    /// Returns the instance, constructing it and its dependencies on first access.
    pub fn resolve(&self) -> Result<InstancePtr<T>, InjectorError> {
        let resolver = self
            .resolver
            .upgrade()
            .ok_or(InjectorError::InjectorDropped(self.key))?;

        resolver
            .instance(&self.key)
            .and_then(|instance| downcast(&self.key, &instance))
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }
}

impl<T: ?Sized> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            key: self.key,
            _phantom: PhantomData,
        }
    }
}

impl<T: ?Sized> Debug for Provider<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("key", &self.key).finish()
    }
}
