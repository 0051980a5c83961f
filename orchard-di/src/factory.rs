//! Handles creating new instances on demand. Where a [Provider](crate::provider::Provider) always
//! returns the instance cached by its injector, a [Factory] runs the binding again on every call.
//! Dependencies of the created instances are still resolved through the injector, so they are
//! shared as usual.

use crate::error::InjectorError;
use crate::instance_provider::{downcast, Injectable, InstancePtr, WeakResolverPtr};
use crate::key::TypeKey;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// Handle creating new instances of `T`. Bindings to existing instances always produce the bound
/// instance, and aliases create a new instance of their target.
///
/// Like providers, factories keep only a weak reference to their injector.
pub struct Factory<T: ?Sized> {
    resolver: WeakResolverPtr,
    key: TypeKey,
    _phantom: PhantomData<fn() -> InstancePtr<T>>,
}

impl<T: Injectable + ?Sized> Factory<T> {
    pub(crate) fn new(resolver: WeakResolverPtr, key: TypeKey) -> Self {
        Self {
            resolver,
            key,
            _phantom: PhantomData,
        }
    }

    /// Creates a new instance, bypassing the injector's cache.
    pub fn create(&self) -> Result<InstancePtr<T>, InjectorError> {
        let resolver = self
            .resolver
            .upgrade()
            .ok_or(InjectorError::InjectorDropped(self.key))?;

        resolver
            .create_instance(&self.key)
            .and_then(|instance| downcast(&self.key, &instance))
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }
}

impl<T: ?Sized> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            key: self.key,
            _phantom: PhantomData,
        }
    }
}

impl<T: ?Sized> Debug for Factory<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::InjectorError;
    use crate::factory::Factory;
    use crate::instance_provider::{erase, InstancePtr, MockInstanceResolver, WeakResolverPtr};
    use crate::key::{Key, TypeKey};
    use mockall::predicate::*;
    use std::sync::atomic::{AtomicU8, Ordering};

    struct Annotation;

    #[test]
    fn should_create_through_resolver() {
        let key = Key::<u8>::tagged::<Annotation>();
        let counter = AtomicU8::new(0);

        let mut resolver = MockInstanceResolver::new();
        resolver
            .expect_create_instance()
            .with(eq(*key.type_key()))
            .times(2)
            .returning(move |_| {
                Ok(erase(InstancePtr::new(
                    counter.fetch_add(1, Ordering::SeqCst),
                )))
            });
        resolver.expect_instance().never();

        let resolver = InstancePtr::new(resolver);
        let weak = InstancePtr::downgrade(&resolver) as WeakResolverPtr;
        let factory = Factory::<u8>::new(weak, *key.type_key());

        assert_eq!(*factory.create().unwrap(), 0);
        assert_eq!(*factory.clone().create().unwrap(), 1);
    }

    #[test]
    fn should_fail_after_resolver_is_dropped() {
        let resolver = InstancePtr::new(MockInstanceResolver::new());
        let weak = InstancePtr::downgrade(&resolver) as WeakResolverPtr;
        let factory = Factory::<u8>::new(weak, TypeKey::of::<u8>());

        drop(resolver);

        assert!(matches!(
            factory.create().unwrap_err(),
            InjectorError::InjectorDropped(key) if key == TypeKey::of::<u8>()
        ));
    }
}
