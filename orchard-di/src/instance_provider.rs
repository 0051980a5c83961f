//! Pointer types used to hold instances and the generic [InstanceResolver] abstraction used by
//! [Provider](crate::provider::Provider)s, [Factory](crate::factory::Factory) handles and
//! [Injector](crate::injector::Injector)s.

use crate::error::InjectorError;
use crate::key::{Key, TypeKey};
#[cfg(test)]
use mockall::automock;
use std::any::Any;
use std::error::Error;
#[cfg(not(feature = "threadsafe"))]
use std::rc::{Rc, Weak};
#[cfg(feature = "threadsafe")]
use std::sync::{Arc, Weak};

#[cfg(not(feature = "threadsafe"))]
pub type InstancePtr<T> = Rc<T>;
#[cfg(feature = "threadsafe")]
pub type InstancePtr<T> = Arc<T>;

/// Type-erased instance. Always contains an [InstancePtr] to the actual instance, which makes it
/// possible to store unsized instances, e.g. `dyn Trait`.
#[cfg(not(feature = "threadsafe"))]
pub type InstanceAnyPtr = InstancePtr<dyn Any + 'static>;
#[cfg(feature = "threadsafe")]
pub type InstanceAnyPtr = InstancePtr<dyn Any + Send + Sync + 'static>;

#[cfg(not(feature = "threadsafe"))]
pub type ErrorPtr = InstancePtr<dyn Error + 'static>;
#[cfg(feature = "threadsafe")]
pub type ErrorPtr = InstancePtr<dyn Error + Send + Sync + 'static>;

#[cfg(not(feature = "threadsafe"))]
pub type WeakResolverPtr = Weak<dyn InstanceResolver>;
#[cfg(feature = "threadsafe")]
pub type WeakResolverPtr = Weak<dyn InstanceResolver + Send + Sync>;

/// Marker trait for types which can be bound and injected. With the `threadsafe` feature, all
/// injectable types need to be `Send + Sync`.
#[cfg(not(feature = "threadsafe"))]
pub trait Injectable: 'static {}
#[cfg(not(feature = "threadsafe"))]
impl<T: ?Sized + 'static> Injectable for T {}

/// Marker trait for types which can be bound and injected. With the `threadsafe` feature, all
/// injectable types need to be `Send + Sync`.
#[cfg(feature = "threadsafe")]
pub trait Injectable: Send + Sync + 'static {}
#[cfg(feature = "threadsafe")]
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Generic resolver of type-erased instances.
#[cfg_attr(test, automock)]
pub trait InstanceResolver {
    /// Returns the instance bound exclusively to the given key, constructing it on first access.
    fn instance(&self, key: &TypeKey) -> Result<InstanceAnyPtr, InjectorError>;

    /// Returns all instances registered as multibindings for the given key, in registration
    /// order.
    fn multibinding_instances(&self, key: &TypeKey)
        -> Result<Vec<InstanceAnyPtr>, InjectorError>;

    /// Creates a new instance for the exclusive binding of the given key, without caching it.
    fn create_instance(&self, key: &TypeKey) -> Result<InstanceAnyPtr, InjectorError>;
}

/// Helper trait for [InstanceResolver] providing strongly-typed access.
pub trait TypedInstanceResolver {
    /// Typesafe version of [InstanceResolver::instance].
    fn instance_typed<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<InstancePtr<T>, InjectorError>;

    /// Typesafe version of [InstanceResolver::multibinding_instances].
    fn multibinding_instances_typed<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<Vec<InstancePtr<T>>, InjectorError>;
}

impl<R: InstanceResolver + ?Sized> TypedInstanceResolver for R {
    fn instance_typed<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<InstancePtr<T>, InjectorError> {
        self.instance(key.type_key())
            .and_then(|instance| downcast(key.type_key(), &instance))
    }

    fn multibinding_instances_typed<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<Vec<InstancePtr<T>>, InjectorError> {
        self.multibinding_instances(key.type_key())?
            .iter()
            .map(|instance| downcast(key.type_key(), instance))
            .collect()
    }
}

/// Wraps a typed instance into its type-erased form.
#[inline]
pub fn erase<T: Injectable + ?Sized>(instance: InstancePtr<T>) -> InstanceAnyPtr {
    InstancePtr::new(instance) as InstanceAnyPtr
}

/// Recovers a typed instance from its type-erased form.
pub fn downcast<T: Injectable + ?Sized>(
    key: &TypeKey,
    instance: &InstanceAnyPtr,
) -> Result<InstancePtr<T>, InjectorError> {
    instance
        .downcast_ref::<InstancePtr<T>>()
        .cloned()
        .ok_or(InjectorError::IncompatibleInstance(*key))
}
