//! One of the basic blocks of dependency injection is a [Component]. Components are injectable
//! types which know how to construct themselves from their dependencies. Dependencies are declared
//! up front, so the binding graph can be validated before anything gets constructed:
//!
//! ```
//! use orchard_di::component::{Component, Dependency, ResolvedDependencies};
//! use orchard_di::instance_provider::InstancePtr;
//! use orchard_di::key::Key;
//! use orchard_di::provider::Provider;
//! use orchard_di::InjectorError;
//!
//! struct Fast;
//!
//! struct Engine;
//!
//! impl Component for Engine {
//!     fn create(_dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
//!         Ok(Engine)
//!     }
//! }
//!
//! struct Car {
//!     engine: InstancePtr<Engine>,
//!     // resolved only when asked for
//!     spare_engine: Provider<Engine>,
//! }
//!
//! impl Component for Car {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![
//!             Dependency::instance(&Key::<Engine>::new()),
//!             Dependency::provider(&Key::<Engine>::tagged::<Fast>()),
//!         ]
//!     }
//!
//!     fn create(dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
//!         Ok(Car {
//!             engine: dependencies.instance()?,
//!             spare_engine: dependencies.provider()?,
//!         })
//!     }
//! }
//! ```
//!
//! ## Dependency kinds
//!
//! * [Dependency::Instance] - an exclusively bound instance, constructed before the dependent
//! component
//! * [Dependency::Provider] - a deferred [Provider] handle; the target is not constructed until
//! the provider is resolved, which also makes it possible to break construction cycles
//! * [Dependency::Multibindings] - all multibindings registered for a given key, in registration
//! order (possibly none)
//! * [Dependency::Factory] - a [Factory] handle creating a new instance on every call; like
//! providers, factories don't take part in construction cycles

use crate::error::InjectorError;
use crate::factory::Factory;
use crate::graph::EdgeKind;
use crate::instance_provider::{
    downcast, Injectable, InstanceAnyPtr, InstancePtr, WeakResolverPtr,
};
use crate::key::{Key, TypeKey};
use crate::provider::Provider;
use std::any::type_name;
use std::vec::IntoIter;

/// Base trait for components constructed by the [Injector](crate::injector::Injector).
pub trait Component: Injectable + Sized {
    /// Declares dependencies, which will be resolved in the given order and passed to
    /// [Component::create]. Defaults to no dependencies.
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// Creates an instance of this component from resolved dependencies.
    fn create(dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError>;
}

/// A single declared dependency.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Dependency {
    Instance(TypeKey),
    Provider(TypeKey),
    Multibindings(TypeKey),
    Factory(TypeKey),
}

impl Dependency {
    pub fn instance<T: ?Sized>(key: &Key<T>) -> Self {
        Self::Instance(*key.type_key())
    }

    pub fn provider<T: ?Sized>(key: &Key<T>) -> Self {
        Self::Provider(*key.type_key())
    }

    pub fn multibindings<T: ?Sized>(key: &Key<T>) -> Self {
        Self::Multibindings(*key.type_key())
    }

    pub fn factory<T: ?Sized>(key: &Key<T>) -> Self {
        Self::Factory(*key.type_key())
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        match self {
            Self::Instance(key)
            | Self::Provider(key)
            | Self::Multibindings(key)
            | Self::Factory(key) => key,
        }
    }

    /// Returns the kind of graph edge this dependency forms.
    pub fn edge_kind(&self) -> EdgeKind {
        match self {
            Self::Instance(_) => EdgeKind::Direct,
            Self::Provider(_) => EdgeKind::Deferred,
            Self::Multibindings(_) => EdgeKind::Multibinding,
            Self::Factory(_) => EdgeKind::Factory,
        }
    }
}

pub(crate) enum ResolvedDependency {
    Instance(InstanceAnyPtr),
    Provider(WeakResolverPtr),
    Multibindings(Vec<InstanceAnyPtr>),
    Factory(WeakResolverPtr),
}

/// Dependencies resolved for a constructor, consumed in declaration order.
pub struct ResolvedDependencies {
    dependencies: IntoIter<(TypeKey, ResolvedDependency)>,
}

impl ResolvedDependencies {
    pub(crate) fn new(dependencies: Vec<(TypeKey, ResolvedDependency)>) -> Self {
        Self {
            dependencies: dependencies.into_iter(),
        }
    }

    /// Takes the next dependency, which should be declared as [Dependency::Instance].
    pub fn instance<T: Injectable + ?Sized>(&mut self) -> Result<InstancePtr<T>, InjectorError> {
        match self.dependencies.next() {
            Some((key, ResolvedDependency::Instance(instance))) => downcast(&key, &instance),
            _ => Err(InjectorError::DependencyMismatch(type_name::<T>())),
        }
    }

    /// Takes the next dependency, which should be declared as [Dependency::Provider].
    pub fn provider<T: Injectable + ?Sized>(&mut self) -> Result<Provider<T>, InjectorError> {
        match self.dependencies.next() {
            Some((key, ResolvedDependency::Provider(resolver))) => {
                Ok(Provider::new(resolver, key))
            }
            _ => Err(InjectorError::DependencyMismatch(type_name::<T>())),
        }
    }

    /// Takes the next dependency, which should be declared as [Dependency::Multibindings].
    pub fn multibindings<T: Injectable + ?Sized>(
        &mut self,
    ) -> Result<Vec<InstancePtr<T>>, InjectorError> {
        match self.dependencies.next() {
            Some((key, ResolvedDependency::Multibindings(instances))) => instances
                .iter()
                .map(|instance| downcast(&key, instance))
                .collect(),
            _ => Err(InjectorError::DependencyMismatch(type_name::<T>())),
        }
    }

    /// Takes the next dependency, which should be declared as [Dependency::Factory].
    pub fn factory<T: Injectable + ?Sized>(&mut self) -> Result<Factory<T>, InjectorError> {
        match self.dependencies.next() {
            Some((key, ResolvedDependency::Factory(resolver))) => Ok(Factory::new(resolver, key)),
            _ => Err(InjectorError::DependencyMismatch(type_name::<T>())),
        }
    }

    /// Returns the number of dependencies not consumed yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.dependencies.len()
    }
}
