//! A [Binding] associates a [TypeKey] with a single, type-erased construction strategy. Bindings
//! are added to a [ComponentSpecBuilder](crate::component_spec::ComponentSpecBuilder) either as
//! exclusive bindings or as multibindings.

use crate::component::{Component, Dependency, ResolvedDependencies};
use crate::error::InjectorError;
use crate::instance_provider::{downcast, erase, Injectable, InstanceAnyPtr, InstancePtr};
use crate::key::{Key, TypeKey};
use derivative::Derivative;

/// Constructor function for type-erased instances.
pub type ConstructorFn =
    fn(dependencies: &mut ResolvedDependencies) -> Result<InstanceAnyPtr, InjectorError>;

#[cfg(not(feature = "threadsafe"))]
pub type FactoryPtr =
    InstancePtr<dyn Fn(&mut ResolvedDependencies) -> Result<InstanceAnyPtr, InjectorError>>;
#[cfg(feature = "threadsafe")]
pub type FactoryPtr = InstancePtr<
    dyn Fn(&mut ResolvedDependencies) -> Result<InstanceAnyPtr, InjectorError> + Send + Sync,
>;

/// Converts an instance of an alias target into an instance of the alias type.
#[cfg(not(feature = "threadsafe"))]
pub type CastPtr = InstancePtr<dyn Fn(InstanceAnyPtr) -> Result<InstanceAnyPtr, InjectorError>>;
/// Converts an instance of an alias target into an instance of the alias type.
#[cfg(feature = "threadsafe")]
pub type CastPtr =
    InstancePtr<dyn Fn(InstanceAnyPtr) -> Result<InstanceAnyPtr, InjectorError> + Send + Sync>;

/// How to obtain an instance for a bound key.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum BindingStrategy {
    /// Call a [Component] constructor with resolved dependencies.
    Constructor {
        dependencies: Vec<Dependency>,
        #[derivative(Debug = "ignore")]
        constructor: ConstructorFn,
    },
    /// Call a user-supplied closure with resolved dependencies.
    Factory {
        dependencies: Vec<Dependency>,
        #[derivative(Debug = "ignore")]
        factory: FactoryPtr,
    },
    /// Return a previously supplied instance.
    Instance(InstanceAnyPtr),
    /// Resolve another key and convert its instance.
    Alias {
        target: TypeKey,
        #[derivative(Debug = "ignore")]
        cast: CastPtr,
    },
}

/// Construction strategy bound to a key.
#[derive(Clone, Debug)]
pub struct Binding {
    key: TypeKey,
    strategy: BindingStrategy,
}

fn construct_component<T: Component>(
    dependencies: &mut ResolvedDependencies,
) -> Result<InstanceAnyPtr, InjectorError> {
    T::create(dependencies).map(|component| erase(InstancePtr::new(component)))
}

impl Binding {
    /// Creates a binding from a raw strategy.
    pub fn new(key: TypeKey, strategy: BindingStrategy) -> Self {
        Self { key, strategy }
    }

    /// Binds the key to the [Component] constructor of `T`.
    pub fn constructor<T: Component>(key: &Key<T>) -> Self {
        Self::new(
            *key.type_key(),
            BindingStrategy::Constructor {
                dependencies: T::dependencies(),
                constructor: construct_component::<T>,
            },
        )
    }

    /// Binds the key to a factory closure returning a value.
    pub fn factory<T, F>(key: &Key<T>, dependencies: Vec<Dependency>, factory: F) -> Self
    where
        T: Injectable,
        F: Fn(&mut ResolvedDependencies) -> Result<T, InjectorError> + Injectable,
    {
        Self::new(
            *key.type_key(),
            BindingStrategy::Factory {
                dependencies,
                factory: InstancePtr::new(move |dependencies: &mut ResolvedDependencies| {
                    factory(dependencies).map(|instance| erase(InstancePtr::new(instance)))
                }),
            },
        )
    }

    /// Binds the key to a factory closure returning an already shared instance. Useful for
    /// unsized types, e.g. `dyn Trait`.
    pub fn pointer_factory<T, F>(key: &Key<T>, dependencies: Vec<Dependency>, factory: F) -> Self
    where
        T: Injectable + ?Sized,
        F: Fn(&mut ResolvedDependencies) -> Result<InstancePtr<T>, InjectorError> + Injectable,
    {
        Self::new(
            *key.type_key(),
            BindingStrategy::Factory {
                dependencies,
                factory: InstancePtr::new(move |dependencies: &mut ResolvedDependencies| {
                    factory(dependencies).map(erase)
                }),
            },
        )
    }

    /// Binds the key to an existing instance.
    pub fn instance<T: Injectable + ?Sized>(key: &Key<T>, instance: InstancePtr<T>) -> Self {
        Self::new(*key.type_key(), BindingStrategy::Instance(erase(instance)))
    }

    /// Binds the key to the instance bound for `target`, converted with `cast`. Typically used to
    /// bind `dyn Trait` to a concrete implementation:
    ///
    /// ```
    /// use orchard_di::binding::Binding;
    /// use orchard_di::instance_provider::InstancePtr;
    /// use orchard_di::key::Key;
    ///
    /// trait Greeter {}
    ///
    /// struct EnglishGreeter;
    ///
    /// impl Greeter for EnglishGreeter {}
    ///
    /// let binding = Binding::alias(
    ///     &Key::<dyn Greeter + Send + Sync>::new(),
    ///     &Key::<EnglishGreeter>::new(),
    ///     |greeter| greeter as InstancePtr<dyn Greeter + Send + Sync>,
    /// );
    /// ```
    pub fn alias<T, U>(
        key: &Key<T>,
        target: &Key<U>,
        cast: fn(InstancePtr<U>) -> InstancePtr<T>,
    ) -> Self
    where
        T: Injectable + ?Sized,
        U: Injectable + ?Sized,
    {
        let target = *target.type_key();
        Self::new(
            *key.type_key(),
            BindingStrategy::Alias {
                target,
                cast: InstancePtr::new(move |instance: InstanceAnyPtr| {
                    downcast::<U>(&target, &instance).map(|instance| erase(cast(instance)))
                }),
            },
        )
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    pub fn strategy(&self) -> &BindingStrategy {
        &self.strategy
    }

    /// Returns dependencies which need to be resolved before using this binding.
    pub fn dependencies(&self) -> Vec<Dependency> {
        match &self.strategy {
            BindingStrategy::Constructor { dependencies, .. }
            | BindingStrategy::Factory { dependencies, .. } => dependencies.clone(),
            BindingStrategy::Instance(_) => Vec::new(),
            BindingStrategy::Alias { target, .. } => vec![Dependency::Instance(*target)],
        }
    }
}
