//! The [Injector] is the runtime part of dependency injection. It is created from a validated
//! [BindingGraph] and lazily constructs instances when they are requested, either directly or as
//! dependencies of other instances. Every exclusive binding is constructed at most once per
//! injector, while each multibinding entry is constructed at most once on its own.
//!
//! ```
//! use orchard_di::component::{Component, Dependency, ResolvedDependencies};
//! use orchard_di::component_spec::ComponentSpec;
//! use orchard_di::injector::Injector;
//! use orchard_di::instance_provider::InstancePtr;
//! use orchard_di::key::Key;
//! use orchard_di::InjectorError;
//!
//! struct Port;
//!
//! struct Server {
//!     port: InstancePtr<u16>,
//! }
//!
//! impl Component for Server {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![Dependency::instance(&Key::<u16>::tagged::<Port>())]
//!     }
//!
//!     fn create(dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
//!         Ok(Server {
//!             port: dependencies.instance()?,
//!         })
//!     }
//! }
//!
//! let injector = Injector::new(
//!     &ComponentSpec::builder()
//!         .bind_instance(&Key::<u16>::tagged::<Port>(), InstancePtr::new(8080))
//!         .register_constructor(&Key::<Server>::new())
//!         .expose(Key::<Server>::new())
//!         .build(),
//! )
//! .unwrap();
//!
//! let server = injector.get(&Key::<Server>::new()).unwrap();
//! assert_eq!(*server.port, 8080);
//! ```

use crate::binding::{Binding, BindingStrategy};
use crate::component::{Dependency, ResolvedDependencies, ResolvedDependency};
use crate::component_spec::ComponentSpec;
use crate::error::{InjectorError, ValidationError};
use crate::factory::Factory;
use crate::graph::validation::{RootSet, Validator};
use crate::graph::{BindingGraph, GraphView};
use crate::instance_provider::{
    Injectable, InstanceAnyPtr, InstancePtr, InstanceResolver, TypedInstanceResolver,
    WeakResolverPtr,
};
use crate::key::{Key, TypeKey};
use crate::normalized::NormalizedComponent;
use crate::provider::Provider;
use crate::slot::{InstanceSlot, SlotClaim};
use fxhash::FxHashMap;
use tracing::{debug, trace};

/// Runtime engine resolving instances from a [BindingGraph]. Cheap to clone - clones share the
/// same instances.
#[derive(Clone)]
pub struct Injector {
    core: InstancePtr<InjectorCore>,
}

impl Injector {
    /// Validates the spec and creates an injector for its exposed keys.
    pub fn new(spec: &ComponentSpec) -> Result<Self, ValidationError> {
        BindingGraph::from_spec(spec).map(Self::from_graph)
    }

    /// Creates an injector for an already validated graph.
    pub fn from_graph(graph: BindingGraph) -> Self {
        Self::create(None, graph)
    }

    /// Creates an injector for a precomputed graph extended with additional specs. Only the
    /// additions are validated, and all of their bindings become part of the injector.
    pub fn from_normalized<I: IntoIterator<Item = ComponentSpec>>(
        component: &NormalizedComponent,
        additions: I,
    ) -> Result<Self, ValidationError> {
        let additions = additions
            .into_iter()
            .fold(ComponentSpec::builder(), |builder, spec| builder.install(&spec))
            .build();

        let base = component.shared_graph().clone();
        let overlay = Validator::new(additions.flatten(), Some(&base))?
            .validate(RootSet::AllBindings)?;

        Ok(Self::create(Some(base), overlay))
    }

    fn create(base: Option<InstancePtr<BindingGraph>>, overlay: BindingGraph) -> Self {
        let core = InstancePtr::<InjectorCore>::new_cyclic(|this| {
            let view = GraphView::new(base.as_deref(), &overlay);

            let mut slots = FxHashMap::default();
            let mut multibinding_slots = FxHashMap::default();

            for key in view.keys() {
                if view.binding(&key).is_some() {
                    slots.insert(key, InstanceSlot::default());
                } else {
                    let entries = view.multibindings(&key).len();
                    multibinding_slots.insert(
                        key,
                        (0..entries).map(|_| InstanceSlot::default()).collect(),
                    );
                }
            }

            debug!(
                bindings = slots.len(),
                multibindings = multibinding_slots.len(),
                precomputed = base.is_some(),
                "Created injector."
            );

            InjectorCore {
                this: this.clone(),
                base,
                overlay,
                slots,
                multibinding_slots,
            }
        });

        Self { core }
    }

    /// Returns the instance bound to the given key, constructing it on first access.
    pub fn get<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<InstancePtr<T>, InjectorError> {
        self.core.instance_typed(key)
    }

    /// Returns instances of all multibindings for the given key, in registration order. A key
    /// without any multibindings results in an empty collection.
    pub fn get_multibindings<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<Vec<InstancePtr<T>>, InjectorError> {
        self.core.multibinding_instances_typed(key)
    }

    /// Returns a [Provider] for the given key without constructing anything.
    pub fn provider<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<Provider<T>, InjectorError> {
        if self.core.slots.contains_key(key.type_key()) {
            Ok(Provider::new(self.core.this.clone(), *key.type_key()))
        } else {
            Err(InjectorError::NotInGraph(*key.type_key()))
        }
    }

    /// Returns a [Factory] creating new instances for the given key on every call. Instances
    /// created this way are not cached, so they are never returned by [Injector::get].
    pub fn factory<T: Injectable + ?Sized>(
        &self,
        key: &Key<T>,
    ) -> Result<Factory<T>, InjectorError> {
        if self.core.slots.contains_key(key.type_key()) {
            Ok(Factory::new(self.core.this.clone(), *key.type_key()))
        } else {
            Err(InjectorError::NotInGraph(*key.type_key()))
        }
    }

    /// Checks if the given key has an exclusive binding or multibindings in this injector.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.core.slots.contains_key(key) || self.core.multibinding_slots.contains_key(key)
    }
}

impl InstanceResolver for Injector {
    #[inline]
    fn instance(&self, key: &TypeKey) -> Result<InstanceAnyPtr, InjectorError> {
        self.core.instance(key)
    }

    #[inline]
    fn multibinding_instances(
        &self,
        key: &TypeKey,
    ) -> Result<Vec<InstanceAnyPtr>, InjectorError> {
        self.core.multibinding_instances(key)
    }

    #[inline]
    fn create_instance(&self, key: &TypeKey) -> Result<InstanceAnyPtr, InjectorError> {
        self.core.create_instance(key)
    }
}

struct InjectorCore {
    this: WeakResolverPtr,
    base: Option<InstancePtr<BindingGraph>>,
    overlay: BindingGraph,
    slots: FxHashMap<TypeKey, InstanceSlot>,
    multibinding_slots: FxHashMap<TypeKey, Vec<InstanceSlot>>,
}

impl InjectorCore {
    #[inline]
    fn view(&self) -> GraphView<'_> {
        GraphView::new(self.base.as_deref(), &self.overlay)
    }

    fn resolve_slot(
        &self,
        binding: &Binding,
        slot: &InstanceSlot,
    ) -> Result<InstanceAnyPtr, InjectorError> {
        match slot.claim(binding.key())? {
            SlotClaim::Resolved(instance) => {
                trace!(key = %binding.key(), "Reusing existing instance.");
                Ok(instance)
            }
            SlotClaim::Owned(guard) => self
                .construct(binding)
                .map(|instance| guard.publish(instance)),
        }
    }

    fn construct(&self, binding: &Binding) -> Result<InstanceAnyPtr, InjectorError> {
        match binding.strategy() {
            BindingStrategy::Constructor {
                dependencies,
                constructor,
            } => {
                let mut dependencies = self.resolve_dependencies(dependencies)?;
                debug!(key = %binding.key(), "Constructing instance.");
                constructor(&mut dependencies)
            }
            BindingStrategy::Factory {
                dependencies,
                factory,
            } => {
                let mut dependencies = self.resolve_dependencies(dependencies)?;
                debug!(key = %binding.key(), "Constructing instance with factory.");
                factory(&mut dependencies)
            }
            BindingStrategy::Instance(instance) => Ok(instance.clone()),
            BindingStrategy::Alias { target, cast } => cast(self.instance(target)?),
        }
    }

    fn resolve_dependencies(
        &self,
        dependencies: &[Dependency],
    ) -> Result<ResolvedDependencies, InjectorError> {
        dependencies
            .iter()
            .map(|dependency| {
                let resolved = match dependency {
                    Dependency::Instance(key) => ResolvedDependency::Instance(self.instance(key)?),
                    Dependency::Provider(key) => {
                        trace!(%key, "Creating provider.");
                        ResolvedDependency::Provider(self.this.clone())
                    }
                    Dependency::Multibindings(key) => {
                        ResolvedDependency::Multibindings(self.multibinding_instances(key)?)
                    }
                    Dependency::Factory(key) => {
                        trace!(%key, "Creating factory.");
                        ResolvedDependency::Factory(self.this.clone())
                    }
                };

                Ok((*dependency.key(), resolved))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ResolvedDependencies::new)
    }
}

impl InstanceResolver for InjectorCore {
    fn instance(&self, key: &TypeKey) -> Result<InstanceAnyPtr, InjectorError> {
        match (self.view().binding(key), self.slots.get(key)) {
            (Some(binding), Some(slot)) => self.resolve_slot(binding, slot),
            _ => Err(InjectorError::NotInGraph(*key)),
        }
    }

    fn multibinding_instances(
        &self,
        key: &TypeKey,
    ) -> Result<Vec<InstanceAnyPtr>, InjectorError> {
        let Some(slots) = self.multibinding_slots.get(key) else {
            return Ok(Vec::new());
        };

        self.view()
            .multibindings(key)
            .into_iter()
            .zip(slots)
            .map(|(binding, slot)| self.resolve_slot(binding, slot))
            .collect()
    }

    fn create_instance(&self, key: &TypeKey) -> Result<InstanceAnyPtr, InjectorError> {
        let binding = self
            .view()
            .binding(key)
            .ok_or(InjectorError::NotInGraph(*key))?;

        match binding.strategy() {
            BindingStrategy::Alias { target, cast } => cast(self.create_instance(target)?),
            _ => self.construct(binding),
        }
    }
}
