//! Functionality related to declaring bindings. A [ComponentSpecBuilder] accumulates exclusive
//! bindings, multibindings, installed specs and exposed keys, and is then frozen into an immutable
//! [ComponentSpec]. Frozen specs can be installed into other specs any number of times.
//!
//! Nothing gets validated or constructed at this stage - conflicting bindings are reported when
//! the spec is turned into a [BindingGraph](crate::graph::BindingGraph), so the order of
//! registrations and installs does not matter.
//!
//! ## Statically registered modules
//!
//! Specs can also be contributed from anywhere in the program by submitting a
//! [ModuleRegisterer](internal::ModuleRegisterer) and later installed all at once with
//! [ComponentSpecBuilder::install_static_modules]. Modules are installed in name order.

use crate::binding::Binding;
use crate::component::Component;
use crate::instance_provider::{Injectable, InstancePtr};
use crate::key::{Key, TypeKey};
use fxhash::FxHashSet;
use itertools::Itertools;

#[derive(Clone, Debug)]
enum SpecEntry {
    Binding(Binding),
    Multibinding(Binding),
    Install(ComponentSpec),
}

#[derive(Debug)]
struct SpecContents {
    entries: Vec<SpecEntry>,
    exposed: Vec<TypeKey>,
}

/// Builder for [ComponentSpec]s. Exclusively owned until [ComponentSpecBuilder::build] freezes
/// the accumulated state.
#[derive(Default, Debug)]
pub struct ComponentSpecBuilder {
    entries: Vec<SpecEntry>,
    exposed: Vec<TypeKey>,
}

impl ComponentSpecBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an exclusive binding.
    pub fn add_binding(mut self, binding: Binding) -> Self {
        self.entries.push(SpecEntry::Binding(binding));
        self
    }

    /// Adds a multibinding entry. Multiple entries for the same key are all kept, in
    /// registration order.
    pub fn add_multibinding(mut self, binding: Binding) -> Self {
        self.entries.push(SpecEntry::Multibinding(binding));
        self
    }

    /// Installs all bindings of another spec, including the ones it installed itself.
    pub fn install(mut self, spec: &ComponentSpec) -> Self {
        self.entries.push(SpecEntry::Install(spec.clone()));
        self
    }

    /// Installs all statically registered modules.
    pub fn install_static_modules(self) -> Self {
        internal::static_modules()
            .iter()
            .fold(self, |builder, spec| builder.install(spec))
    }

    /// Marks a key as part of the public surface. Exposed keys are the roots of validation.
    pub fn expose<K: Into<TypeKey>>(mut self, key: K) -> Self {
        self.exposed.push(key.into());
        self
    }

    /// Shorthand for adding a [Binding::constructor].
    pub fn register_constructor<T: Component>(self, key: &Key<T>) -> Self {
        self.add_binding(Binding::constructor(key))
    }

    /// Shorthand for adding a [Binding::instance].
    pub fn bind_instance<T: Injectable + ?Sized>(
        self,
        key: &Key<T>,
        instance: InstancePtr<T>,
    ) -> Self {
        self.add_binding(Binding::instance(key, instance))
    }

    /// Freezes the accumulated state.
    pub fn build(self) -> ComponentSpec {
        ComponentSpec {
            contents: InstancePtr::new(SpecContents {
                entries: self.entries,
                exposed: self.exposed,
            }),
        }
    }
}

/// Immutable set of bindings, multibindings and installed specs. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ComponentSpec {
    contents: InstancePtr<SpecContents>,
}

/// All entries of a spec and its transitively installed specs.
#[derive(Default, Debug)]
pub(crate) struct FlattenedSpec {
    pub(crate) bindings: Vec<Binding>,
    pub(crate) multibindings: Vec<Binding>,
    pub(crate) exposed: Vec<TypeKey>,
}

impl ComponentSpec {
    pub fn builder() -> ComponentSpecBuilder {
        ComponentSpecBuilder::new()
    }

    /// Returns keys exposed directly by this spec.
    #[inline]
    pub fn exposed(&self) -> &[TypeKey] {
        &self.contents.exposed
    }

    /// Collects entries depth-first, in the order they were added. A spec reachable through
    /// multiple installs contributes its entries only once.
    pub(crate) fn flatten(&self) -> FlattenedSpec {
        let mut flattened = FlattenedSpec::default();
        let mut visited = FxHashSet::default();
        self.flatten_into(&mut flattened, &mut visited);

        flattened.exposed = flattened.exposed.into_iter().unique().collect();
        flattened
    }

    fn flatten_into(&self, flattened: &mut FlattenedSpec, visited: &mut FxHashSet<usize>) {
        if !visited.insert(self.id()) {
            return;
        }

        for entry in &self.contents.entries {
            match entry {
                SpecEntry::Binding(binding) => flattened.bindings.push(binding.clone()),
                SpecEntry::Multibinding(binding) => flattened.multibindings.push(binding.clone()),
                SpecEntry::Install(spec) => spec.flatten_into(flattened, visited),
            }
        }

        flattened
            .exposed
            .extend(self.contents.exposed.iter().copied());
    }

    #[inline]
    fn id(&self) -> usize {
        InstancePtr::as_ptr(&self.contents) as usize
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::component_spec::ComponentSpec;
    use inventory::collect;
    pub use inventory::submit;
    use itertools::Itertools;

    /// Statically registered module contributing a [ComponentSpec].
    pub struct ModuleRegisterer {
        pub name: &'static str,
        pub register: fn() -> ComponentSpec,
    }

    collect!(ModuleRegisterer);

    pub(crate) fn static_modules() -> Vec<ComponentSpec> {
        inventory::iter::<ModuleRegisterer>
            .into_iter()
            .sorted_by_key(|registerer| registerer.name)
            .map(|registerer| (registerer.register)())
            .collect()
    }
}
