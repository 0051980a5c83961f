//! Precomputed binding graphs. Validating a large spec can be expensive, so when many
//! [Injector](crate::injector::Injector)s are built from the same bindings, the validation can be
//! performed once by creating a [NormalizedComponent] and then only validating the small, per
//! injector additions:
//!
//! ```
//! use orchard_di::component_spec::ComponentSpec;
//! use orchard_di::injector::Injector;
//! use orchard_di::instance_provider::InstancePtr;
//! use orchard_di::key::Key;
//! use orchard_di::normalized::NormalizedComponent;
//!
//! struct RequestId;
//!
//! let component = NormalizedComponent::new(
//!     &ComponentSpec::builder()
//!         .bind_instance(&Key::<String>::new(), InstancePtr::new("service".to_string()))
//!         .build(),
//! )
//! .unwrap();
//!
//! for request in 0..3u32 {
//!     let injector = Injector::from_normalized(
//!         &component,
//!         [ComponentSpec::builder()
//!             .bind_instance(&Key::<u32>::tagged::<RequestId>(), InstancePtr::new(request))
//!             .build()],
//!     )
//!     .unwrap();
//!
//!     let id = injector.get(&Key::<u32>::tagged::<RequestId>()).unwrap();
//!     assert_eq!(*id, request);
//! }
//! ```

use crate::component_spec::ComponentSpec;
use crate::error::ValidationError;
use crate::graph::validation::{RootSet, Validator};
use crate::graph::BindingGraph;
use crate::instance_provider::InstancePtr;

/// Validated graph of all bindings of a spec, shareable between injectors.
#[derive(Clone, Debug)]
pub struct NormalizedComponent {
    graph: InstancePtr<BindingGraph>,
}

impl NormalizedComponent {
    /// Validates all bindings of the given spec. Every bound key is treated as a root, since it's
    /// unknown which ones will be required by future additions.
    pub fn new(spec: &ComponentSpec) -> Result<Self, ValidationError> {
        Validator::new(spec.flatten(), None)?
            .validate(RootSet::AllBindings)
            .map(|graph| Self {
                graph: InstancePtr::new(graph),
            })
    }

    #[inline]
    pub fn graph(&self) -> &BindingGraph {
        &self.graph
    }

    #[inline]
    pub(crate) fn shared_graph(&self) -> &InstancePtr<BindingGraph> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use crate::binding::Binding;
    use crate::component::Dependency;
    use crate::component_spec::ComponentSpec;
    use crate::error::ValidationError;
    use crate::instance_provider::InstancePtr;
    use crate::key::{Key, TypeKey};
    use crate::normalized::NormalizedComponent;

    #[test]
    fn should_include_unexposed_bindings() {
        let component = NormalizedComponent::new(
            &ComponentSpec::builder()
                .bind_instance(&Key::<u8>::new(), InstancePtr::new(1))
                .bind_instance(&Key::<u16>::new(), InstancePtr::new(2))
                .build(),
        )
        .unwrap();

        assert_eq!(
            component.graph().keys(),
            vec![TypeKey::of::<u16>(), TypeKey::of::<u8>()]
        );
    }

    #[test]
    fn should_require_complete_bindings() {
        let key = Key::<u8>::new();
        let result = NormalizedComponent::new(
            &ComponentSpec::builder()
                .add_binding(Binding::factory(
                    &key,
                    vec![Dependency::instance(&Key::<u16>::new())],
                    |_| Ok(1u8),
                ))
                .build(),
        );

        assert_eq!(
            result.unwrap_err(),
            ValidationError::UnsatisfiedDependency {
                key: TypeKey::of::<u16>(),
                required_by: Some(*key.type_key()),
            }
        );
    }
}
