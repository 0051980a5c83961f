use crate::instance_provider::{ErrorPtr, InstancePtr};
use crate::key::TypeKey;
use itertools::Itertools;
use thiserror::Error;

/// Errors detected while validating a binding graph. No instance is ever created before
/// validation succeeds.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ValidationError {
    #[error("Trying to bind {0} but it is already bound.")]
    DuplicateBinding(TypeKey),
    #[error("No binding found for {key}, required by {}", describe_requirer(.required_by))]
    UnsatisfiedDependency {
        key: TypeKey,
        required_by: Option<TypeKey>,
    },
    #[error("Type {0} has both an exclusive binding and multibindings.")]
    BindingMultibindingConflict(TypeKey),
    #[error("Found a dependency cycle: {}", describe_cycle(.0))]
    DependencyCycle(Vec<TypeKey>),
}

fn describe_requirer(required_by: &Option<TypeKey>) -> String {
    required_by
        .map(|key| key.to_string())
        .unwrap_or_else(|| "the exposed types".to_string())
}

fn describe_cycle(cycle: &[TypeKey]) -> String {
    cycle
        .iter()
        .chain(cycle.first())
        .map(|key| key.to_string())
        .join(" -> ")
}

/// Errors related to resolving instances from a validated graph.
#[derive(Error, Clone, Debug)]
pub enum InjectorError {
    #[error("Type {0} is not part of the binding graph.")]
    NotInGraph(TypeKey),
    #[error("Detected a dependency cycle when constructing {0}.")]
    DependencyCycle(TypeKey),
    #[error("Tried to downcast instance of {0} to incompatible type.")]
    IncompatibleInstance(TypeKey),
    #[error("Constructor requested a dependency not matching its declaration: {0}")]
    DependencyMismatch(&'static str),
    #[error("Injector owning the provider for {0} has been dropped.")]
    InjectorDropped(TypeKey),
    #[error("Error constructing instance: {0}")]
    ConstructionFailed(ErrorPtr),
}

impl InjectorError {
    /// Wraps an error returned by user construction code.
    #[cfg(feature = "threadsafe")]
    pub fn construction<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::ConstructionFailed(InstancePtr::new(error))
    }

    /// Wraps an error returned by user construction code.
    #[cfg(not(feature = "threadsafe"))]
    pub fn construction<E: std::error::Error + 'static>(error: E) -> Self {
        Self::ConstructionFailed(InstancePtr::new(error))
    }
}
