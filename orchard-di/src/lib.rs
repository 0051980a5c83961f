//! Dependency injection engine with bindings validated before anything gets constructed.
//!
//! Bindings are declared in [ComponentSpec](component_spec::ComponentSpec)s, keyed by
//! [TypeKey](key::TypeKey)s optionally distinguished by tags. A spec is validated into a
//! [BindingGraph](graph::BindingGraph), which is guaranteed to be complete and free of
//! construction cycles, and an [Injector](injector::Injector) then lazily constructs and caches
//! instances from the graph. Expensive validation can be done once with a
//! [NormalizedComponent](normalized::NormalizedComponent) and reused by many injectors.
//!
//! ### Features
//!
//! * `threadsafe` - use `Arc` instead of `Rc` for instances and allow sharing injectors between
//! threads (enabled by default)

pub mod binding;
pub mod component;
pub mod component_spec;
mod error;
pub mod factory;
pub mod graph;
pub mod injector;
pub mod instance_provider;
pub mod key;
pub mod normalized;
pub mod provider;
mod slot;

pub use error::{InjectorError, ValidationError};
