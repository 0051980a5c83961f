//! A [BindingGraph] is the validated closure of a [ComponentSpec] over a set of root keys. Every
//! key reachable from the roots is resolvable, no key is bound both exclusively and as a
//! multibinding and there are no cycles among [direct](EdgeKind::Direct) edges.
//!
//! Graphs are immutable and can be shared between any number of
//! [Injector](crate::injector::Injector)s, see
//! [NormalizedComponent](crate::normalized::NormalizedComponent).

pub(crate) mod validation;

use crate::binding::Binding;
use crate::component_spec::ComponentSpec;
use crate::error::ValidationError;
use crate::graph::validation::{RootSet, Validator};
use crate::key::TypeKey;
use fxhash::FxHashMap;
use itertools::Itertools;

/// Kind of a dependency edge.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum EdgeKind {
    /// The target needs to be constructed before the source.
    Direct,
    /// The source holds a [Provider](crate::provider::Provider) for the target.
    Deferred,
    /// The source holds a [Factory](crate::factory::Factory) creating new instances of the target.
    Factory,
    /// The source depends on all multibindings of the target.
    Multibinding,
}

/// Dependency edge leading from a node to `target`.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct GraphEdge {
    pub target: TypeKey,
    pub kind: EdgeKind,
}

/// Resolved bindings for a single key.
#[derive(Clone, Debug)]
pub enum GraphNode {
    Binding(Binding),
    Multibindings(Vec<Binding>),
}

impl GraphNode {
    fn edges(&self) -> Vec<GraphEdge> {
        let bindings = match self {
            GraphNode::Binding(binding) => std::slice::from_ref(binding),
            GraphNode::Multibindings(bindings) => bindings.as_slice(),
        };

        bindings
            .iter()
            .flat_map(|binding| binding.dependencies())
            .map(|dependency| GraphEdge {
                target: *dependency.key(),
                kind: dependency.edge_kind(),
            })
            .unique()
            .collect()
    }
}

/// Validated, closed set of bindings.
#[derive(Clone, Debug, Default)]
pub struct BindingGraph {
    nodes: FxHashMap<TypeKey, GraphNode>,
    exposed: Vec<TypeKey>,
}

impl BindingGraph {
    pub(crate) fn new(nodes: FxHashMap<TypeKey, GraphNode>, exposed: Vec<TypeKey>) -> Self {
        Self { nodes, exposed }
    }

    /// Validates the spec using its exposed keys and all multibinding keys as roots.
    pub fn from_spec(spec: &ComponentSpec) -> Result<Self, ValidationError> {
        Validator::new(spec.flatten(), None)?.validate(RootSet::Exposed)
    }

    /// Validates the spec using the given keys and all multibinding keys as roots, instead of the
    /// exposed ones.
    pub fn with_roots<I: IntoIterator<Item = TypeKey>>(
        spec: &ComponentSpec,
        roots: I,
    ) -> Result<Self, ValidationError> {
        let roots = RootSet::Explicit(roots.into_iter().collect());
        Validator::new(spec.flatten(), None)?.validate(roots)
    }

    /// Returns resolved bindings for the given key.
    #[inline]
    pub fn node(&self, key: &TypeKey) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Returns outgoing dependency edges of the given key.
    pub fn edges(&self, key: &TypeKey) -> Vec<GraphEdge> {
        self.nodes
            .get(key)
            .map(GraphNode::edges)
            .unwrap_or_default()
    }

    /// Returns all keys in the graph, in a stable order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.nodes.keys().copied().sorted().collect()
    }

    /// Returns the public surface of this graph.
    #[inline]
    pub fn exposed(&self) -> &[TypeKey] {
        &self.exposed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Read-only view of an optional precomputed graph with another graph layered on top. Exclusive
/// bindings are looked up in both, while multibindings of the precomputed graph come first.
#[derive(Clone, Copy)]
pub(crate) struct GraphView<'a> {
    base: Option<&'a BindingGraph>,
    overlay: &'a BindingGraph,
}

impl<'a> GraphView<'a> {
    pub(crate) fn new(base: Option<&'a BindingGraph>, overlay: &'a BindingGraph) -> Self {
        Self { base, overlay }
    }

    pub(crate) fn binding(&self, key: &TypeKey) -> Option<&'a Binding> {
        self.layers()
            .find_map(|graph| match graph.node(key) {
                Some(GraphNode::Binding(binding)) => Some(binding),
                _ => None,
            })
    }

    pub(crate) fn multibindings(&self, key: &TypeKey) -> Vec<&'a Binding> {
        self.layers()
            .flat_map(|graph| match graph.node(key) {
                Some(GraphNode::Multibindings(bindings)) => bindings.as_slice(),
                _ => &[],
            })
            .collect()
    }

    /// Returns targets of all edges which force construction of the target first.
    pub(crate) fn direct_successors(&self, key: &TypeKey) -> Vec<TypeKey> {
        let bindings = match self.binding(key) {
            Some(binding) => vec![binding],
            None => self.multibindings(key),
        };

        bindings
            .into_iter()
            .flat_map(|binding| binding.dependencies())
            .filter(|dependency| {
                matches!(
                    dependency.edge_kind(),
                    EdgeKind::Direct | EdgeKind::Multibinding
                )
            })
            .map(|dependency| *dependency.key())
            .unique()
            .collect()
    }

    pub(crate) fn keys(&self) -> Vec<TypeKey> {
        self.layers()
            .flat_map(|graph| graph.nodes.keys().copied())
            .unique()
            .collect()
    }

    fn layers(&self) -> impl Iterator<Item = &'a BindingGraph> {
        self.base.into_iter().chain(std::iter::once(self.overlay))
    }
}
