//! Binding graph validation. Checks are performed in a fixed order - duplicates, binding and
//! multibinding conflicts, unsatisfied dependencies and finally cycles - and when multiple
//! violations of the same kind exist, the one for the smallest key is reported. This makes the
//! result independent of registration and install order.

use crate::binding::Binding;
use crate::component::Dependency;
use crate::component_spec::FlattenedSpec;
use crate::error::ValidationError;
use crate::graph::{BindingGraph, GraphNode, GraphView};
use crate::key::TypeKey;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use std::collections::VecDeque;
use tracing::debug;

/// Keys from which the closure is computed. All multibinding keys are always included.
#[derive(Clone, Debug)]
pub(crate) enum RootSet {
    Exposed,
    Explicit(Vec<TypeKey>),
    AllBindings,
}

pub(crate) struct Validator<'a> {
    base: Option<&'a BindingGraph>,
    bindings: FxHashMap<TypeKey, Binding>,
    multibindings: FxHashMap<TypeKey, Vec<Binding>>,
    exposed: Vec<TypeKey>,
}

impl<'a> Validator<'a> {
    /// Indexes the flattened spec, optionally on top of an already validated graph.
    pub(crate) fn new(
        spec: FlattenedSpec,
        base: Option<&'a BindingGraph>,
    ) -> Result<Self, ValidationError> {
        let mut validator = Self {
            base,
            bindings: Default::default(),
            multibindings: Default::default(),
            exposed: spec.exposed,
        };

        let mut duplicates = Vec::new();
        for binding in spec.bindings {
            let key = *binding.key();
            if validator.has_binding(&key) {
                duplicates.push(key);
            } else {
                validator.bindings.insert(key, binding);
            }
        }

        if let Some(key) = duplicates.into_iter().min() {
            return Err(ValidationError::DuplicateBinding(key));
        }

        for binding in spec.multibindings {
            validator
                .multibindings
                .entry(*binding.key())
                .or_default()
                .push(binding);
        }

        let conflict = validator
            .multibindings
            .keys()
            .filter(|key| validator.has_binding(key))
            .chain(
                validator
                    .bindings
                    .keys()
                    .filter(|key| validator.has_multibindings(key)),
            )
            .min()
            .copied();

        match conflict {
            Some(key) => Err(ValidationError::BindingMultibindingConflict(key)),
            None => Ok(validator),
        }
    }

    /// Computes the closure over given roots and checks it for cycles.
    pub(crate) fn validate(self, roots: RootSet) -> Result<BindingGraph, ValidationError> {
        let roots = self.roots(roots);
        let nodes = self.close(&roots)?;
        let graph = BindingGraph::new(nodes, self.exposed);

        check_cycles(GraphView::new(self.base, &graph), &graph.keys())?;

        debug!(
            roots = roots.len(),
            nodes = graph.len(),
            "Validated binding graph."
        );

        Ok(graph)
    }

    fn roots(&self, roots: RootSet) -> Vec<TypeKey> {
        let roots = match roots {
            RootSet::Exposed => self.exposed.clone(),
            RootSet::Explicit(roots) => roots,
            RootSet::AllBindings => self
                .bindings
                .keys()
                .chain(self.exposed.iter())
                .copied()
                .collect(),
        };

        roots
            .into_iter()
            .chain(self.multibindings.keys().copied())
            .sorted()
            .dedup()
            .collect()
    }

    fn close(
        &self,
        roots: &[TypeKey],
    ) -> Result<FxHashMap<TypeKey, GraphNode>, ValidationError> {
        let mut nodes = FxHashMap::default();
        let mut unsatisfied = Vec::new();
        let mut conflicts = Vec::new();
        let mut queue = VecDeque::new();

        for root in roots {
            if self.has_binding(root) || self.has_multibindings(root) {
                queue.push_back(*root);
            } else {
                unsatisfied.push((*root, None));
            }
        }

        while let Some(key) = queue.pop_front() {
            if nodes.contains_key(&key) {
                continue;
            }

            let node = if let Some(binding) = self.bindings.get(&key) {
                GraphNode::Binding(binding.clone())
            } else if let Some(bindings) = self.multibindings.get(&key) {
                GraphNode::Multibindings(bindings.clone())
            } else {
                // already validated as part of the base graph or an empty multibinding set
                continue;
            };

            for dependency in node_dependencies(&node) {
                let target = *dependency.key();
                match dependency {
                    // an exclusive binding can't be injected as a multibinding set
                    Dependency::Multibindings(_) if self.has_binding(&target) => {
                        conflicts.push(target);
                        continue;
                    }
                    Dependency::Multibindings(_) => {}
                    _ if !self.has_binding(&target) => {
                        unsatisfied.push((target, Some(key)));
                        continue;
                    }
                    _ => {}
                }

                queue.push_back(target);
            }

            nodes.insert(key, node);
        }

        if let Some(key) = conflicts.into_iter().min() {
            return Err(ValidationError::BindingMultibindingConflict(key));
        }

        match unsatisfied.into_iter().min() {
            Some((key, required_by)) => {
                Err(ValidationError::UnsatisfiedDependency { key, required_by })
            }
            None => Ok(nodes),
        }
    }

    fn has_binding(&self, key: &TypeKey) -> bool {
        self.bindings.contains_key(key)
            || matches!(
                self.base.and_then(|base| base.node(key)),
                Some(GraphNode::Binding(_))
            )
    }

    fn has_multibindings(&self, key: &TypeKey) -> bool {
        self.multibindings.contains_key(key)
            || matches!(
                self.base.and_then(|base| base.node(key)),
                Some(GraphNode::Multibindings(_))
            )
    }
}

fn node_dependencies(node: &GraphNode) -> Vec<Dependency> {
    match node {
        GraphNode::Binding(binding) => binding.dependencies(),
        GraphNode::Multibindings(bindings) => bindings
            .iter()
            .flat_map(|binding| binding.dependencies())
            .collect(),
    }
}

/// Depth-first search for cycles among edges which force construction order. Provider edges
/// never take part in a cycle.
fn check_cycles(view: GraphView<'_>, starts: &[TypeKey]) -> Result<(), ValidationError> {
    let mut finished = FxHashSet::default();
    let mut path = Vec::new();

    for start in starts {
        if let Some(mut cycle) = find_cycle(&view, *start, &mut path, &mut finished) {
            if let Some(position) = cycle.iter().position_min() {
                cycle.rotate_left(position);
            }

            return Err(ValidationError::DependencyCycle(cycle));
        }
    }

    Ok(())
}

fn find_cycle(
    view: &GraphView<'_>,
    key: TypeKey,
    path: &mut Vec<TypeKey>,
    finished: &mut FxHashSet<TypeKey>,
) -> Option<Vec<TypeKey>> {
    if finished.contains(&key) {
        return None;
    }

    if let Some(position) = path.iter().position(|entry| *entry == key) {
        return Some(path[position..].to_vec());
    }

    path.push(key);

    for successor in view.direct_successors(&key) {
        if let Some(cycle) = find_cycle(view, successor, path, finished) {
            return Some(cycle);
        }
    }

    path.pop();
    finished.insert(key);

    None
}

#[cfg(test)]
mod tests {
    use crate::binding::Binding;
    use crate::component::Dependency;
    use crate::component_spec::ComponentSpec;
    use crate::error::ValidationError;
    use crate::graph::validation::{RootSet, Validator};
    use crate::graph::BindingGraph;
    use crate::instance_provider::InstancePtr;
    use crate::key::{Key, TypeKey};

    struct Annotation1;
    struct Annotation2;

    fn dependent(key: &Key<u8>, dependencies: Vec<Dependency>) -> Binding {
        Binding::factory(key, dependencies, |_| Ok(0u8))
    }

    fn validate(spec: &ComponentSpec) -> Result<BindingGraph, ValidationError> {
        Validator::new(spec.flatten(), None)?.validate(RootSet::Exposed)
    }

    #[test]
    fn should_report_smallest_duplicate() {
        let first = ComponentSpec::builder()
            .bind_instance(&Key::<u16>::new(), InstancePtr::new(1))
            .bind_instance(&Key::<u8>::new(), InstancePtr::new(1))
            .build();
        let second = ComponentSpec::builder()
            .bind_instance(&Key::<u8>::new(), InstancePtr::new(2))
            .bind_instance(&Key::<u16>::new(), InstancePtr::new(2))
            .build();

        for spec in [
            ComponentSpec::builder().install(&first).install(&second).build(),
            ComponentSpec::builder().install(&second).install(&first).build(),
        ] {
            assert_eq!(
                validate(&spec).unwrap_err(),
                ValidationError::DuplicateBinding(TypeKey::of::<u16>())
            );
        }
    }

    #[test]
    fn should_allow_same_type_with_different_tags() {
        let spec = ComponentSpec::builder()
            .bind_instance(&Key::<u8>::tagged::<Annotation1>(), InstancePtr::new(1))
            .bind_instance(&Key::<u8>::tagged::<Annotation2>(), InstancePtr::new(2))
            .expose(Key::<u8>::tagged::<Annotation1>())
            .expose(Key::<u8>::tagged::<Annotation2>())
            .build();

        assert_eq!(validate(&spec).unwrap().len(), 2);
    }

    #[test]
    fn should_report_unsatisfied_dependency() {
        let key = Key::<u8>::new();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(
                &key,
                vec![Dependency::instance(&Key::<u8>::tagged::<Annotation1>())],
            ))
            .bind_instance(&Key::<u8>::tagged::<Annotation2>(), InstancePtr::new(1))
            .expose(key)
            .build();

        assert_eq!(
            validate(&spec).unwrap_err(),
            ValidationError::UnsatisfiedDependency {
                key: TypeKey::tagged::<u8, Annotation1>(),
                required_by: Some(*key.type_key()),
            }
        );
    }

    #[test]
    fn should_report_unsatisfied_root() {
        let spec = ComponentSpec::builder().expose(Key::<u8>::new()).build();

        assert_eq!(
            validate(&spec).unwrap_err(),
            ValidationError::UnsatisfiedDependency {
                key: TypeKey::of::<u8>(),
                required_by: None,
            }
        );
    }

    #[test]
    fn should_not_require_provider_targets_to_be_multibound() {
        let key = Key::<u8>::new();
        let target = Key::<u8>::tagged::<Annotation1>();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(&key, vec![Dependency::provider(&target)]))
            .add_multibinding(Binding::instance(&target, InstancePtr::new(1)))
            .expose(key)
            .build();

        assert!(matches!(
            validate(&spec).unwrap_err(),
            ValidationError::UnsatisfiedDependency { key, .. } if key == *target.type_key()
        ));
    }

    #[test]
    fn should_allow_empty_multibindings() {
        let key = Key::<u8>::new();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(
                &key,
                vec![Dependency::multibindings(&Key::<u16>::new())],
            ))
            .expose(key)
            .build();

        assert!(validate(&spec).is_ok());
    }

    #[test]
    fn should_report_conflicts() {
        let key = Key::<u8>::tagged::<Annotation1>();
        let spec = ComponentSpec::builder()
            .add_multibinding(Binding::instance(&key, InstancePtr::new(1)))
            .bind_instance(&key, InstancePtr::new(2))
            .build();

        assert_eq!(
            validate(&spec).unwrap_err(),
            ValidationError::BindingMultibindingConflict(*key.type_key())
        );
    }

    #[test]
    fn should_reject_multibinding_dependencies_on_exclusive_bindings() {
        let key = Key::<u16>::new();
        let spec = ComponentSpec::builder()
            .bind_instance(&Key::<u8>::new(), InstancePtr::new(1))
            .add_binding(Binding::factory(
                &key,
                vec![Dependency::multibindings(&Key::<u8>::new())],
                |_| Ok(0u16),
            ))
            .expose(key)
            .build();

        assert_eq!(
            validate(&spec).unwrap_err(),
            ValidationError::BindingMultibindingConflict(TypeKey::of::<u8>())
        );
    }

    #[test]
    fn should_require_exclusive_bindings_for_factories() {
        let key = Key::<u8>::new();
        let target = Key::<u8>::tagged::<Annotation1>();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(&key, vec![Dependency::factory(&target)]))
            .add_multibinding(Binding::instance(&target, InstancePtr::new(1)))
            .expose(key)
            .build();

        assert!(matches!(
            validate(&spec).unwrap_err(),
            ValidationError::UnsatisfiedDependency { key, .. } if key == *target.type_key()
        ));
    }

    #[test]
    fn should_report_direct_cycles() {
        let a = Key::<u8>::tagged::<Annotation1>();
        let b = Key::<u8>::tagged::<Annotation2>();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(&b, vec![Dependency::instance(&a)]))
            .add_binding(dependent(&a, vec![Dependency::instance(&b)]))
            .expose(b)
            .build();

        assert_eq!(
            validate(&spec).unwrap_err(),
            ValidationError::DependencyCycle(vec![*a.type_key(), *b.type_key()])
        );
    }

    #[test]
    fn should_report_cycles_through_multibindings() {
        let a = Key::<u8>::new();
        let b = Key::<u8>::tagged::<Annotation1>();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(&a, vec![Dependency::multibindings(&b)]))
            .add_multibinding(dependent(&b, vec![Dependency::instance(&a)]))
            .expose(a)
            .build();

        assert!(matches!(
            validate(&spec).unwrap_err(),
            ValidationError::DependencyCycle(cycle) if cycle.len() == 2
        ));
    }

    #[test]
    fn should_allow_cycles_broken_by_providers() {
        let a = Key::<u8>::tagged::<Annotation1>();
        let b = Key::<u8>::tagged::<Annotation2>();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(&a, vec![Dependency::instance(&b)]))
            .add_binding(dependent(&b, vec![Dependency::provider(&a)]))
            .expose(a)
            .build();

        assert!(validate(&spec).is_ok());
    }

    #[test]
    fn should_allow_cycles_broken_by_factories() {
        let a = Key::<u8>::tagged::<Annotation1>();
        let b = Key::<u8>::tagged::<Annotation2>();
        let spec = ComponentSpec::builder()
            .add_binding(dependent(&a, vec![Dependency::instance(&b)]))
            .add_binding(dependent(&b, vec![Dependency::factory(&a)]))
            .expose(a)
            .build();

        let graph = validate(&spec).unwrap();
        assert!(graph.contains(a.type_key()));
        assert!(graph.contains(b.type_key()));
    }

    #[test]
    fn should_validate_delta_against_base() {
        let base_key = Key::<u16>::new();
        let base = validate(
            &ComponentSpec::builder()
                .bind_instance(&base_key, InstancePtr::new(1))
                .expose(base_key)
                .build(),
        )
        .unwrap();

        let key = Key::<u8>::new();
        let delta = ComponentSpec::builder()
            .add_binding(dependent(&key, vec![Dependency::instance(&base_key)]))
            .expose(key)
            .build();

        let graph = Validator::new(delta.flatten(), Some(&base))
            .and_then(|validator| validator.validate(RootSet::Exposed))
            .unwrap();
        assert_eq!(graph.keys(), vec![*key.type_key()]);

        let duplicate = ComponentSpec::builder()
            .bind_instance(&base_key, InstancePtr::new(2))
            .build();
        assert_eq!(
            Validator::new(duplicate.flatten(), Some(&base)).err(),
            Some(ValidationError::DuplicateBinding(*base_key.type_key()))
        );
    }
}
