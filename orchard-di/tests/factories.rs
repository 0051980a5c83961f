mod factories_test {
    use orchard_di::binding::Binding;
    use orchard_di::component::{Component, Dependency, ResolvedDependencies};
    use orchard_di::component_spec::ComponentSpec;
    use orchard_di::factory::Factory;
    use orchard_di::injector::Injector;
    use orchard_di::instance_provider::InstancePtr;
    use orchard_di::key::{Key, TypeKey};
    use orchard_di::InjectorError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Annotation;

    #[derive(Debug)]
    struct Connection {
        id: usize,
    }

    fn create_spec(counter: &Arc<AtomicUsize>) -> ComponentSpec {
        let counter = counter.clone();
        ComponentSpec::builder()
            .add_binding(Binding::factory(
                &Key::<Connection>::tagged::<Annotation>(),
                vec![],
                move |_| {
                    Ok(Connection {
                        id: counter.fetch_add(1, Ordering::SeqCst),
                    })
                },
            ))
            .register_constructor(&Key::<Pool>::new())
            .expose(Key::<Pool>::new())
            .build()
    }

    struct Pool {
        connections: Factory<Connection>,
    }

    impl Component for Pool {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::factory(&Key::<Connection>::tagged::<Annotation>())]
        }

        fn create(dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
            Ok(Pool {
                connections: dependencies.factory()?,
            })
        }
    }

    #[test]
    fn should_not_construct_factory_targets_eagerly() {
        let counter = Arc::new(AtomicUsize::new(0));
        let injector = Injector::new(&create_spec(&counter)).unwrap();

        let _pool = injector.get(&Key::<Pool>::new()).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_create_new_instance_on_each_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let injector = Injector::new(&create_spec(&counter)).unwrap();
        let pool = injector.get(&Key::<Pool>::new()).unwrap();

        let first = pool.connections.create().unwrap();
        let second = pool.connections.create().unwrap();

        assert_eq!((first.id, second.id), (0, 1));
        assert!(!InstancePtr::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_keep_cached_instance_separate() {
        let counter = Arc::new(AtomicUsize::new(0));
        let injector = Injector::new(&create_spec(&counter)).unwrap();
        let key = Key::<Connection>::tagged::<Annotation>();

        let cached = injector.get(&key).unwrap();
        let created = injector.factory(&key).unwrap().create().unwrap();

        assert!(!InstancePtr::ptr_eq(&cached, &created));
        assert!(InstancePtr::ptr_eq(&cached, &injector.get(&key).unwrap()));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_return_bound_instance_for_instance_bindings() {
        let key = Key::<Connection>::new();
        let instance = InstancePtr::new(Connection { id: 5 });
        let injector = Injector::new(
            &ComponentSpec::builder()
                .bind_instance(&key, instance.clone())
                .expose(key)
                .build(),
        )
        .unwrap();

        let created = injector.factory(&key).unwrap().create().unwrap();

        assert!(InstancePtr::ptr_eq(&instance, &created));
    }

    #[test]
    fn should_fail_creating_after_injector_is_dropped() {
        let counter = Arc::new(AtomicUsize::new(0));
        let injector = Injector::new(&create_spec(&counter)).unwrap();
        let pool = injector.get(&Key::<Pool>::new()).unwrap();

        drop(injector);

        assert!(matches!(
            pool.connections.create().unwrap_err(),
            InjectorError::InjectorDropped(key)
                if key == TypeKey::tagged::<Connection, Annotation>()
        ));
    }
}
