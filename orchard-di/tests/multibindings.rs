mod multibindings_test {
    use orchard_di::binding::Binding;
    use orchard_di::component_spec::ComponentSpec;
    use orchard_di::injector::Injector;
    use orchard_di::instance_provider::InstancePtr;
    use orchard_di::key::Key;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Annotation;

    trait Listener {
        fn id(&self) -> u8;
    }

    struct ListenerImpl(u8);

    impl Listener for ListenerImpl {
        fn id(&self) -> u8 {
            self.0
        }
    }

    type ListenerPtr = InstancePtr<dyn Listener + Send + Sync>;

    #[test]
    fn should_construct_each_entry_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let key = Key::<u8>::tagged::<Annotation>();

        let spec = (0..3u8)
            .fold(ComponentSpec::builder(), |builder, value| {
                let counter = counter.clone();
                builder.add_multibinding(Binding::factory(&key, vec![], move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(value)
                }))
            })
            .build();

        let injector = Injector::new(&spec).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let first = injector.get_multibindings(&key).unwrap();
        let second = injector.get_multibindings(&key).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(first
            .iter()
            .zip(second.iter())
            .all(|(first, second)| InstancePtr::ptr_eq(first, second)));
    }

    #[test]
    fn should_mix_value_and_pointer_factories_in_any_order() {
        let key = Key::<u8>::tagged::<Annotation>();
        let value = Binding::factory(&key, vec![], |_| Ok(1u8));
        let pointer = Binding::pointer_factory(&key, vec![], |_| Ok(InstancePtr::new(1u8)));

        for spec in [
            ComponentSpec::builder()
                .add_multibinding(value.clone())
                .add_multibinding(pointer.clone())
                .build(),
            ComponentSpec::builder()
                .add_multibinding(pointer)
                .add_multibinding(value)
                .build(),
        ] {
            let instances = Injector::new(&spec)
                .unwrap()
                .get_multibindings(&key)
                .unwrap();

            assert_eq!(instances.len(), 2);
            assert!(!InstancePtr::ptr_eq(&instances[0], &instances[1]));
        }
    }

    #[test]
    fn should_keep_installation_order() {
        let key = Key::<dyn Listener + Send + Sync>::new();
        let listener = |id: u8| {
            Binding::pointer_factory(&key, vec![], move |_| {
                Ok(InstancePtr::new(ListenerImpl(id)) as ListenerPtr)
            })
        };

        let nested = ComponentSpec::builder()
            .add_multibinding(listener(3))
            .build();
        let child = ComponentSpec::builder()
            .add_multibinding(listener(2))
            .install(&nested)
            .build();
        let spec = ComponentSpec::builder()
            .add_multibinding(listener(1))
            .install(&child)
            .add_multibinding(listener(4))
            .build();

        let ids = Injector::new(&spec)
            .unwrap()
            .get_multibindings(&key)
            .unwrap()
            .iter()
            .map(|listener| listener.id())
            .collect::<Vec<_>>();

        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
