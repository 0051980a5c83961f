mod static_modules_test {
    use orchard_di::binding::Binding;
    use orchard_di::component_spec::internal::{submit, ModuleRegisterer};
    use orchard_di::component_spec::ComponentSpec;
    use orchard_di::injector::Injector;
    use orchard_di::instance_provider::InstancePtr;
    use orchard_di::key::Key;

    struct Plugins;

    fn plugin_key() -> Key<&'static str> {
        Key::tagged::<Plugins>()
    }

    fn second_module() -> ComponentSpec {
        ComponentSpec::builder()
            .add_multibinding(Binding::instance(&plugin_key(), InstancePtr::new("second")))
            .build()
    }

    fn first_module() -> ComponentSpec {
        ComponentSpec::builder()
            .add_multibinding(Binding::instance(&plugin_key(), InstancePtr::new("first")))
            .bind_instance(&Key::<u8>::new(), InstancePtr::new(1))
            .expose(Key::<u8>::new())
            .build()
    }

    submit! {
        ModuleRegisterer {
            name: "b_second",
            register: second_module,
        }
    }

    submit! {
        ModuleRegisterer {
            name: "a_first",
            register: first_module,
        }
    }

    #[test]
    fn should_install_modules_in_name_order() {
        let injector = Injector::new(
            &ComponentSpec::builder()
                .install_static_modules()
                .build(),
        )
        .unwrap();

        let plugins = injector
            .get_multibindings(&plugin_key())
            .unwrap()
            .iter()
            .map(|plugin| **plugin)
            .collect::<Vec<_>>();

        assert_eq!(plugins, vec!["first", "second"]);
        assert_eq!(*injector.get(&Key::<u8>::new()).unwrap(), 1);
    }
}
