use orchard_di::binding::Binding;
use orchard_di::component::Dependency;
use orchard_di::component_spec::ComponentSpec;
use orchard_di::injector::Injector;
use orchard_di::instance_provider::InstancePtr;
use orchard_di::key::Key;
use orchard_di::normalized::NormalizedComponent;

struct Greeting;
struct UserName;

fn main() {
    // shared bindings are validated once
    let component = NormalizedComponent::new(
        &ComponentSpec::builder()
            .bind_instance(&Key::<String>::new(), InstancePtr::new("Hello".to_string()))
            .build(),
    )
    .expect("error validating shared bindings");

    for user in ["Alice", "Bob"] {
        // and only the per-request additions are validated for each injector
        let request = ComponentSpec::builder()
            .bind_instance(
                &Key::<String>::tagged::<UserName>(),
                InstancePtr::new(user.to_string()),
            )
            .add_binding(Binding::factory(
                &Key::<String>::tagged::<Greeting>(),
                vec![
                    Dependency::instance(&Key::<String>::new()),
                    Dependency::instance(&Key::<String>::tagged::<UserName>()),
                ],
                |dependencies| {
                    let greeting = dependencies.instance::<String>()?;
                    let name = dependencies.instance::<String>()?;
                    Ok(format!("{greeting}, {name}!"))
                },
            ))
            .build();

        let injector = Injector::from_normalized(&component, [request])
            .expect("error validating request bindings");

        println!(
            "{}",
            injector
                .get(&Key::<String>::tagged::<Greeting>())
                .expect("error creating greeting")
        );
    }
}
