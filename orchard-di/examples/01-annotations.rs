use orchard_di::binding::Binding;
use orchard_di::component::Dependency;
use orchard_di::component_spec::ComponentSpec;
use orchard_di::injector::Injector;
use orchard_di::key::Key;

// tags are plain marker types, which allow binding the same type multiple times
struct Width;
struct Height;
struct Area;

fn main() {
    let spec = ComponentSpec::builder()
        .add_binding(Binding::factory(&Key::<u32>::tagged::<Width>(), vec![], |_| {
            Ok(4u32)
        }))
        .add_binding(Binding::factory(&Key::<u32>::tagged::<Height>(), vec![], |_| {
            Ok(3u32)
        }))
        .add_binding(Binding::factory(
            &Key::<u32>::tagged::<Area>(),
            // the tag always needs to be given explicitly - u32 tagged with Width is a different
            // type than plain u32
            vec![
                Dependency::instance(&Key::<u32>::tagged::<Width>()),
                Dependency::instance(&Key::<u32>::tagged::<Height>()),
            ],
            |dependencies| {
                let width = dependencies.instance::<u32>()?;
                let height = dependencies.instance::<u32>()?;
                Ok(*width * *height)
            },
        ))
        .expose(Key::<u32>::tagged::<Area>())
        .build();

    let injector = Injector::new(&spec).expect("error validating bindings");

    // prints "Area: 12"
    println!(
        "Area: {}",
        injector
            .get(&Key::<u32>::tagged::<Area>())
            .expect("error computing area")
    );
}
