use orchard_di::binding::Binding;
use orchard_di::component::{Component, Dependency, ResolvedDependencies};
use orchard_di::component_spec::ComponentSpec;
use orchard_di::injector::Injector;
use orchard_di::instance_provider::InstancePtr;
use orchard_di::key::Key;
use orchard_di::InjectorError;

// this is a trait we would like to use in our component
trait TestTrait {
    fn foo(&self);
}

// this is a dependency which implements the above trait and knows how to construct itself
struct TestDependency;

impl TestTrait for TestDependency {
    fn foo(&self) {
        println!("Hello world!");
    }
}

impl Component for TestDependency {
    fn create(_dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
        Ok(TestDependency)
    }
}

// this is another component, but with a dependency
struct TestComponent {
    dependency: InstancePtr<dyn TestTrait + Send + Sync>,
}

impl TestComponent {
    fn call_foo(&self) {
        self.dependency.foo();
    }
}

impl Component for TestComponent {
    // dependencies are declared up front, so the whole graph can be checked before anything
    // gets created
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::instance(
            &Key::<dyn TestTrait + Send + Sync>::new(),
        )]
    }

    // dependencies are taken in the order they were declared
    fn create(dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
        Ok(TestComponent {
            dependency: dependencies.instance()?,
        })
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let spec = ComponentSpec::builder()
        .register_constructor(&Key::<TestDependency>::new())
        .register_constructor(&Key::<TestComponent>::new())
        // we're telling the injector to provide TestDependency when asked for dyn TestTrait
        .add_binding(Binding::alias(
            &Key::<dyn TestTrait + Send + Sync>::new(),
            &Key::<TestDependency>::new(),
            |dependency| dependency as InstancePtr<dyn TestTrait + Send + Sync>,
        ))
        // only exposed types (and whatever they depend on) can be requested from the injector
        .expose(Key::<TestComponent>::new())
        .build();

    // validation happens here - a missing binding or a cycle would be reported as an error
    let injector = Injector::new(&spec).expect("error validating bindings");

    let component = injector
        .get(&Key::<TestComponent>::new())
        .expect("error creating TestComponent");

    // prints "Hello world!"
    component.call_foo();
}
