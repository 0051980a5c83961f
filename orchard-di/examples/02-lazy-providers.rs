use orchard_di::component::{Component, Dependency, ResolvedDependencies};
use orchard_di::component_spec::ComponentSpec;
use orchard_di::injector::Injector;
use orchard_di::instance_provider::InstancePtr;
use orchard_di::key::Key;
use orchard_di::provider::Provider;
use orchard_di::InjectorError;

struct ExpensiveReport;

impl Component for ExpensiveReport {
    fn create(_dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
        println!("Creating the report...");
        Ok(ExpensiveReport)
    }
}

// a provider is injected instead of the report itself, so the report is only created when
// actually needed
struct ReportService {
    report: Provider<ExpensiveReport>,
}

impl Component for ReportService {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::provider(&Key::<ExpensiveReport>::new())]
    }

    fn create(dependencies: &mut ResolvedDependencies) -> Result<Self, InjectorError> {
        Ok(ReportService {
            report: dependencies.provider()?,
        })
    }
}

impl ReportService {
    fn report(&self) -> Result<InstancePtr<ExpensiveReport>, InjectorError> {
        self.report.resolve()
    }
}

fn main() {
    let injector = Injector::new(
        &ComponentSpec::builder()
            .register_constructor(&Key::<ExpensiveReport>::new())
            .register_constructor(&Key::<ReportService>::new())
            .expose(Key::<ReportService>::new())
            .build(),
    )
    .expect("error validating bindings");

    let service = injector
        .get(&Key::<ReportService>::new())
        .expect("error creating ReportService");
    println!("Service created.");

    // "Creating the report..." is printed only once
    let first = service.report().expect("error creating report");
    let second = service.report().expect("error creating report");
    assert!(InstancePtr::ptr_eq(&first, &second));
}
