use bindery::introspect::{arg, ConstructorParam, ConstructorRegistry};
use bindery::{BindingRegistry, Shared, TypeKey};

struct Logger {
    prefix: &'static str,
}

impl Logger {
    fn log(&self, message: &str) {
        println!("{} {}", self.prefix, message);
    }
}

struct GreetingService {
    logger: Shared<Logger>,
}

impl GreetingService {
    fn greet(&self, name: &str) {
        self.logger.log(&format!("Hello, {name}!"));
    }
}

fn main() {
    let mut ctors = ConstructorRegistry::new();
    ctors
        .register::<Logger, _>(vec![], |_| Ok(Logger { prefix: "[demo]" }))
        .unwrap();
    ctors
        .register::<GreetingService, _>(
            vec![ConstructorParam::new("logger", TypeKey::of::<Logger>())],
            |args| {
                Ok(GreetingService {
                    logger: arg::<Logger>(&args, 0)?,
                })
            },
        )
        .unwrap();

    let mut registry = BindingRegistry::with_introspector(Shared::new(ctors));
    registry.bind::<Logger>().to_eager_singleton();

    let session = registry.new_session().expect("session creation");

    let service = session.resolve::<GreetingService>().expect("resolve");
    service.greet("world");

    // Two resolves rebuild the service, both share the singleton logger.
    let again = session.resolve::<GreetingService>().expect("resolve");
    assert!(Shared::ptr_eq(&service.logger, &again.logger));
    again.greet("again");
}
