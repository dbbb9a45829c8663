//! 依赖注入容器的集成测试

use di_abstractions::{
    ClassDescriptor, ClassSpec, DiContainer, Instance, InterfaceDescriptor, InterfaceSpec, Method,
    Value,
};
use di_common::{ContractError, ErrorKind};
use di_impl::DiContainerImpl;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

fn noop(arity: usize) -> Method {
    Method::new(arity, |_, _| Ok(Value::null()))
}

fn logger_interface(container: &DiContainerImpl) -> InterfaceDescriptor {
    container
        .define_interface(InterfaceSpec::new("Logger").method("log", 1))
        .unwrap()
}

fn console_logger(container: &DiContainerImpl, logger: &InterfaceDescriptor) -> ClassDescriptor {
    container
        .define_class(
            ClassSpec::new("ConsoleLogger")
                .implements(logger)
                .property("lines", 0i64)
                .method(
                    "log",
                    Method::new(1, |this, args| {
                        let count = this.get("lines").and_then(|v| v.as_i64()).unwrap_or(0);
                        this.set("lines", count + 1);
                        Ok(args.first().cloned().unwrap_or_default())
                    }),
                ),
        )
        .unwrap()
}

#[test]
fn test_interface_composition() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let reader = container
        .define_interface(InterfaceSpec::new("Reader").method("read", 1).method("close", 0))
        .unwrap();
    let writer = container
        .define_interface(InterfaceSpec::new("Writer").method("write", 2).method("close", 0))
        .unwrap();

    let stream = container
        .define_interface(InterfaceSpec::new("Stream").extends(&reader).extends(&writer))
        .unwrap();
    assert_eq!(stream.len(), 3);
    assert!(stream.extends(&reader));
    assert!(stream.extends(&writer));

    let closer = container
        .define_interface(InterfaceSpec::new("Closer").method("close", 1))
        .unwrap();
    let err = container
        .define_interface(InterfaceSpec::new("Broken").extends(&reader).extends(&closer))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureConflict);
    assert!(err.to_string().contains("close"));
}

#[test]
fn test_class_conformance_toggle() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);

    assert!(container
        .define_class(ClassSpec::new("Good").implements(&logger).method("log", noop(1)))
        .is_ok());

    let err = container
        .define_class(ClassSpec::new("WrongArity").implements(&logger).method("log", noop(2)))
        .unwrap_err();
    assert_eq!(
        err,
        ContractError::InterfaceConformance {
            class: "WrongArity".to_string(),
            interface: "Logger".to_string(),
            method: "log".to_string(),
            expected: 1,
            actual: Some(2),
        }
    );

    let err = container
        .define_class(ClassSpec::new("Missing").implements(&logger))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InterfaceConformance);

    container.disable_interface_checking();
    assert!(container
        .define_class(ClassSpec::new("Missing").implements(&logger))
        .is_ok());
    container.enable_interface_checking();
}

#[test]
fn test_bind_interface_to_class() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);
    let console = console_logger(&container, &logger);

    container.bind(&logger, &console).unwrap();
    let instance = container.make(&logger).unwrap();

    for signature in logger.signatures() {
        let method = instance.methods().get(signature.name()).unwrap();
        assert_eq!(method.arity(), signature.arity());
    }
    let echoed = instance.call("log", &["hello".into()]).unwrap();
    assert_eq!(echoed.as_str(), Some("hello"));
    assert_eq!(instance.get("lines").and_then(|v| v.as_i64()), Some(1));
}

#[test]
fn test_bind_rejects_nonconforming_class() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);
    let silent = container.define_class(ClassSpec::new("Silent")).unwrap();

    let err = container.bind(&logger, &silent).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InterfaceConformance);
    assert!(container.bindings().is_empty());

    container.disable_interface_checking();
    container.bind(&logger, &silent).unwrap();
    assert_eq!(container.bindings().len(), 1);
}

#[test]
fn test_bind_class_to_subclass() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let base = container.define_class(ClassSpec::new("Base")).unwrap();
    let derived = container
        .define_class(ClassSpec::new("Derived").extends(&base))
        .unwrap();
    let unrelated = container.define_class(ClassSpec::new("Unrelated")).unwrap();

    container.bind(&base, &derived).unwrap();
    assert_eq!(container.make(&base).unwrap().class(), Some(&derived));

    let err = container.bind(&derived, &unrelated).unwrap_err();
    assert_eq!(
        err,
        ContractError::NotADescendant {
            target: "Derived".to_string(),
            provider: "Unrelated".to_string(),
        }
    );
}

#[test]
fn test_singleton_and_fresh_instances() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);
    let console = console_logger(&container, &logger);

    let shared = Instance::from_methods([("log", noop(1))]);
    container.bind(&logger, &shared).unwrap();
    let first = container.make(&logger).unwrap();
    let second = container.make(&logger).unwrap();
    assert!(first.ptr_eq(&shared));
    assert!(first.ptr_eq(&second));

    container.bind(&logger, &console).unwrap();
    let first = container.make(&logger).unwrap();
    let second = container.make(&logger).unwrap();
    assert!(!first.ptr_eq(&second));
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_dependency_injection() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);
    let console = console_logger(&container, &logger);
    container.bind(&logger, &console).unwrap();

    let greeter = container
        .define_class(
            ClassSpec::new("Greeter")
                .dependency("logger", &logger)
                .method(
                    "greet",
                    Method::new(1, |this, args| {
                        let name = args.first().and_then(Value::as_str).unwrap_or("world");
                        let message = format!("hello {}", name);
                        if let Some(logger) = this.get_object("logger") {
                            logger.call("log", &[message.clone().into()])?;
                        }
                        Ok(message.into())
                    }),
                ),
        )
        .unwrap();

    let instance = container.make(&greeter).unwrap();
    let injected = instance.get_object("logger").unwrap();
    assert!(logger
        .signatures()
        .all(|signature| injected.has_method(signature.name())));

    let greeting = instance.call("greet", &["lorn".into()]).unwrap();
    assert_eq!(greeting.as_str(), Some("hello lorn"));
    assert_eq!(injected.get("lines").and_then(|v| v.as_i64()), Some(1));
}

#[test]
fn test_nested_dependencies_share_singletons() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);
    let shared = Instance::from_methods([("log", noop(1))]);
    container.bind(&logger, &shared).unwrap();

    let repository = container
        .define_class(ClassSpec::new("Repository").dependency("logger", &logger))
        .unwrap();
    let service = container
        .define_class(
            ClassSpec::new("Service")
                .dependency("logger", &logger)
                .dependency("repository", &repository),
        )
        .unwrap();

    let instance = container.make(&service).unwrap();
    let repository = instance.get_object("repository").unwrap();
    assert!(instance.get_object("logger").unwrap().ptr_eq(&shared));
    assert!(repository.get_object("logger").unwrap().ptr_eq(&shared));
}

#[test]
fn test_circular_dependency() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let first = container
        .define_interface(InterfaceSpec::new("First").method("run", 0))
        .unwrap();
    let second = container
        .define_interface(InterfaceSpec::new("Second").method("run", 0))
        .unwrap();
    let c1 = container
        .define_class(
            ClassSpec::new("C1")
                .implements(&first)
                .dependency("second", &second)
                .method("run", noop(0)),
        )
        .unwrap();
    let c2 = container
        .define_class(
            ClassSpec::new("C2")
                .implements(&second)
                .dependency("first", &first)
                .method("run", noop(0)),
        )
        .unwrap();
    container.bind(&first, &c1).unwrap();
    container.bind(&second, &c2).unwrap();

    let err = container.make(&first).unwrap_err();
    assert_eq!(
        err,
        ContractError::CircularDependency {
            chain: ["First", "C1", "Second", "C2", "First"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    );

    let err = container.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CircularDependency);
}

#[test]
fn test_self_dependency() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let node = container
        .define_interface(InterfaceSpec::new("Node").method("next", 0))
        .unwrap();
    let linked = container
        .define_class(
            ClassSpec::new("Linked")
                .implements(&node)
                .dependency("next", &node)
                .method("next", noop(0)),
        )
        .unwrap();
    container.bind(&node, &linked).unwrap();

    let err = container.make(&node).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CircularDependency);
}

#[test]
fn test_missing_binding() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let logger = logger_interface(&container);

    let err = container.make(&logger).unwrap_err();
    assert_eq!(
        err,
        ContractError::MissingBinding {
            target: "Logger".to_string()
        }
    );

    let consumer = container
        .define_class(ClassSpec::new("Consumer").dependency("logger", &logger))
        .unwrap();
    let err = container.make(&consumer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingBinding);
    assert_eq!(container.stats().resolution_errors, 2);
}

#[test]
fn test_parent_method_super_call() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let base = container
        .define_class(
            ClassSpec::new("Base")
                .property("greeting", "hello")
                .method(
                    "greet",
                    Method::new(1, |this, args| {
                        let greeting = this
                            .get("greeting")
                            .and_then(|v| v.as_str().map(str::to_string))
                            .unwrap_or_default();
                        let name = args.first().and_then(Value::as_str).unwrap_or("");
                        Ok(format!("{} {}", greeting, name).into())
                    }),
                ),
        )
        .unwrap();
    let loud = container
        .define_class(ClassSpec::new("Loud").extends(&base).method(
            "greet",
            Method::overriding(1, |this, parent, args| {
                let original = parent.invoke("greet", this, args)?;
                Ok(original.as_str().unwrap_or_default().to_uppercase().into())
            }),
        ))
        .unwrap();

    let instance = container.make(&loud).unwrap();
    let greeting = instance.call("greet", &["lorn".into()]).unwrap();
    assert_eq!(greeting.as_str(), Some("HELLO LORN"));

    let plain = container.make(&base).unwrap();
    assert_eq!(
        plain.call("greet", &["lorn".into()]).unwrap().as_str(),
        Some("hello lorn")
    );

    // 孙类不覆盖 greet 时，继承的覆盖方法仍调用 Base 的实现
    let quiet = container
        .define_class(ClassSpec::new("Quiet").extends(&loud).property("greeting", "hi"))
        .unwrap();
    let instance = container.make(&quiet).unwrap();
    assert_eq!(
        instance.call("greet", &["lorn".into()]).unwrap().as_str(),
        Some("HI LORN")
    );

    let polite = container
        .define_class(ClassSpec::new("Polite").extends(&quiet).method(
            "greet",
            Method::overriding(1, |this, parent, args| {
                let original = parent.invoke("greet", this, args)?;
                Ok(format!("{}, please", original.as_str().unwrap_or_default()).into())
            }),
        ))
        .unwrap();
    let instance = container.make(&polite).unwrap();
    assert_eq!(
        instance.call("greet", &["lorn".into()]).unwrap().as_str(),
        Some("HI LORN, please")
    );
}

#[test]
fn test_constructor_failure() {
    init_test_logging();
    let container = DiContainerImpl::new();
    let fragile = container
        .define_class(
            ClassSpec::new("Fragile").constructor(|_| Err(ContractError::construction_failed(
                "Fragile",
                "disk unavailable",
            ))),
        )
        .unwrap();

    let err = container.make(&fragile).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
}
