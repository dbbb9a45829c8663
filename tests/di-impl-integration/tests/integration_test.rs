//! 依赖注入容器的集中集成测试：全局容器、配置加载与并发解析

use anyhow::Result;
use di_abstractions::{ClassSpec, DiContainer, Instance, InterfaceSpec, Method, Value};
use di_common::{ContainerConfig, ErrorKind};
use di_impl::DiContainerImpl;
use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Once};
use std::thread;

static INIT: Once = Once::new();

fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    });
}

fn counter_method(hits: Arc<AtomicI64>) -> Method {
    Method::new(0, move |_, _| Ok((hits.fetch_add(1, Ordering::SeqCst) + 1).into()))
}

#[test]
fn test_global_container_round_trip() -> Result<()> {
    init_test_logging();
    let clock = di_impl::define_interface(InterfaceSpec::new("GlobalClock").method("now", 0))?;
    let fixed = di_impl::define_class(
        ClassSpec::new("FixedClock")
            .implements(&clock)
            .method("now", Method::new(0, |_, _| Ok(1_700_000_000_i64.into()))),
    )?;
    di_impl::bind(&clock, &fixed)?;

    let instance = di_impl::make(&clock)?;
    assert_eq!(instance.call("now", &[])?.as_i64(), Some(1_700_000_000));
    assert!(di_impl::global().is_bound(&(&clock).into()));

    di_impl::disable_interface_checking();
    assert!(!di_impl::global().is_interface_checking_enabled());
    di_impl::enable_interface_checking();
    assert!(di_impl::global().is_interface_checking_enabled());
    Ok(())
}

#[test]
fn test_container_from_config_file() -> Result<()> {
    init_test_logging();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
enable_interface_checking = false
max_resolution_depth = 8
auto_wire_concrete_classes = false

[logging]
level = "debug"
"#
    )?;

    let config = ContainerConfig::load(Some(file.path()))?;
    assert!(!config.enable_interface_checking);
    assert_eq!(config.max_resolution_depth, 8);
    assert_eq!(config.logging.level, "debug");

    let container = DiContainerImpl::with_config(config);
    assert!(!container.is_interface_checking_enabled());

    let plain = container.define_class(ClassSpec::new("Plain"))?;
    let err = container.make(&plain).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingBinding);
    Ok(())
}

#[test]
fn test_validate_reports_healthy_graph() -> Result<()> {
    init_test_logging();
    let container = DiContainerImpl::new();
    let store = container.define_interface(InterfaceSpec::new("Store").method("get", 1))?;
    let memory = container.define_class(
        ClassSpec::new("MemoryStore")
            .implements(&store)
            .method("get", Method::new(1, |_, _| Ok(Value::null()))),
    )?;
    let service = container.define_class(ClassSpec::new("Service").dependency("store", &store))?;
    container.bind(&store, &memory)?;
    container.bind(&service, &service)?;

    container.validate()?;
    let infos = container.bindings();
    let targets: Vec<&str> = infos.iter().map(|info| info.target.as_str()).collect();
    assert_eq!(targets, vec!["Service", "Store"]);
    Ok(())
}

#[test]
fn test_validate_agrees_with_make_on_class_bindings() -> Result<()> {
    init_test_logging();
    let container = DiContainerImpl::new();
    let first = container.define_interface(InterfaceSpec::new("First").method("run", 0))?;
    let base = container.define_class(
        ClassSpec::new("Base").method("run", Method::new(0, |_, _| Ok(Value::null()))),
    )?;
    let derived =
        container.define_class(ClassSpec::new("Derived").extends(&base).dependency("first", &first))?;
    container.bind(&first, &base)?;
    container.bind(&base, &derived)?;

    // First 的提供者 Base 直接实例化，不会走到 Base -> Derived 的绑定
    let instance = container.make(&first)?;
    assert_eq!(instance.class(), Some(&base));

    let make_err = container.make(&base).unwrap_err();
    let validate_err = container.validate().unwrap_err();
    assert_eq!(make_err.kind(), ErrorKind::CircularDependency);
    assert_eq!(validate_err, make_err);

    container.bind(&base, &base)?;
    assert!(container.make(&base).is_ok());
    container.validate()?;
    Ok(())
}

#[test]
fn test_concurrent_resolution() -> Result<()> {
    init_test_logging();
    let container = Arc::new(DiContainerImpl::new());
    let counter = container.define_interface(InterfaceSpec::new("Counter").method("increment", 0))?;
    let hits = Arc::new(AtomicI64::new(0));
    let shared = Instance::from_methods([("increment", counter_method(Arc::clone(&hits)))]);
    container.bind(&counter, &shared)?;

    let consumer =
        container.define_class(ClassSpec::new("Consumer").dependency("counter", &counter))?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            let consumer = consumer.clone();
            let shared = shared.clone();
            thread::spawn(move || -> di_common::DependencyResult<()> {
                for _ in 0..25 {
                    let instance = container.make(&consumer)?;
                    if let Some(counter) = instance.get_object("counter") {
                        assert!(counter.ptr_eq(&shared));
                        counter.call("increment", &[])?;
                    }
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("解析线程异常退出"))??;
    }

    assert_eq!(hits.load(Ordering::SeqCst), 200);
    assert_eq!(container.stats().resolved_instances, 200);
    Ok(())
}
