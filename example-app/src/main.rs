//! # 示例应用程序
//!
//! 演示结构化契约依赖注入容器：接口组合、契约检查、绑定、递归解析和父类方法调用

use anyhow::{Context, Result};
use clap::Parser;
use di_abstractions::{
    ClassDescriptor, ClassSpec, DiContainer, Instance, InterfaceDescriptor, InterfaceSpec, Method,
    Value,
};
use di_common::{init_logging, ContainerConfig, LoggingConfig};
use di_impl::DiContainerImpl;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn DI 示例应用")]
struct Args {
    /// 配置文件路径（toml/json/yaml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 关闭接口契约检查
    #[arg(long)]
    disable_checking: bool,

    /// 使用开发环境日志格式
    #[arg(long)]
    dev: bool,

    /// 问候对象
    #[arg(long, default_value = "lorn")]
    name: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ContainerConfig::load(args.config.as_deref()).context("加载容器配置失败")?;
    if args.dev {
        config.logging = LoggingConfig::development();
    }
    if let Some(level) = &args.log_level {
        config.logging = config.logging.with_level(level.clone());
    }
    if args.disable_checking {
        config.enable_interface_checking = false;
    }

    init_logging(&config.logging).context("初始化日志失败")?;
    info!("启动 Lorn DI 示例应用");

    let container = DiContainerImpl::with_config(config);
    let contracts = register_contracts(&container)?;

    demonstrate_injection(&container, &contracts, &args.name)?;
    demonstrate_singleton(&container, &contracts)?;
    demonstrate_cycle_detection(&container)?;

    let stats = container.stats();
    info!(
        "容器统计: 绑定 {} 个（单例 {} 个），成功解析 {} 次，失败 {} 次",
        stats.registered_bindings,
        stats.singleton_bindings,
        stats.resolved_instances,
        stats.resolution_errors
    );
    Ok(())
}

/// 示例中用到的接口和类
struct Contracts {
    logger: InterfaceDescriptor,
    greeter: InterfaceDescriptor,
    console_logger: ClassDescriptor,
    app: ClassDescriptor,
}

fn register_contracts(container: &DiContainerImpl) -> Result<Contracts> {
    let named = container.define_interface(InterfaceSpec::new("Named").method("name", 0))?;
    let logger = container.define_interface(InterfaceSpec::new("Logger").method("log", 1))?;
    let greeter = container.define_interface(
        InterfaceSpec::new("Greeter")
            .extends(&named)
            .method("greet", 1),
    )?;

    let console_logger = container.define_class(
        ClassSpec::new("ConsoleLogger")
            .implements(&logger)
            .property("prefix", "[app]")
            .method(
                "log",
                Method::new(1, |this, args| {
                    let prefix = this
                        .get("prefix")
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_default();
                    let message = args.first().and_then(Value::as_str).unwrap_or_default();
                    println!("{} {}", prefix, message);
                    Ok(Value::null())
                }),
            ),
    )?;

    let polite_greeter = container.define_class(
        ClassSpec::new("PoliteGreeter")
            .implements(&greeter)
            .dependency("logger", &logger)
            .method("name", Method::new(0, |_, _| Ok("polite".into())))
            .method(
                "greet",
                Method::new(1, |this, args| {
                    let name = args.first().and_then(Value::as_str).unwrap_or("world");
                    let message = format!("你好, {}", name);
                    if let Some(logger) = this.get_object("logger") {
                        logger.call("log", &[message.clone().into()])?;
                    }
                    Ok(message.into())
                }),
            ),
    )?;

    // 覆盖 greet，并通过父类方法表调用原实现
    let excited_greeter = container.define_class(
        ClassSpec::new("ExcitedGreeter")
            .extends(&polite_greeter)
            .method("name", Method::new(0, |_, _| Ok("excited".into())))
            .method(
                "greet",
                Method::overriding(1, |this, parent, args| {
                    let original = parent.invoke("greet", this, args)?;
                    Ok(format!("{}!!!", original.as_str().unwrap_or_default()).into())
                }),
            ),
    )?;

    let app = container.define_class(
        ClassSpec::new("App")
            .dependency("greeter", &greeter)
            .dependency("logger", &logger)
            .constructor(|this| {
                this.set("started", serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }));
                Ok(())
            }),
    )?;

    container.bind(&logger, &console_logger)?;
    container.bind(&greeter, &excited_greeter)?;

    Ok(Contracts {
        logger,
        greeter,
        console_logger,
        app,
    })
}

fn demonstrate_injection(container: &DiContainerImpl, contracts: &Contracts, name: &str) -> Result<()> {
    info!("演示递归依赖注入");
    let app = container.make(&contracts.app)?;

    let greeter = app
        .get_object("greeter")
        .context("App 未注入 greeter")?;
    let greeter_name = greeter.call("name", &[])?;
    let greeting = greeter.call("greet", &[name.into()])?;
    info!(
        "{} 问候结果: {}",
        greeter_name.as_str().unwrap_or_default(),
        greeting.as_str().unwrap_or_default()
    );

    for info in container.bindings() {
        info!(
            "绑定 {} {} -> {} (单例: {})",
            info.target_kind, info.target, info.provider, info.singleton
        );
    }
    Ok(())
}

fn demonstrate_singleton(container: &DiContainerImpl, contracts: &Contracts) -> Result<()> {
    info!("演示单例绑定");
    let shared_logger = Instance::from_methods([(
        "log",
        Method::new(1, |_, args| {
            let message = args.first().and_then(Value::as_str).unwrap_or_default();
            println!("[shared] {}", message);
            Ok(Value::null())
        }),
    )]);
    container.bind(&contracts.logger, &shared_logger)?;

    let first = container.make(&contracts.logger)?;
    let second = container.make(&contracts.logger)?;
    info!("单例解析结果相同: {}", first.ptr_eq(&second));

    let first_app = container.make(&contracts.app)?;
    let second_app = container.make(&contracts.app)?;
    info!("类绑定每次创建新实例: {}", !first_app.ptr_eq(&second_app));

    match container.make(&contracts.greeter)?.call("farewell", &[]) {
        Ok(_) => warn!("意外调用成功"),
        Err(e) => info!("调用未声明的方法: {}", e),
    }

    container.bind(&contracts.logger, &contracts.console_logger)?;
    Ok(())
}

fn demonstrate_cycle_detection(container: &DiContainerImpl) -> Result<()> {
    info!("演示循环依赖检测");
    let ping = container.define_interface(InterfaceSpec::new("Ping").method("ping", 0))?;
    let pong = container.define_interface(InterfaceSpec::new("Pong").method("pong", 0))?;
    let ping_impl = container.define_class(
        ClassSpec::new("PingImpl")
            .implements(&ping)
            .dependency("pong", &pong)
            .method("ping", Method::placeholder(0)),
    )?;
    let pong_impl = container.define_class(
        ClassSpec::new("PongImpl")
            .implements(&pong)
            .dependency("ping", &ping)
            .method("pong", Method::placeholder(0)),
    )?;
    container.bind(&ping, &ping_impl)?;
    container.bind(&pong, &pong_impl)?;

    if let Err(e) = container.validate() {
        warn!("静态验证发现问题: {}", e);
    }
    match container.make(&ping) {
        Ok(_) => error!("循环依赖未被检测到"),
        Err(e) => info!("解析失败（预期）: {}", e),
    }
    Ok(())
}
