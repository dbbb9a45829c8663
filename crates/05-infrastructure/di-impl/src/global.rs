//! 进程级默认容器
//!
//! 首次访问时按环境变量加载配置；需要隔离状态时应自行创建 [`DiContainerImpl`]。

use crate::container::DiContainerImpl;
use di_abstractions::{
    ClassDescriptor, ClassSpec, DiContainer, Instance, InterfaceDescriptor, InterfaceSpec,
    Provider, Target,
};
use di_common::{ContainerConfig, DependencyResult};
use once_cell::sync::Lazy;
use tracing::warn;

static GLOBAL_CONTAINER: Lazy<DiContainerImpl> = Lazy::new(|| {
    let config = ContainerConfig::load(None).unwrap_or_else(|e| {
        warn!("加载容器配置失败，使用默认配置: {}", e);
        ContainerConfig::default()
    });
    DiContainerImpl::with_config(config)
});

/// 获取全局容器
pub fn global() -> &'static DiContainerImpl {
    &GLOBAL_CONTAINER
}

/// 在全局容器中定义接口
pub fn define_interface(spec: InterfaceSpec) -> DependencyResult<InterfaceDescriptor> {
    global().define_interface(spec)
}

/// 在全局容器中定义类
pub fn define_class(spec: ClassSpec) -> DependencyResult<ClassDescriptor> {
    global().define_class(spec)
}

/// 在全局容器中注册绑定
pub fn bind(target: impl Into<Target>, provider: impl Into<Provider>) -> DependencyResult<()> {
    global().bind(target, provider)
}

/// 从全局容器解析目标
pub fn make(target: impl Into<Target>) -> DependencyResult<Instance> {
    global().make(target)
}

/// 启用全局容器的接口契约检查
pub fn enable_interface_checking() {
    global().enable_interface_checking();
}

/// 关闭全局容器的接口契约检查
pub fn disable_interface_checking() {
    global().disable_interface_checking();
}
