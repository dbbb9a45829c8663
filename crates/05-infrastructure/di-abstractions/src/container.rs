//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use crate::class::{ClassDescriptor, ClassSpec};
use crate::interface::{InterfaceDescriptor, InterfaceSpec};
use crate::object::Instance;
use crate::registry::{BindingInfo, Provider, Target};
use di_common::DependencyResult;

/// 依赖注入容器 trait
///
/// 所有操作同步执行，不会挂起。
pub trait DiContainer: Send + Sync {
    /// 按当前检查开关定义接口
    fn define_interface(&self, spec: InterfaceSpec) -> DependencyResult<InterfaceDescriptor>;

    /// 按当前检查开关定义类
    fn define_class(&self, spec: ClassSpec) -> DependencyResult<ClassDescriptor>;

    /// 注册或替换绑定
    fn bind(&self, target: impl Into<Target>, provider: impl Into<Provider>) -> DependencyResult<()>
    where
        Self: Sized;

    /// 解析目标，返回完整装配的实例
    fn make(&self, target: impl Into<Target>) -> DependencyResult<Instance>
    where
        Self: Sized;

    /// 启用接口契约检查
    fn enable_interface_checking(&self);

    /// 关闭接口契约检查
    fn disable_interface_checking(&self);

    /// 是否启用接口契约检查
    fn is_interface_checking_enabled(&self) -> bool;

    /// 检查目标是否已绑定
    fn is_bound(&self, target: &Target) -> bool;

    /// 获取所有绑定的诊断信息（按目标名称排序）
    fn bindings(&self) -> Vec<BindingInfo>;

    /// 不实例化任何对象，验证绑定图中没有循环依赖和缺失绑定
    fn validate(&self) -> DependencyResult<()>;

    /// 清空绑定并恢复初始检查开关
    fn reset(&self);
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册绑定数量
    pub registered_bindings: usize,
    /// 单例绑定数量
    pub singleton_bindings: usize,
    /// 成功解析次数
    pub resolved_instances: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
