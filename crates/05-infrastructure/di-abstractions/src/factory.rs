//! 对象工厂抽象接口
//!
//! 容器只决定把哪些方法和属性合并进实例，真正的对象构造交给对象工厂

use crate::class::ClassDescriptor;
use crate::object::Instance;
use di_common::{ContractError, DependencyResult, ErrorKind};
use std::fmt;
use tracing::debug;

/// 对象工厂 trait
///
/// 根据类描述符构造实例：实例必须支持按名称查找方法，
/// 并能保存每个实例独有的属性（依赖注入写入这些属性）。
pub trait ObjectFactory: Send + Sync {
    /// 构造实例
    fn construct(&self, class: &ClassDescriptor) -> DependencyResult<Instance>;

    /// 获取工厂名称
    fn name(&self) -> &str {
        "object-factory"
    }
}

/// 默认对象工厂
///
/// 复制类的合并方法表和属性默认值，然后执行构造函数。
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {
    fn construct(&self, class: &ClassDescriptor) -> DependencyResult<Instance> {
        let instance = Instance::new(Some(class.clone()), class.methods().clone());
        for (name, value) in class.properties() {
            instance.set(name.clone(), value.clone());
        }

        if let Some(constructor) = class.constructor() {
            constructor(&instance).map_err(|e| match e.kind() {
                ErrorKind::Construction => e,
                _ => ContractError::construction_failed(class.name(), e.to_string()),
            })?;
        }

        debug!("构造实例: {}", instance.describe());
        Ok(instance)
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// Lambda 工厂包装器
pub struct LambdaFactory<F>
where
    F: Fn(&ClassDescriptor) -> DependencyResult<Instance> + Send + Sync,
{
    factory_fn: F,
    name: String,
}

impl<F> LambdaFactory<F>
where
    F: Fn(&ClassDescriptor) -> DependencyResult<Instance> + Send + Sync,
{
    /// 创建新的 Lambda 工厂
    pub fn new(name: impl Into<String>, factory_fn: F) -> Self {
        Self {
            factory_fn,
            name: name.into(),
        }
    }
}

impl<F> ObjectFactory for LambdaFactory<F>
where
    F: Fn(&ClassDescriptor) -> DependencyResult<Instance> + Send + Sync,
{
    fn construct(&self, class: &ClassDescriptor) -> DependencyResult<Instance> {
        (self.factory_fn)(class)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for LambdaFactory<F>
where
    F: Fn(&ClassDescriptor) -> DependencyResult<Instance> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaFactory")
            .field("name", &self.name)
            .field("factory_fn", &"<function>")
            .finish()
    }
}
