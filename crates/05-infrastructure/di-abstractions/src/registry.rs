//! 绑定注册表类型

use crate::class::ClassDescriptor;
use crate::interface::InterfaceDescriptor;
use crate::object::Instance;
use di_common::{ContractError, DependencyResult};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// 目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// 接口
    Interface,
    /// 类
    Class,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface => f.write_str("interface"),
            Self::Class => f.write_str("class"),
        }
    }
}

/// 绑定和解析的目标：接口或类
#[derive(Debug, Clone)]
pub enum Target {
    /// 接口目标
    Interface(InterfaceDescriptor),
    /// 类目标
    Class(ClassDescriptor),
}

impl Target {
    /// 目标身份
    pub fn id(&self) -> Uuid {
        match self {
            Self::Interface(interface) => interface.id(),
            Self::Class(class) => class.id(),
        }
    }

    /// 目标名称
    pub fn name(&self) -> &str {
        match self {
            Self::Interface(interface) => interface.name(),
            Self::Class(class) => class.name(),
        }
    }

    /// 目标类型
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Interface(_) => TargetKind::Interface,
            Self::Class(_) => TargetKind::Class,
        }
    }

    /// 作为类描述符
    pub fn as_class(&self) -> Option<&ClassDescriptor> {
        match self {
            Self::Class(class) => Some(class),
            Self::Interface(_) => None,
        }
    }

    /// 作为接口描述符
    pub fn as_interface(&self) -> Option<&InterfaceDescriptor> {
        match self {
            Self::Interface(interface) => Some(interface),
            Self::Class(_) => None,
        }
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Target {}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<InterfaceDescriptor> for Target {
    fn from(interface: InterfaceDescriptor) -> Self {
        Self::Interface(interface)
    }
}

impl From<&InterfaceDescriptor> for Target {
    fn from(interface: &InterfaceDescriptor) -> Self {
        Self::Interface(interface.clone())
    }
}

impl From<ClassDescriptor> for Target {
    fn from(class: ClassDescriptor) -> Self {
        Self::Class(class)
    }
}

impl From<&ClassDescriptor> for Target {
    fn from(class: &ClassDescriptor) -> Self {
        Self::Class(class.clone())
    }
}

impl From<&Target> for Target {
    fn from(target: &Target) -> Self {
        target.clone()
    }
}

/// 绑定提供者
#[derive(Debug, Clone)]
pub enum Provider {
    /// 按需实例化的类，每次解析产生新实例
    Class(ClassDescriptor),
    /// 预先构造好的单例实例
    Instance(Instance),
}

impl Provider {
    /// 是否为单例实例
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::Instance(_))
    }

    /// 用于日志和诊断的描述
    pub fn describe(&self) -> String {
        match self {
            Self::Class(class) => class.name().to_string(),
            Self::Instance(instance) => instance.describe(),
        }
    }
}

impl From<ClassDescriptor> for Provider {
    fn from(class: ClassDescriptor) -> Self {
        Self::Class(class)
    }
}

impl From<&ClassDescriptor> for Provider {
    fn from(class: &ClassDescriptor) -> Self {
        Self::Class(class.clone())
    }
}

impl From<Instance> for Provider {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<&Instance> for Provider {
    fn from(instance: &Instance) -> Self {
        Self::Instance(instance.clone())
    }
}

/// 绑定
#[derive(Debug, Clone)]
pub struct Binding {
    /// 绑定目标
    pub target: Target,
    /// 提供者
    pub provider: Provider,
}

impl Binding {
    /// 创建新的绑定
    pub fn new(target: Target, provider: Provider) -> Self {
        Self { target, provider }
    }

    /// 绑定诊断信息
    pub fn info(&self) -> BindingInfo {
        BindingInfo {
            target: self.target.name().to_string(),
            target_kind: self.target.kind(),
            provider: self.provider.describe(),
            singleton: self.provider.is_singleton(),
        }
    }
}

/// 绑定诊断信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    /// 目标名称
    pub target: String,
    /// 目标类型
    pub target_kind: TargetKind,
    /// 提供者描述
    pub provider: String,
    /// 是否为单例
    pub singleton: bool,
}

/// 绑定表：目标身份到绑定
pub type BindingMap = HashMap<Uuid, Binding>;

/// 循环依赖检测器
///
/// 不实例化任何对象，按解析时的规则遍历依赖图：
/// 已绑定目标走向其提供者，未绑定的类自行提供，未绑定的接口视为缺失绑定。
#[derive(Debug)]
pub struct CircularDependencyDetector<'a> {
    bindings: &'a BindingMap,
}

impl<'a> CircularDependencyDetector<'a> {
    /// 创建检测器
    pub fn new(bindings: &'a BindingMap) -> Self {
        Self { bindings }
    }

    /// 检测所有绑定目标出发的依赖图
    pub fn detect_circular_dependencies(&self) -> DependencyResult<()> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        let mut roots: Vec<&Binding> = self.bindings.values().collect();
        roots.sort_by(|a, b| a.target.name().cmp(b.target.name()));

        for binding in roots {
            self.dfs_check(&binding.target, &mut path, &mut visited)?;
        }
        Ok(())
    }

    /// 检测从指定目标出发的依赖图
    pub fn detect_from(&self, target: &Target) -> DependencyResult<()> {
        self.dfs_check(target, &mut Vec::new(), &mut HashSet::new())
    }

    fn dfs_check(
        &self,
        current: &Target,
        path: &mut Vec<Target>,
        visited: &mut HashSet<Uuid>,
    ) -> DependencyResult<()> {
        Self::check_reentry(current, path)?;
        if visited.contains(&current.id()) {
            return Ok(());
        }

        path.push(current.clone());
        let provider = self.provider_class(current)?;
        let substituted = provider.as_ref().filter(|class| class.id() != current.id());
        if let Some(class) = substituted {
            let provider_target = Target::Class(class.clone());
            Self::check_reentry(&provider_target, path)?;
            path.push(provider_target);
        }

        if let Some(class) = &provider {
            for dependency in class.dependencies().values() {
                self.dfs_check(dependency, path, visited)?;
            }
        }

        if substituted.is_some() {
            path.pop();
        }
        path.pop();
        visited.insert(current.id());
        Ok(())
    }

    fn check_reentry(target: &Target, path: &[Target]) -> DependencyResult<()> {
        if let Some(position) = path.iter().position(|t| t.id() == target.id()) {
            let mut chain: Vec<String> = path[position..]
                .iter()
                .map(|t| t.name().to_string())
                .collect();
            chain.push(target.name().to_string());
            return Err(ContractError::CircularDependency { chain });
        }
        Ok(())
    }

    /// 解析时实际实例化的类；绑定的提供者类直接实例化，不再查找它自身的绑定
    fn provider_class(&self, target: &Target) -> DependencyResult<Option<ClassDescriptor>> {
        match self.bindings.get(&target.id()).map(|b| &b.provider) {
            Some(Provider::Instance(_)) => Ok(None),
            Some(Provider::Class(class)) => Ok(Some(class.clone())),
            None => match target {
                Target::Class(class) => Ok(Some(class.clone())),
                Target::Interface(interface) => Err(ContractError::MissingBinding {
                    target: interface.name().to_string(),
                }),
            },
        }
    }
}
