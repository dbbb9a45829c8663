//! 依赖注入容器实现

use di_abstractions::{
    check_provider, Binding, BindingInfo, BindingMap, Checking, CircularDependencyDetector,
    ClassDescriptor, ClassSpec, ContainerStats, DefaultObjectFactory, DiContainer, Instance,
    InterfaceDescriptor, InterfaceSpec, ObjectFactory, Provider, ResolveContext, ResolveOptions,
    Target, Value,
};
use di_common::{ContainerConfig, ContractError, DependencyResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 容器状态：绑定表和检查开关共用一把锁
struct ContainerState {
    bindings: BindingMap,
    checking: Checking,
}

/// 具体的依赖注入容器实现
///
/// 锁只在读写绑定表和开关时持有，构造函数和方法体执行期间不持有任何锁。
pub struct DiContainerImpl {
    state: RwLock<ContainerState>,
    config: ContainerConfig,
    factory: Arc<dyn ObjectFactory>,
    resolved_instances: AtomicUsize,
    resolution_errors: AtomicUsize,
}

impl DiContainerImpl {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            state: RwLock::new(ContainerState {
                bindings: BindingMap::new(),
                checking: Checking::from(config.enable_interface_checking),
            }),
            config,
            factory: Arc::new(DefaultObjectFactory),
            resolved_instances: AtomicUsize::new(0),
            resolution_errors: AtomicUsize::new(0),
        }
    }

    /// 替换对象工厂
    pub fn with_object_factory(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        info!("使用对象工厂: {}", factory.name());
        self.factory = factory;
        self
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 当前检查开关
    pub fn checking(&self) -> Checking {
        self.state.read().checking
    }

    /// 已注册绑定数量
    pub fn binding_count(&self) -> usize {
        self.state.read().bindings.len()
    }

    /// 容器统计信息
    pub fn stats(&self) -> ContainerStats {
        let state = self.state.read();
        ContainerStats {
            registered_bindings: state.bindings.len(),
            singleton_bindings: state
                .bindings
                .values()
                .filter(|binding| binding.provider.is_singleton())
                .count(),
            resolved_instances: self.resolved_instances.load(Ordering::Relaxed),
            resolution_errors: self.resolution_errors.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, target: &Target) -> Option<Provider> {
        self.state
            .read()
            .bindings
            .get(&target.id())
            .map(|binding| binding.provider.clone())
    }

    fn resolve(&self, target: &Target, context: &mut ResolveContext) -> DependencyResult<Instance> {
        match self.lookup(target) {
            Some(Provider::Instance(instance)) => {
                debug!("返回单例: {} -> {}", target, instance.describe());
                Ok(instance)
            }
            Some(Provider::Class(class)) => self.instantiate(target, &class, context),
            None => match target {
                Target::Class(class) => self.instantiate(target, class, context),
                Target::Interface(interface) => Err(ContractError::MissingBinding {
                    target: interface.name().to_string(),
                }),
            },
        }
    }

    fn instantiate(
        &self,
        target: &Target,
        class: &ClassDescriptor,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        context.push_target(target.clone())?;
        let via_provider = class.id() != target.id();
        if via_provider {
            context.push_provider(Target::Class(class.clone()))?;
        }

        let mut resolved = Vec::with_capacity(class.dependencies().len());
        for (property, dependency) in class.dependencies() {
            debug!(
                "解析依赖: {}.{} -> {} (深度 {})",
                class.name(),
                property,
                dependency,
                context.depth()
            );
            resolved.push((property.clone(), self.resolve(dependency, context)?));
        }

        if via_provider {
            context.pop_target();
        }
        context.pop_target();

        let instance = self.factory.construct(class)?;
        for (property, dependency) in resolved {
            instance.set(property, Value::Object(dependency));
        }
        Ok(instance)
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DiContainerImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiContainerImpl")
            .field("config", &self.config)
            .field("checking", &self.checking())
            .field("bindings", &self.binding_count())
            .field("factory", &self.factory.name())
            .finish()
    }
}

impl DiContainer for DiContainerImpl {
    fn define_interface(&self, spec: InterfaceSpec) -> DependencyResult<InterfaceDescriptor> {
        InterfaceDescriptor::define(spec, self.checking())
    }

    fn define_class(&self, spec: ClassSpec) -> DependencyResult<ClassDescriptor> {
        ClassDescriptor::define(spec, self.checking())
    }

    fn bind(&self, target: impl Into<Target>, provider: impl Into<Provider>) -> DependencyResult<()> {
        let target = target.into();
        let provider = provider.into();

        if self.checking().is_enabled() {
            check_provider(&target, &provider).map_err(|e| {
                warn!("绑定校验失败: {} -> {}: {}", target, provider.describe(), e);
                e
            })?;
        }

        info!(
            "绑定 {} {} -> {}",
            target.kind(),
            target,
            provider.describe()
        );

        let id = target.id();
        let previous = self
            .state
            .write()
            .bindings
            .insert(id, Binding::new(target, provider));
        if let Some(previous) = previous {
            warn!(
                "替换已有绑定: {} (原提供者 {})",
                previous.target,
                previous.provider.describe()
            );
        }
        Ok(())
    }

    fn make(&self, target: impl Into<Target>) -> DependencyResult<Instance> {
        let target = target.into();
        debug!("解析目标: {}", target);

        let mut context = ResolveContext::new(ResolveOptions {
            max_depth: self.config.max_resolution_depth,
        });
        let result = if !self.config.auto_wire_concrete_classes && !self.is_bound(&target) {
            Err(ContractError::MissingBinding {
                target: target.name().to_string(),
            })
        } else {
            self.resolve(&target, &mut context)
        };

        match &result {
            Ok(_) => {
                self.resolved_instances.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.resolution_errors.fetch_add(1, Ordering::Relaxed);
                debug!("解析失败: {}: {}", target, e);
            }
        }
        result
    }

    fn enable_interface_checking(&self) {
        self.state.write().checking = Checking::Enabled;
        info!("启用接口契约检查");
    }

    fn disable_interface_checking(&self) {
        self.state.write().checking = Checking::Disabled;
        info!("关闭接口契约检查");
    }

    fn is_interface_checking_enabled(&self) -> bool {
        self.checking().is_enabled()
    }

    fn is_bound(&self, target: &Target) -> bool {
        self.state.read().bindings.contains_key(&target.id())
    }

    fn bindings(&self) -> Vec<BindingInfo> {
        let mut infos: Vec<BindingInfo> = self
            .state
            .read()
            .bindings
            .values()
            .map(Binding::info)
            .collect();
        infos.sort_by(|a, b| a.target.cmp(&b.target));
        infos
    }

    fn validate(&self) -> DependencyResult<()> {
        info!("验证容器绑定");
        let state = self.state.read();
        CircularDependencyDetector::new(&state.bindings).detect_circular_dependencies()
    }

    fn reset(&self) {
        {
            let mut state = self.state.write();
            state.bindings.clear();
            state.checking = Checking::from(self.config.enable_interface_checking);
        }
        self.resolved_instances.store(0, Ordering::Relaxed);
        self.resolution_errors.store(0, Ordering::Relaxed);
        info!("容器已重置");
    }
}
