//! 类描述符
//!
//! 类可以声明实现的接口、父类、依赖和自身方法。继承时先复制父类方法表，
//! 再用自身方法覆盖同名条目；父类原始方法表单独保留，供覆盖方法显式调用。

use crate::conformance::{self, Checking};
use crate::interface::InterfaceDescriptor;
use crate::object::{Instance, Member, Method, MethodTable, Value};
use crate::registry::Target;
use di_common::DependencyResult;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 构造函数类型
///
/// 在实例创建后、依赖注入前执行。
pub type Constructor = Arc<dyn Fn(&Instance) -> DependencyResult<()> + Send + Sync>;

/// 类定义
#[derive(Clone)]
pub struct ClassSpec {
    name: String,
    implements: Vec<InterfaceDescriptor>,
    extends: Option<ClassDescriptor>,
    dependencies: Vec<(String, Target)>,
    methods: Vec<(String, Method)>,
    properties: Vec<(String, Value)>,
    constructor: Option<Constructor>,
}

impl ClassSpec {
    /// 创建新的类定义
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements: Vec::new(),
            extends: None,
            dependencies: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            constructor: None,
        }
    }

    /// 声明实现的接口
    pub fn implements(mut self, interface: &InterfaceDescriptor) -> Self {
        self.implements.push(interface.clone());
        self
    }

    /// 声明父类
    pub fn extends(mut self, parent: &ClassDescriptor) -> Self {
        self.extends = Some(parent.clone());
        self
    }

    /// 声明依赖，解析后注入到同名属性
    pub fn dependency(mut self, property: impl Into<String>, target: impl Into<Target>) -> Self {
        self.dependencies.push((property.into(), target.into()));
        self
    }

    /// 添加方法
    pub fn method(mut self, name: impl Into<String>, method: Method) -> Self {
        self.methods.push((name.into(), method));
        self
    }

    /// 添加属性默认值
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// 添加任意成员，方法进入方法表，其余作为属性默认值
    pub fn member(self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        match member.into() {
            Member::Method(method) => self.method(name, method),
            Member::Value(value) => self.property(name, value),
        }
    }

    /// 设置构造函数
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&Instance) -> DependencyResult<()> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// 类名称
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassSpec")
            .field("name", &self.name)
            .field("implements", &self.implements)
            .field("extends", &self.extends.as_ref().map(ClassDescriptor::name))
            .field("dependencies", &self.dependencies)
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .field("constructor", &self.constructor.as_ref().map(|_| "<function>"))
            .finish()
    }
}

struct ClassInner {
    id: Uuid,
    name: String,
    implements: Vec<InterfaceDescriptor>,
    parent: Option<ClassDescriptor>,
    dependencies: BTreeMap<String, Target>,
    methods: MethodTable,
    parent_methods: MethodTable,
    properties: BTreeMap<String, Value>,
    constructor: Option<Constructor>,
}

/// 类描述符
///
/// 构建后不可变；克隆共享同一个身份。
#[derive(Clone)]
pub struct ClassDescriptor {
    inner: Arc<ClassInner>,
}

impl ClassDescriptor {
    /// 根据类定义构建描述符
    ///
    /// 启用检查时，本类及所有祖先声明的接口都必须被合并后的方法表满足，
    /// 否则返回 [`ContractError::InterfaceConformance`](di_common::ContractError::InterfaceConformance)。
    pub fn define(spec: ClassSpec, checking: Checking) -> DependencyResult<Self> {
        let ClassSpec {
            name,
            implements,
            extends,
            dependencies,
            methods,
            properties,
            constructor,
        } = spec;

        let (mut merged, parent_methods, mut merged_dependencies, mut merged_properties, inherited) =
            match &extends {
                Some(parent) => (
                    parent.methods().clone(),
                    parent.methods().clone(),
                    parent.dependencies().clone(),
                    parent.properties().clone(),
                    parent.constructor(),
                ),
                None => (
                    MethodTable::new(),
                    MethodTable::new(),
                    BTreeMap::new(),
                    BTreeMap::new(),
                    None,
                ),
            };

        for (method_name, method) in methods {
            merged.insert(method_name, method.with_parent(&parent_methods));
        }
        merged_dependencies.extend(dependencies);
        merged_properties.extend(properties);

        let class = Self {
            inner: Arc::new(ClassInner {
                id: Uuid::new_v4(),
                name,
                implements,
                parent: extends,
                dependencies: merged_dependencies,
                methods: merged,
                parent_methods,
                properties: merged_properties,
                constructor: constructor.or(inherited),
            }),
        };

        if checking.is_enabled() {
            class.check_conformance()?;
        }

        debug!(
            "定义类: {} (方法 {} 个, 依赖 {} 个)",
            class.name(),
            class.methods().len(),
            class.dependencies().len()
        );
        Ok(class)
    }

    /// 类ID
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// 类名称
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 直接声明实现的接口
    pub fn implements(&self) -> &[InterfaceDescriptor] {
        &self.inner.implements
    }

    /// 父类
    pub fn parent(&self) -> Option<&ClassDescriptor> {
        self.inner.parent.as_ref()
    }

    /// 依赖声明（包括继承的）
    pub fn dependencies(&self) -> &BTreeMap<String, Target> {
        &self.inner.dependencies
    }

    /// 合并后的方法表
    pub fn methods(&self) -> &MethodTable {
        &self.inner.methods
    }

    /// 继承时父类的方法表快照
    pub fn parent_methods(&self) -> &MethodTable {
        &self.inner.parent_methods
    }

    /// 属性默认值（包括继承的）
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.inner.properties
    }

    /// 构造函数（未覆盖时继承父类的）
    pub fn constructor(&self) -> Option<Constructor> {
        self.inner.constructor.clone()
    }

    /// 父类的构造函数
    pub fn parent_constructor(&self) -> Option<Constructor> {
        self.parent().and_then(Self::constructor)
    }

    /// 本类及所有祖先实现的接口（去重，子类在前）
    pub fn all_interfaces(&self) -> Vec<InterfaceDescriptor> {
        let mut seen = HashSet::new();
        let mut interfaces = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            for interface in class.implements() {
                if seen.insert(interface.id()) {
                    interfaces.push(interface.clone());
                }
            }
            current = class.parent();
        }
        interfaces
    }

    /// 是否实现了指定接口（直接、经由祖先或经由接口组合）
    pub fn implements_interface(&self, interface: &InterfaceDescriptor) -> bool {
        self.all_interfaces()
            .iter()
            .any(|own| own == interface || own.extends(interface))
    }

    /// 是否为指定类本身或其子类
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// 检查合并后的方法表是否满足所有声明的接口
    pub fn check_conformance(&self) -> DependencyResult<()> {
        for interface in self.all_interfaces() {
            conformance::check_interface(self.name(), self.methods(), &interface)?;
        }
        Ok(())
    }
}

impl PartialEq for ClassDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ClassDescriptor {}

impl Hash for ClassDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field(
                "implements",
                &self.implements().iter().map(InterfaceDescriptor::name).collect::<Vec<_>>(),
            )
            .field("parent", &self.parent().map(Self::name))
            .field(
                "dependencies",
                &self
                    .dependencies()
                    .iter()
                    .map(|(property, target)| format!("{property}: {target}"))
                    .collect::<Vec<_>>(),
            )
            .field("methods", &self.methods().names().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
