//! 运行时对象模型
//!
//! 方法、方法表、属性值和实例。实例由 [`ObjectFactory`](crate::ObjectFactory) 构造，
//! 依赖解析完成后以命名属性的形式注入到实例上。

use crate::class::ClassDescriptor;
use crate::signature::MethodSignature;
use di_common::{ContractError, DependencyResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 方法体函数类型
///
/// 第一个参数是执行上下文实例，调用方显式传入。
pub type MethodBody = Arc<dyn Fn(&Instance, &[Value]) -> DependencyResult<Value> + Send + Sync>;

/// 覆盖方法体函数类型
///
/// 第二个参数是定义该方法的类的父类方法表，在类定义时绑定。
pub type OverridingBody =
    Arc<dyn Fn(&Instance, &MethodTable, &[Value]) -> DependencyResult<Value> + Send + Sync>;

#[derive(Clone)]
enum Body {
    Plain(MethodBody),
    Overriding {
        body: OverridingBody,
        parent: Arc<MethodTable>,
    },
}

/// 方法实现
///
/// 参数个数在创建时声明，作为结构化契约检查的依据。
#[derive(Clone)]
pub struct Method {
    arity: usize,
    body: Body,
}

impl Method {
    /// 创建新的方法
    pub fn new<F>(arity: usize, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> DependencyResult<Value> + Send + Sync + 'static,
    {
        Self {
            arity,
            body: Body::Plain(Arc::new(body)),
        }
    }

    /// 创建可调用父类实现的覆盖方法
    ///
    /// `parent` 是定义该方法的类的父类方法表，而不是实例所属的最终类，
    /// 因此多层继承下调用链仍然逐级向上。类定义之前父类方法表为空。
    pub fn overriding<F>(arity: usize, body: F) -> Self
    where
        F: Fn(&Instance, &MethodTable, &[Value]) -> DependencyResult<Value>
            + Send
            + Sync
            + 'static,
    {
        Self {
            arity,
            body: Body::Overriding {
                body: Arc::new(body),
                parent: Arc::new(MethodTable::new()),
            },
        }
    }

    /// 绑定父类方法表，普通方法原样返回
    pub(crate) fn with_parent(&self, parent: &MethodTable) -> Self {
        match &self.body {
            Body::Plain(_) => self.clone(),
            Body::Overriding { body, .. } => Self {
                arity: self.arity,
                body: Body::Overriding {
                    body: Arc::clone(body),
                    parent: Arc::new(parent.clone()),
                },
            },
        }
    }

    /// 创建仅用于声明签名的占位方法
    pub fn placeholder(arity: usize) -> Self {
        Self::new(arity, |_, _| {
            Err(ContractError::invocation_failed("<placeholder>", "占位方法不可调用"))
        })
    }

    /// 形参个数
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// 是否为覆盖方法
    pub fn is_overriding(&self) -> bool {
        matches!(self.body, Body::Overriding { .. })
    }

    /// 以指定实例为上下文调用方法
    pub fn call(&self, this: &Instance, args: &[Value]) -> DependencyResult<Value> {
        match &self.body {
            Body::Plain(body) => body(this, args),
            Body::Overriding { body, parent } => body(this, parent.as_ref(), args),
        }
    }

    /// 是否为同一个方法实现
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.body, &other.body) {
            (Body::Plain(a), Body::Plain(b)) => Arc::ptr_eq(a, b),
            (Body::Overriding { body: a, .. }, Body::Overriding { body: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("arity", &self.arity)
            .field("overriding", &self.is_overriding())
            .finish()
    }
}

/// 方法表
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: BTreeMap<String, Method>,
}

impl MethodTable {
    /// 创建空方法表
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入方法，返回被替换的旧方法
    pub fn insert(&mut self, name: impl Into<String>, method: Method) -> Option<Method> {
        self.methods.insert(name.into(), method)
    }

    /// 获取方法
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// 是否包含方法
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// 方法数量
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// 方法名列表（有序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// 遍历方法
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Method)> {
        self.methods.iter().map(|(name, method)| (name.as_str(), method))
    }

    /// 方法签名列表
    pub fn signatures(&self) -> Vec<MethodSignature> {
        self.methods
            .iter()
            .map(|(name, method)| MethodSignature::new(name.clone(), method.arity()))
            .collect()
    }

    /// 以指定实例为上下文调用表中的方法
    ///
    /// 子类覆盖方法时通过父类方法表调用被覆盖的实现。
    pub fn invoke(&self, name: &str, this: &Instance, args: &[Value]) -> DependencyResult<Value> {
        let method = self.get(name).ok_or_else(|| ContractError::MethodNotFound {
            method: name.to_string(),
        })?;
        method.call(this, args)
    }
}

impl<N: Into<String>> FromIterator<(N, Method)> for MethodTable {
    fn from_iter<I: IntoIterator<Item = (N, Method)>>(iter: I) -> Self {
        Self {
            methods: iter
                .into_iter()
                .map(|(name, method)| (name.into(), method))
                .collect(),
        }
    }
}

/// 属性值
#[derive(Debug, Clone)]
pub enum Value {
    /// 普通数据
    Data(serde_json::Value),
    /// 对象引用
    Object(Instance),
}

impl Value {
    /// 空值
    pub fn null() -> Self {
        Self::Data(serde_json::Value::Null)
    }

    /// 是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Data(serde_json::Value::Null))
    }

    /// 获取数据
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(data) => Some(data),
            Self::Object(_) => None,
        }
    }

    /// 获取对象引用
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            Self::Data(_) => None,
        }
    }

    /// 获取字符串
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(serde_json::Value::as_str)
    }

    /// 获取整数
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(serde_json::Value::as_i64)
    }

    /// 获取布尔值
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(serde_json::Value::as_bool)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Data(value)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Object(instance)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Data(serde_json::Value::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Data(serde_json::Value::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Data(serde_json::Value::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Data(serde_json::Value::from(value))
    }
}

/// 接口或类定义中的成员
///
/// 动态构建描述符时，同一个槽位既可能是方法也可能是普通值。
#[derive(Debug, Clone)]
pub enum Member {
    /// 方法
    Method(Method),
    /// 普通值
    Value(Value),
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Self::Method(method)
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

struct InstanceInner {
    id: Uuid,
    class: Option<ClassDescriptor>,
    methods: MethodTable,
    properties: RwLock<BTreeMap<String, Value>>,
}

/// 对象实例
///
/// 克隆得到的是同一个实例的引用。
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    /// 创建新实例
    pub fn new(class: Option<ClassDescriptor>, methods: MethodTable) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                id: Uuid::new_v4(),
                class,
                methods,
                properties: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// 从方法列表创建不属于任何类的实例
    pub fn from_methods<N, I>(methods: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Method)>,
    {
        Self::new(None, methods.into_iter().collect())
    }

    /// 实例ID
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// 构造该实例的类
    pub fn class(&self) -> Option<&ClassDescriptor> {
        self.inner.class.as_ref()
    }

    /// 用于日志和错误信息的描述
    pub fn describe(&self) -> String {
        self.class().map_or_else(
            || format!("<instance {}>", self.inner.id),
            |class| format!("<{} instance>", class.name()),
        )
    }

    /// 方法表
    pub fn methods(&self) -> &MethodTable {
        &self.inner.methods
    }

    /// 是否有指定方法
    pub fn has_method(&self, name: &str) -> bool {
        self.inner.methods.contains(name)
    }

    /// 调用方法
    pub fn call(&self, name: &str, args: &[Value]) -> DependencyResult<Value> {
        self.inner.methods.invoke(name, self, args)
    }

    /// 读取属性
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.properties.read().get(name).cloned()
    }

    /// 读取对象属性
    pub fn get_object(&self, name: &str) -> Option<Instance> {
        match self.get(name) {
            Some(Value::Object(instance)) => Some(instance),
            _ => None,
        }
    }

    /// 写入属性
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner
            .properties
            .write()
            .insert(name.into(), value.into());
    }

    /// 属性名列表
    pub fn property_names(&self) -> Vec<String> {
        self.inner.properties.read().keys().cloned().collect()
    }

    /// 是否为同一个实例
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.inner.id)
            .field("class", &self.class().map(ClassDescriptor::name))
            .field("methods", &self.inner.methods.names().collect::<Vec<_>>())
            .field("properties", &self.property_names())
            .finish()
    }
}
