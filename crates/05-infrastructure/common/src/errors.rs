//! 错误类型定义

use thiserror::Error;

/// 错误分类
///
/// 多个错误变体可以归入同一类别，调用方按类别判断失败原因即可。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 接口组合时同名方法参数个数不一致，或接口成员不是方法
    SignatureConflict,
    /// 类或实例未满足接口契约
    InterfaceConformance,
    /// 目标没有注册绑定
    MissingBinding,
    /// 依赖解析重新进入了正在解析的目标
    CircularDependency,
    /// 依赖解析深度超过上限
    ResolutionDepth,
    /// 实例构造失败
    Construction,
    /// 方法调用失败
    Invocation,
}

/// 契约与依赖注入错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// 组合接口时同名方法参数个数不一致
    #[error("接口 {interface} 方法签名冲突: {method}, 参数个数 {existing} 与 {incoming} 不一致")]
    SignatureConflict {
        interface: String,
        method: String,
        existing: usize,
        incoming: usize,
    },

    /// 接口成员不是方法
    #[error("接口 {interface} 的成员 {member} 不是方法")]
    MalformedSignature { interface: String, member: String },

    /// 类或实例未满足接口的方法签名
    #[error(
        "{class} 未满足接口 {interface}: 方法 {method} 需要 {expected} 个参数, 实际 {}",
        describe_arity(.actual)
    )]
    InterfaceConformance {
        class: String,
        interface: String,
        method: String,
        expected: usize,
        actual: Option<usize>,
    },

    /// 类目标的提供者不是该类或其子类
    #[error("{provider} 不是 {target} 或其子类")]
    NotADescendant { target: String, provider: String },

    /// 接口目标没有注册绑定
    #[error("未找到绑定: {target}")]
    MissingBinding { target: String },

    /// 解析链中再次进入同一目标
    #[error("检测到循环依赖: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// 依赖层级超过配置上限
    #[error("依赖解析深度超过上限 {max_depth}: {target}")]
    ResolutionDepthExceeded { target: String, max_depth: usize },

    /// 构造函数或对象工厂失败
    #[error("实例构造失败: {class}, 原因: {message}")]
    ConstructionFailed { class: String, message: String },

    /// 方法表中不存在该方法
    #[error("方法不存在: {method}")]
    MethodNotFound { method: String },

    /// 方法体返回错误
    #[error("方法调用失败: {method}, 原因: {message}")]
    InvocationFailed { method: String, message: String },
}

fn describe_arity(actual: &Option<usize>) -> String {
    actual.map_or_else(|| "缺失".to_string(), |arity| arity.to_string())
}

impl ContractError {
    /// 获取错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SignatureConflict { .. } | Self::MalformedSignature { .. } => {
                ErrorKind::SignatureConflict
            }
            Self::InterfaceConformance { .. } | Self::NotADescendant { .. } => {
                ErrorKind::InterfaceConformance
            }
            Self::MissingBinding { .. } => ErrorKind::MissingBinding,
            Self::CircularDependency { .. } => ErrorKind::CircularDependency,
            Self::ResolutionDepthExceeded { .. } => ErrorKind::ResolutionDepth,
            Self::ConstructionFailed { .. } => ErrorKind::Construction,
            Self::MethodNotFound { .. } | Self::InvocationFailed { .. } => ErrorKind::Invocation,
        }
    }

    /// 创建构造失败错误
    pub fn construction_failed(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            class: class.into(),
            message: message.into(),
        }
    }

    /// 创建方法调用失败错误
    pub fn invocation_failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvocationFailed {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 指定的配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 配置源读取或反序列化失败
    #[error("配置解析失败: {source}")]
    ParseError {
        #[from]
        source: config::ConfigError,
    },

    /// 配置值不合法
    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    /// 日志订阅者初始化失败
    #[error("日志初始化失败: {message}")]
    LoggingInitFailed { message: String },
}

/// 依赖注入结果类型
pub type DependencyResult<T> = Result<T, ContractError>;
/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;
