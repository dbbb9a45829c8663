//! # DI Common
//!
//! 依赖注入容器各层共享的基础设施。
//!
//! ## 核心内容
//!
//! - [`ContractError`] - 契约检查与依赖解析的错误分类
//! - [`ContainerConfig`] - 容器配置（文件 + 环境变量）
//! - [`LoggingConfig`] / [`init_logging`] - 日志初始化

pub mod configuration;
pub mod errors;
pub mod logging;

pub use configuration::*;
pub use errors::*;
pub use logging::*;
