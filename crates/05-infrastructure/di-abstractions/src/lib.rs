//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义结构化契约和依赖解析的核心类型。
//!
//! ## 核心类型
//!
//! - [`MethodSignature`] - 方法签名（名称 + 参数个数）
//! - [`InterfaceDescriptor`] - 接口描述符，支持组合
//! - [`ClassDescriptor`] - 类描述符，支持继承和依赖声明
//! - [`ObjectFactory`] - 对象工厂接口
//! - [`DiContainer`] - 依赖注入容器接口

pub mod class;
pub mod conformance;
pub mod container;
pub mod factory;
pub mod interface;
pub mod object;
pub mod registry;
pub mod resolver;
pub mod signature;

pub use class::*;
pub use conformance::*;
pub use container::*;
pub use factory::*;
pub use interface::*;
pub use object::*;
pub use registry::*;
pub use resolver::*;
pub use signature::*;
