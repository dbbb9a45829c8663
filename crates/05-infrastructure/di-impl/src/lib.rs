//! # 依赖注入具体实现
//!
//! 提供具体的依赖注入容器（绑定、契约检查、递归解析）以及进程级默认容器

pub mod container;
pub mod global;

pub use container::DiContainerImpl;
pub use global::{
    bind, define_class, define_interface, disable_interface_checking, enable_interface_checking,
    global, make,
};
