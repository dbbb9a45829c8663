//! 容器配置
//!
//! 支持从配置文件（TOML/JSON/YAML）和环境变量分层加载

use crate::errors::{ConfigError, ConfigResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 依赖注入容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用接口契约检查
    pub enable_interface_checking: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 未绑定的具体类是否可以直接作为 make 的目标
    pub auto_wire_concrete_classes: bool,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_interface_checking: true,
            max_resolution_depth: 256,
            auto_wire_concrete_classes: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl ContainerConfig {
    /// 环境变量前缀
    pub const ENV_PREFIX: &'static str = "DI_CONTAINER";

    /// 加载配置
    ///
    /// 先读取可选的配置文件，再用 `DI_CONTAINER_` 前缀的环境变量覆盖，
    /// 嵌套字段用 `__` 分隔（例如 `DI_CONTAINER_LOGGING__LEVEL`）。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载容器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 设置是否启用接口契约检查
    pub fn with_interface_checking(mut self, enabled: bool) -> Self {
        self.enable_interface_checking = enabled;
        self
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 设置未绑定具体类是否自动装配
    pub fn with_auto_wire_concrete_classes(mut self, enabled: bool) -> Self {
        self.auto_wire_concrete_classes = enabled;
        self
    }

    /// 设置日志配置
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
