//! 解析上下文
//!
//! 记录一次 make 调用树中正在解析的目标链，用于检测循环依赖

use crate::registry::Target;
use di_common::{ContractError, DependencyResult};

/// 默认最大解析深度
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone)]
struct ChainEntry {
    target: Target,
    /// 绑定提供者类，不计入深度
    provider: bool,
}

/// 解析上下文
///
/// 深度只计算依赖层级：绑定目标与其提供者类同属一层。
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<ChainEntry>,
    depth: usize,
    /// 解析选项
    options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            depth: 0,
            options,
        }
    }

    /// 添加目标到解析链
    ///
    /// 目标已在链中时返回 [`ContractError::CircularDependency`]，
    /// 依赖层级达到上限时返回 [`ContractError::ResolutionDepthExceeded`]。
    pub fn push_target(&mut self, target: Target) -> DependencyResult<()> {
        self.check_reentry(&target)?;

        if self.depth >= self.options.max_depth {
            return Err(ContractError::ResolutionDepthExceeded {
                target: target.name().to_string(),
                max_depth: self.options.max_depth,
            });
        }

        self.resolution_chain.push(ChainEntry {
            target,
            provider: false,
        });
        self.depth += 1;
        Ok(())
    }

    /// 添加绑定提供者类到解析链
    ///
    /// 参与循环检测，但与所属目标共用一层深度。
    pub fn push_provider(&mut self, provider: Target) -> DependencyResult<()> {
        self.check_reentry(&provider)?;
        self.resolution_chain.push(ChainEntry {
            target: provider,
            provider: true,
        });
        Ok(())
    }

    /// 从解析链中移除最后一个条目
    pub fn pop_target(&mut self) {
        if let Some(entry) = self.resolution_chain.pop() {
            if !entry.provider {
                self.depth -= 1;
            }
        }
    }

    /// 当前依赖层级
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 解析链上的目标名称
    pub fn chain_names(&self) -> Vec<&str> {
        self.resolution_chain
            .iter()
            .map(|entry| entry.target.name())
            .collect()
    }

    /// 解析选项
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    fn check_reentry(&self, target: &Target) -> DependencyResult<()> {
        if let Some(position) = self
            .resolution_chain
            .iter()
            .position(|entry| entry.target.id() == target.id())
        {
            let mut chain: Vec<String> = self.resolution_chain[position..]
                .iter()
                .map(|entry| entry.target.name().to_string())
                .collect();
            chain.push(target.name().to_string());
            return Err(ContractError::CircularDependency { chain });
        }
        Ok(())
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 最大依赖层级
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
