//! 方法签名模型

use std::fmt;

/// 方法签名
///
/// 由方法名和形参个数组成，捕获后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    name: String,
    arity: usize,
}

impl MethodSignature {
    /// 创建新的方法签名
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// 方法名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 形参个数
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// 同名签名是否兼容（参数个数一致）
    ///
    /// 名称不同的签名之间没有冲突，也视为兼容。
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.name != other.name || self.arity == other.arity
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}
