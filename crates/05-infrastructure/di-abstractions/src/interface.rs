//! 接口描述符
//!
//! 接口是一组方法签名。可以组合一个或多个父接口，
//! 组合结果是所有来源签名的并集。

use crate::conformance::Checking;
use crate::object::{Member, Method};
use crate::signature::MethodSignature;
use di_common::{ContractError, DependencyResult};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 接口定义
#[derive(Debug, Clone)]
pub struct InterfaceSpec {
    name: String,
    extends: Vec<InterfaceDescriptor>,
    members: Vec<(String, Member)>,
}

impl InterfaceSpec {
    /// 创建新的接口定义
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            members: Vec::new(),
        }
    }

    /// 组合父接口
    pub fn extends(mut self, parent: &InterfaceDescriptor) -> Self {
        self.extends.push(parent.clone());
        self
    }

    /// 声明方法签名
    pub fn method(self, name: impl Into<String>, arity: usize) -> Self {
        self.placeholder(name, Method::placeholder(arity))
    }

    /// 用占位实现声明方法，参数个数取自实现
    pub fn placeholder(self, name: impl Into<String>, method: Method) -> Self {
        self.member(name, Member::Method(method))
    }

    /// 添加任意成员
    ///
    /// 用于动态构建的接口；非方法成员在启用检查时会导致定义失败。
    pub fn member(mut self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.members.push((name.into(), member.into()));
        self
    }

    /// 接口名称
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct InterfaceInner {
    id: Uuid,
    name: String,
    parents: Vec<InterfaceDescriptor>,
    signatures: BTreeMap<String, MethodSignature>,
}

/// 接口描述符
///
/// 构建后不可变；克隆共享同一个身份。
#[derive(Clone)]
pub struct InterfaceDescriptor {
    inner: Arc<InterfaceInner>,
}

impl InterfaceDescriptor {
    /// 根据接口定义构建描述符
    ///
    /// 父接口按声明顺序合并，然后合并自身成员。同名方法参数个数不一致时
    /// 返回 [`ContractError::SignatureConflict`]。关闭检查时后出现的来源覆盖先出现的，
    /// 非方法成员被忽略。
    pub fn define(spec: InterfaceSpec, checking: Checking) -> DependencyResult<Self> {
        let InterfaceSpec {
            name,
            extends,
            members,
        } = spec;

        let mut signatures = BTreeMap::new();
        for parent in &extends {
            for signature in parent.signatures() {
                merge_signature(&name, &mut signatures, signature.clone(), checking)?;
            }
        }

        for (member_name, member) in members {
            match member {
                Member::Method(method) => {
                    let signature = MethodSignature::new(member_name, method.arity());
                    merge_signature(&name, &mut signatures, signature, checking)?;
                }
                Member::Value(_) if checking.is_enabled() => {
                    return Err(ContractError::MalformedSignature {
                        interface: name,
                        member: member_name,
                    });
                }
                Member::Value(_) => {
                    warn!("接口 {} 忽略非方法成员: {}", name, member_name);
                }
            }
        }

        debug!("定义接口: {} ({} 个方法)", name, signatures.len());

        Ok(Self {
            inner: Arc::new(InterfaceInner {
                id: Uuid::new_v4(),
                name,
                parents: extends,
                signatures,
            }),
        })
    }

    /// 接口ID
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// 接口名称
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 直接父接口
    pub fn parents(&self) -> &[InterfaceDescriptor] {
        &self.inner.parents
    }

    /// 全部方法签名（包括组合得到的）
    pub fn signatures(&self) -> impl Iterator<Item = &MethodSignature> {
        self.inner.signatures.values()
    }

    /// 获取指定方法签名
    pub fn signature(&self, name: &str) -> Option<&MethodSignature> {
        self.inner.signatures.get(name)
    }

    /// 方法数量
    pub fn len(&self) -> usize {
        self.inner.signatures.len()
    }

    /// 是否没有任何方法
    pub fn is_empty(&self) -> bool {
        self.inner.signatures.is_empty()
    }

    /// 是否（直接或间接）组合了指定接口
    pub fn extends(&self, other: &Self) -> bool {
        self.parents()
            .iter()
            .any(|parent| parent == other || parent.extends(other))
    }

    /// 本接口的签名是否都以相同参数个数出现在 `other` 中
    pub fn is_covered_by(&self, other: &Self) -> bool {
        self.signatures()
            .all(|signature| other.signature(signature.name()) == Some(signature))
    }

    /// 两个接口在结构上是否可以互换
    ///
    /// 仅用于调试和文档，绑定仍按身份区分。
    pub fn is_interchangeable(&self, other: &Self) -> bool {
        self.is_covered_by(other) && other.is_covered_by(self)
    }
}

fn merge_signature(
    interface: &str,
    signatures: &mut BTreeMap<String, MethodSignature>,
    signature: MethodSignature,
    checking: Checking,
) -> DependencyResult<()> {
    if let Some(existing) = signatures.get(signature.name()) {
        if checking.is_enabled() && !existing.is_compatible_with(&signature) {
            return Err(ContractError::SignatureConflict {
                interface: interface.to_string(),
                method: signature.name().to_string(),
                existing: existing.arity(),
                incoming: signature.arity(),
            });
        }
    }
    signatures.insert(signature.name().to_string(), signature);
    Ok(())
}

impl PartialEq for InterfaceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for InterfaceDescriptor {}

impl Hash for InterfaceDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field(
                "parents",
                &self.parents().iter().map(Self::name).collect::<Vec<_>>(),
            )
            .field("signatures", &self.signatures().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
