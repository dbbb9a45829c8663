//! 结构化契约检查
//!
//! 只比较方法名和参数个数，不检查返回值或方法体。

use crate::class::ClassDescriptor;
use crate::interface::InterfaceDescriptor;
use crate::object::MethodTable;
use crate::registry::{Provider, Target};
use crate::signature::MethodSignature;
use di_common::{ContractError, DependencyResult};

/// 契约检查开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Checking {
    /// 启用检查
    #[default]
    Enabled,
    /// 关闭检查
    Disabled,
}

impl Checking {
    /// 是否启用
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl From<bool> for Checking {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// 检查方法表是否满足一组签名
pub fn check_signatures<'a, I>(
    subject: &str,
    contract: &str,
    methods: &MethodTable,
    signatures: I,
) -> DependencyResult<()>
where
    I: IntoIterator<Item = &'a MethodSignature>,
{
    for signature in signatures {
        let actual = methods.get(signature.name()).map(|method| method.arity());
        if actual != Some(signature.arity()) {
            return Err(ContractError::InterfaceConformance {
                class: subject.to_string(),
                interface: contract.to_string(),
                method: signature.name().to_string(),
                expected: signature.arity(),
                actual,
            });
        }
    }
    Ok(())
}

/// 检查方法表是否满足接口
pub fn check_interface(
    subject: &str,
    methods: &MethodTable,
    interface: &InterfaceDescriptor,
) -> DependencyResult<()> {
    check_signatures(subject, interface.name(), methods, interface.signatures())
}

/// 检查绑定提供者是否满足目标契约
///
/// - 接口目标：提供者的方法必须满足接口签名
/// - 类目标 + 类提供者：提供者必须是目标本身或其子类
/// - 类目标 + 实例提供者：实例方法必须满足目标类的方法签名及其实现的全部接口
pub fn check_provider(target: &Target, provider: &Provider) -> DependencyResult<()> {
    match (target, provider) {
        (Target::Interface(interface), Provider::Class(class)) => {
            check_interface(class.name(), class.methods(), interface)
        }
        (Target::Interface(interface), Provider::Instance(instance)) => {
            check_interface(&instance.describe(), instance.methods(), interface)
        }
        (Target::Class(base), Provider::Class(class)) => {
            if class.is_descendant_of(base) {
                Ok(())
            } else {
                Err(ContractError::NotADescendant {
                    target: base.name().to_string(),
                    provider: class.name().to_string(),
                })
            }
        }
        (Target::Class(base), Provider::Instance(instance)) => {
            check_instance_against_class(base, instance.methods(), &instance.describe())
        }
    }
}

fn check_instance_against_class(
    class: &ClassDescriptor,
    methods: &MethodTable,
    subject: &str,
) -> DependencyResult<()> {
    let signatures = class.methods().signatures();
    check_signatures(subject, class.name(), methods, &signatures)?;
    for interface in class.all_interfaces() {
        check_interface(subject, methods, &interface)?;
    }
    Ok(())
}
