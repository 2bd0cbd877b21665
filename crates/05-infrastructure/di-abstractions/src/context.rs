//! 应用上下文抽象接口

use crate::factory::BeanFactory;
use config_abstractions::PropertyResolver;

/// 应用上下文 trait
///
/// 把属性解析器、Bean 工厂和应用身份（名称、激活的 profile）组合在一起。
/// 上下文感知的 Bean 通过 [`crate::ApplicationContextAware`] 拿到它的弱引用。
pub trait ApplicationContext: PropertyResolver + BeanFactory {
    /// 应用名称
    fn name(&self) -> &str;

    /// 激活的 profile，按字典序
    fn active_profiles(&self) -> Vec<String>;

    /// 指定 profile 是否激活
    fn is_profile_enabled(&self, profile: &str) -> bool {
        self.active_profiles().iter().any(|p| p == profile)
    }
}
