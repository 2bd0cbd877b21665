//! Bean 能力声明与句柄

use crate::context::ApplicationContext;
use crate::factory::BeanFactory;
use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

/// 可由 Bean 工厂管理的类型
///
/// 三个访问器描述类型在注册时需要哪些注入，默认都返回 `None`。
/// 通常通过 `#[derive(Bean)]` 配合 `#[bean(context_aware, factory_aware, name_aware)]`
/// 生成；不需要任何注入的类型写 `impl Bean for MyType {}` 即可。
///
/// 注入顺序固定为：上下文 → 工厂 → 名称。
pub trait Bean: Any {
    fn as_context_aware(&mut self) -> Option<&mut dyn ApplicationContextAware> {
        None
    }

    fn as_factory_aware(&mut self) -> Option<&mut dyn BeanFactoryAware> {
        None
    }

    fn as_name_aware(&mut self) -> Option<&mut dyn BeanNameAware> {
        None
    }
}

/// 需要持有所属 Bean 工厂的 Bean
pub trait BeanFactoryAware {
    fn set_bean_factory(&mut self, factory: Weak<dyn BeanFactory>);
}

/// 需要知道自己注册名称的 Bean
pub trait BeanNameAware {
    fn set_bean_name(&mut self, name: &str);
}

/// 需要持有所属应用上下文的 Bean
pub trait ApplicationContextAware {
    fn set_application_context(&mut self, context: Weak<dyn ApplicationContext>);
}

/// 注册表分配的 Bean 标识，在同一注册表内唯一且不复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeanId(pub u64);

impl fmt::Display for BeanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 指向已注册 Bean 的非拥有句柄
///
/// Bean 由注册表独占持有。Bean 被销毁后 [`get`](Self::get) 返回 `None`。
pub struct BeanRef<T: ?Sized> {
    id: BeanId,
    bean: Weak<T>,
}

impl<T: ?Sized> BeanRef<T> {
    pub fn new(id: BeanId, bean: Weak<T>) -> Self {
        Self { id, bean }
    }

    /// 注册表中的标识
    pub fn id(&self) -> BeanId {
        self.id
    }

    /// 临时获取 Bean；Bean 已销毁时返回 `None`
    pub fn get(&self) -> Option<Rc<T>> {
        self.bean.upgrade()
    }

    /// Bean 是否仍然存活
    pub fn is_alive(&self) -> bool {
        self.bean.strong_count() > 0
    }

    /// 底层弱引用
    pub fn downgrade(&self) -> Weak<T> {
        self.bean.clone()
    }
}

impl<T: ?Sized> Clone for BeanRef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            bean: self.bean.clone(),
        }
    }
}

impl<T: ?Sized> PartialEq for BeanRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Eq for BeanRef<T> {}

impl<T: ?Sized> fmt::Debug for BeanRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanRef")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
