//! Bean 工厂抽象接口

use crate::bean::{ApplicationContextAware, Bean, BeanId, BeanRef};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::{Any, TypeId};
use std::rc::{Rc, Weak};
use tracing::{debug, error, trace, warn};

/// 类型擦除的析构器，负责释放注册表交出的 Bean
pub type BeanDeleter = Box<dyn FnOnce(Rc<dyn Any>)>;

/// Bean 工厂 trait
///
/// 类型擦除的 Bean 注册表。这里的方法是对象安全的底层操作，
/// 日常使用 [`BeanFactoryExt`] 提供的类型化方法。
///
/// 注册分为三步：先按名称预留槽位，再构造并注入，最后填入实例。
/// 预留失败时构造函数不会被调用。
pub trait BeanFactory {
    /// 以指定名称预留槽位，名称已被占用时返回 `None`
    fn reserve_bean(&self, type_info: TypeInfo, name: &str) -> Option<BeanId>;

    /// 把构造完成的实例填入已预留的槽位
    fn complete_bean(&self, id: BeanId, bean: Rc<dyn Any>, deleter: BeanDeleter);

    /// 释放尚未填入实例的槽位
    fn cancel_reservation(&self, id: BeanId);

    /// 按类型和名称查找
    fn bean_by_name(&self, type_id: TypeId, name: &str) -> Option<(BeanId, Rc<dyn Any>)>;

    /// 查找最早注册的指定类型 Bean
    fn first_bean_of_type(&self, type_id: TypeId) -> Option<(BeanId, Rc<dyn Any>)>;

    /// Bean 是否已注册且存活
    fn is_bean_known(&self, id: BeanId) -> bool;

    /// Bean 的注册名称，未知 Bean 返回空字符串
    fn bean_name(&self, id: BeanId) -> String;

    /// 移除记录后调用析构器，未知 Bean 忽略
    fn destroy_bean(&self, id: BeanId);

    /// 为类型生成下一个默认名称
    fn default_bean_name(&self, type_info: &TypeInfo) -> String;

    /// 单例名称，即不带路径的类型名
    fn singleton_bean_name(&self, type_info: &TypeInfo) -> String {
        type_info.short_name().to_string()
    }

    /// 通知所属上下文：有 Bean 需要注入上下文
    fn application_context_aware_created(&self, bean: &mut dyn ApplicationContextAware);

    /// 指向自身的弱引用，用于注入工厂感知的 Bean
    fn factory_handle(&self) -> Weak<dyn BeanFactory>;

    /// 已注册的 Bean 数量
    fn bean_count(&self) -> usize;

    /// 已注册 Bean 的名称，按注册顺序
    fn bean_names(&self) -> Vec<String>;
}

/// 生成类型 `T` 的析构器
///
/// 外部仍临时持有强引用时，实际析构延后到最后一个强引用释放。
pub fn make_deleter<T: Bean>() -> BeanDeleter {
    Box::new(|bean: Rc<dyn Any>| {
        let type_name = std::any::type_name::<T>();
        match bean.downcast::<T>() {
            Ok(bean) => match Rc::try_unwrap(bean) {
                Ok(bean) => {
                    trace!("析构 Bean: {}", type_name);
                    drop(bean);
                }
                Err(bean) => {
                    warn!(
                        "Bean {} 仍有 {} 个外部强引用，析构延后",
                        type_name,
                        Rc::strong_count(&bean) - 1
                    );
                }
            },
            Err(_) => error!("析构器类型不匹配: {}", type_name),
        }
    })
}

/// 槽位预留守卫
///
/// 构造或注入过程中发生 panic 时自动释放槽位。
pub struct ReservationGuard<'a, B: BeanFactory + ?Sized> {
    factory: &'a B,
    id: BeanId,
    armed: bool,
}

impl<'a, B: BeanFactory + ?Sized> ReservationGuard<'a, B> {
    pub fn new(factory: &'a B, id: BeanId) -> Self {
        Self {
            factory,
            id,
            armed: true,
        }
    }

    pub fn id(&self) -> BeanId {
        self.id
    }

    /// 填入实例并解除守卫
    pub fn complete<T: Bean>(mut self, bean: Rc<T>) -> BeanRef<T> {
        let handle = BeanRef::new(self.id, Rc::downgrade(&bean));
        self.factory.complete_bean(self.id, bean, make_deleter::<T>());
        self.armed = false;
        handle
    }
}

impl<B: BeanFactory + ?Sized> Drop for ReservationGuard<'_, B> {
    fn drop(&mut self) {
        if self.armed {
            debug!("释放未完成的 Bean 槽位: {}", self.id);
            self.factory.cancel_reservation(self.id);
        }
    }
}

/// 依次执行上下文、工厂、名称注入
fn wire_bean<B: BeanFactory + ?Sized, T: Bean>(factory: &B, bean: &mut T, name: &str) {
    if let Some(aware) = bean.as_context_aware() {
        debug!("注入应用上下文: {}", name);
        factory.application_context_aware_created(aware);
    }
    if let Some(aware) = bean.as_factory_aware() {
        debug!("注入 Bean 工厂: {}", name);
        aware.set_bean_factory(factory.factory_handle());
    }
    if let Some(aware) = bean.as_name_aware() {
        debug!("注入 Bean 名称: {}", name);
        aware.set_bean_name(name);
    }
}

/// Bean 工厂的类型化操作
///
/// 对所有 [`BeanFactory`]（包括 `dyn BeanFactory`）自动实现。
pub trait BeanFactoryExt: BeanFactory {
    /// 以默认名称创建并注册 Bean
    ///
    /// 名称冲突时返回 `None`，`ctor` 不会被调用。
    fn create_managed<T, F>(&self, ctor: F) -> Option<BeanRef<T>>
    where
        T: Bean,
        F: FnOnce() -> T,
    {
        let name = self.default_bean_name(&TypeInfo::of::<T>());
        self.create_named(&name, ctor)
    }

    /// 以类型名创建单例，同类型的第二个单例会被拒绝
    fn create_singleton<T, F>(&self, ctor: F) -> Option<BeanRef<T>>
    where
        T: Bean,
        F: FnOnce() -> T,
    {
        let name = self.singleton_bean_name(&TypeInfo::of::<T>());
        self.create_named(&name, ctor)
    }

    /// 以指定名称创建并注册 Bean
    fn create_named<T, F>(&self, name: &str, ctor: F) -> Option<BeanRef<T>>
    where
        T: Bean,
        F: FnOnce() -> T,
    {
        let Some(id) = self.reserve_bean(TypeInfo::of::<T>(), name) else {
            debug!("Bean 名称已被占用，跳过创建: {}", name);
            return None;
        };

        let guard = ReservationGuard::new(self, id);
        let mut bean = ctor();
        wire_bean(self, &mut bean, name);
        Some(guard.complete(Rc::new(bean)))
    }

    /// 以默认名称创建 `T::default()`
    fn create_default<T>(&self) -> Option<BeanRef<T>>
    where
        T: Bean + Default,
    {
        self.create_managed(T::default)
    }

    /// 转移已构造实例的所有权
    ///
    /// 名称冲突时实例被丢弃并返回 [`DependencyError::BeanNameConflict`]。
    /// 此时调用方已失去实例，必须视为致命错误而不是重试。
    fn register_existing<T: Bean>(&self, instance: T, name: Option<&str>) -> DependencyResult<BeanRef<T>> {
        self.register_boxed(Box::new(instance), name)
    }

    /// 与 [`register_existing`](Self::register_existing) 相同，接受已装箱的实例
    fn register_boxed<T: Bean>(&self, mut instance: Box<T>, name: Option<&str>) -> DependencyResult<BeanRef<T>> {
        let type_info = TypeInfo::of::<T>();
        let name = match name {
            Some(name) => name.to_string(),
            None => self.default_bean_name(&type_info),
        };

        let Some(id) = self.reserve_bean(type_info.clone(), &name) else {
            let err = DependencyError::BeanNameConflict {
                name,
                type_name: type_info.name,
            };
            error!("{}", err);
            drop(instance);
            return Err(err);
        };

        let guard = ReservationGuard::new(self, id);
        wire_bean(self, &mut *instance, &name);
        Ok(guard.complete(Rc::from(instance)))
    }

    /// 按名称查找，类型不匹配时返回 `None`
    fn find_by_name<T: Bean>(&self, name: &str) -> Option<BeanRef<T>> {
        let (id, bean) = self.bean_by_name(TypeId::of::<T>(), name)?;
        let bean = bean.downcast::<T>().ok()?;
        Some(BeanRef::new(id, Rc::downgrade(&bean)))
    }

    /// 查找最早注册的 `T` 类型 Bean
    fn find_first_of_type<T: Bean>(&self) -> Option<BeanRef<T>> {
        let (id, bean) = self.first_bean_of_type(TypeId::of::<T>())?;
        let bean = bean.downcast::<T>().ok()?;
        Some(BeanRef::new(id, Rc::downgrade(&bean)))
    }

    /// 句柄指向的 Bean 是否仍在注册表中
    fn is_known<T: ?Sized>(&self, bean: &BeanRef<T>) -> bool {
        self.is_bean_known(bean.id())
    }

    /// 句柄指向的 Bean 的注册名称
    fn name_of<T: ?Sized>(&self, bean: &BeanRef<T>) -> String {
        self.bean_name(bean.id())
    }

    /// 销毁句柄指向的 Bean
    fn destroy<T: ?Sized>(&self, bean: &BeanRef<T>) {
        self.destroy_bean(bean.id());
    }

    /// 以 [`DependencyError::BeanNotFound`] 报告缺失的按名查找
    fn require_by_name<T: Bean>(&self, name: &str) -> DependencyResult<BeanRef<T>> {
        self.find_by_name(name).ok_or_else(|| DependencyError::BeanNotFound {
            name: name.to_string(),
        })
    }
}

impl<B: BeanFactory + ?Sized> BeanFactoryExt for B {}
