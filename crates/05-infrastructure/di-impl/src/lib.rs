//! # Bean 工厂具体实现
//!
//! 提供默认的 Bean 注册表：类型擦除存储、按名称 / 类型查找、销毁以及感知型 Bean 的注入。

use di_abstractions::{ApplicationContextAware, BeanDeleter, BeanFactory, BeanId};
use infrastructure_common::TypeInfo;
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

/// 上下文注入钩子，由拥有注册表的应用上下文安装
pub type ContextHook = Rc<dyn Fn(&mut dyn ApplicationContextAware)>;

/// 单条 Bean 记录
///
/// `bean` 为 `None` 表示槽位已预留、实例尚在构造中。
struct BeanRecord {
    id: BeanId,
    type_info: TypeInfo,
    name: String,
    bean: Option<Rc<dyn Any>>,
    deleter: Option<BeanDeleter>,
}

impl BeanRecord {
    fn is_live(&self) -> bool {
        self.bean.is_some()
    }
}

/// 默认 Bean 工厂
///
/// 独占持有所有已注册的 Bean，对外只交出弱引用句柄。
/// 内部状态的借用在调用用户代码（构造函数、注入钩子、析构器）之前释放，
/// 因此这些代码可以重入工厂。
pub struct DefaultBeanFactory {
    self_handle: Weak<DefaultBeanFactory>,
    records: RefCell<Vec<BeanRecord>>,
    default_name_ordinals: RefCell<HashMap<TypeId, usize>>,
    next_id: Cell<u64>,
    context_hook: RefCell<Option<ContextHook>>,
}

impl DefaultBeanFactory {
    /// 创建新的 Bean 工厂
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|self_handle| Self {
            self_handle: self_handle.clone(),
            records: RefCell::new(Vec::new()),
            default_name_ordinals: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            context_hook: RefCell::new(None),
        })
    }

    /// 安装上下文注入钩子
    pub fn set_context_hook(&self, hook: ContextHook) {
        *self.context_hook.borrow_mut() = Some(hook);
    }

    /// 移除上下文注入钩子
    pub fn clear_context_hook(&self) {
        self.context_hook.borrow_mut().take();
    }

    fn allocate_id(&self) -> BeanId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        BeanId(id)
    }

    fn find_live<P>(&self, predicate: P) -> Option<(BeanId, Rc<dyn Any>)>
    where
        P: Fn(&BeanRecord) -> bool,
    {
        self.records
            .borrow()
            .iter()
            .filter(|record| record.is_live())
            .find(|record| predicate(record))
            .and_then(|record| Some((record.id, record.bean.clone()?)))
    }
}

impl BeanFactory for DefaultBeanFactory {
    fn reserve_bean(&self, type_info: TypeInfo, name: &str) -> Option<BeanId> {
        let mut records = self.records.borrow_mut();
        if records.iter().any(|record| record.name == name) {
            return None;
        }

        let id = self.allocate_id();
        trace!("预留 Bean 槽位: {} {} ({})", id, name, type_info);
        records.push(BeanRecord {
            id,
            type_info,
            name: name.to_string(),
            bean: None,
            deleter: None,
        });
        Some(id)
    }

    fn complete_bean(&self, id: BeanId, bean: Rc<dyn Any>, deleter: BeanDeleter) {
        let orphan = {
            let mut records = self.records.borrow_mut();
            match records.iter_mut().find(|record| record.id == id && !record.is_live()) {
                Some(record) => {
                    info!("注册 Bean: {} ({})", record.name, record.type_info);
                    record.bean = Some(bean);
                    record.deleter = Some(deleter);
                    None
                }
                None => Some((bean, deleter)),
            }
        };

        if let Some((bean, deleter)) = orphan {
            warn!("Bean 槽位不存在，直接析构: {}", id);
            deleter(bean);
        }
    }

    fn cancel_reservation(&self, id: BeanId) {
        self.records
            .borrow_mut()
            .retain(|record| record.id != id || record.is_live());
    }

    fn bean_by_name(&self, type_id: TypeId, name: &str) -> Option<(BeanId, Rc<dyn Any>)> {
        self.find_live(|record| record.name == name && record.type_info.id == type_id)
    }

    fn first_bean_of_type(&self, type_id: TypeId) -> Option<(BeanId, Rc<dyn Any>)> {
        self.find_live(|record| record.type_info.id == type_id)
    }

    fn is_bean_known(&self, id: BeanId) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|record| record.id == id && record.is_live())
    }

    fn bean_name(&self, id: BeanId) -> String {
        self.records
            .borrow()
            .iter()
            .find(|record| record.id == id && record.is_live())
            .map(|record| record.name.clone())
            .unwrap_or_default()
    }

    fn destroy_bean(&self, id: BeanId) {
        let removed = {
            let mut records = self.records.borrow_mut();
            let index = records
                .iter()
                .position(|record| record.id == id && record.is_live());
            index.map(|index| records.remove(index))
        };

        let Some(record) = removed else {
            trace!("销毁未知 Bean，忽略: {}", id);
            return;
        };

        debug!("销毁 Bean: {} ({})", record.name, record.type_info);
        if let (Some(bean), Some(deleter)) = (record.bean, record.deleter) {
            deleter(bean);
        }
    }

    fn default_bean_name(&self, type_info: &TypeInfo) -> String {
        let records = self.records.borrow();
        let mut ordinals = self.default_name_ordinals.borrow_mut();
        let ordinal = ordinals.entry(type_info.id).or_insert(0);

        // 不同模块的同名类型共享短名称，跳过已被占用的序号
        loop {
            let name = format!("{}_{}", type_info.short_name(), ordinal);
            *ordinal += 1;
            if !records.iter().any(|record| record.name == name) {
                return name;
            }
            trace!("默认名称已被占用，顺延: {}", name);
        }
    }

    fn singleton_bean_name(&self, type_info: &TypeInfo) -> String {
        let short_name = type_info.short_name();
        let taken_by_other_type = self
            .records
            .borrow()
            .iter()
            .any(|record| record.name == short_name && record.type_info.id != type_info.id);

        if taken_by_other_type {
            debug!("单例短名称已被其他类型占用，使用完整类型名: {}", type_info.module_path);
            type_info.module_path.clone()
        } else {
            short_name.to_string()
        }
    }

    fn application_context_aware_created(&self, bean: &mut dyn ApplicationContextAware) {
        let hook = self.context_hook.borrow().clone();
        match hook {
            Some(hook) => hook(bean),
            None => debug!("Bean 工厂不属于任何上下文，跳过上下文注入"),
        }
    }

    fn factory_handle(&self) -> Weak<dyn BeanFactory> {
        self.self_handle.clone()
    }

    fn bean_count(&self) -> usize {
        self.records.borrow().iter().filter(|record| record.is_live()).count()
    }

    fn bean_names(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|record| record.is_live())
            .map(|record| record.name.clone())
            .collect()
    }
}

impl Drop for DefaultBeanFactory {
    fn drop(&mut self) {
        let records = std::mem::take(self.records.get_mut());
        if !records.is_empty() {
            debug!("Bean 工厂释放，销毁剩余 {} 个 Bean", records.len());
        }

        for record in records.into_iter().rev() {
            if let (Some(bean), Some(deleter)) = (record.bean, record.deleter) {
                trace!("销毁 Bean: {}", record.name);
                deleter(bean);
            }
        }
    }
}

impl fmt::Debug for DefaultBeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultBeanFactory")
            .field("beans", &self.bean_names())
            .field("has_context_hook", &self.context_hook.borrow().is_some())
            .finish()
    }
}
