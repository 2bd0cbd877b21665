//! 复合属性解析器

use config_abstractions::{
    ConfigurablePropertyResolver, PropertyChangedCallback, PropertyResolver, PropertySource,
    PropertySourceFactory, IMPORT_CONFIG_KEY,
};
use infrastructure_common::PropertyValue;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

type ChangeListeners = RefCell<Vec<PropertyChangedCallback>>;

/// 复合属性解析器
///
/// 按注册顺序保存属性源，查询时从最后注册的属性源开始向前查找，
/// 第一个给出值的属性源胜出。
///
/// 注册属性源时会跟随其 `import.config` 指令（形如 `类型:参数`）
/// 通过已注册的属性源工厂加载下一个属性源，直到链条结束。
/// 动态属性源的变更通知统一转发给 [`on_value_changed`](Self::on_value_changed)
/// 注册的监听器。
pub struct CompositingPropertyResolver {
    sources: Vec<Box<dyn PropertySource>>,
    source_factories: HashMap<String, PropertySourceFactory>,
    change_listeners: Rc<ChangeListeners>,
}

impl CompositingPropertyResolver {
    /// 创建空的解析器
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            source_factories: HashMap::new(),
            change_listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// 已注册的属性源数量
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// 已注册属性源的名称，按注册顺序
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// 是否注册了指定名称的属性源工厂
    pub fn has_source_factory(&self, source_name: &str) -> bool {
        self.source_factories.contains_key(source_name)
    }

    /// 注册属性变更监听器
    ///
    /// 任意已注册的动态属性源发生变更时，监听器以属性名被同步调用。
    pub fn on_value_changed(&self, callback: PropertyChangedCallback) {
        self.change_listeners.borrow_mut().push(callback);
    }

    /// 广播一次属性变更
    pub fn value_changed(&self, property_name: &str) {
        relay_value_changed(&self.change_listeners, property_name);
    }

    fn extract_import_config(source: &dyn PropertySource) -> Option<String> {
        source.get_property(IMPORT_CONFIG_KEY).to_text()
    }

    fn handle_dynamic_source_notifications(&self, source: &mut dyn PropertySource) {
        if source.is_static() {
            return;
        }

        let listeners: Weak<ChangeListeners> = Rc::downgrade(&self.change_listeners);
        source.clear_value_watchers();
        source.add_value_watcher(Rc::new(move |property_name: &str| {
            if let Some(listeners) = listeners.upgrade() {
                relay_value_changed(&listeners, property_name);
            }
        }));
    }

    /// 以 `RefCell` 共享的解析器注册属性源
    ///
    /// 与 [`register_property_source`](ConfigurablePropertyResolver::register_property_source)
    /// 行为相同，但调用属性源工厂时不持有解析器的借用，工厂可以读取同一个解析器。
    pub fn register_shared(resolver: &RefCell<Self>, source: Box<dyn PropertySource>) {
        follow_imports(source, |source| resolver.borrow_mut().push_source(source));
    }

    /// 当前注册的变更监听器
    pub fn change_listeners(&self) -> Vec<PropertyChangedCallback> {
        self.change_listeners.borrow().clone()
    }

    /// 加入单个属性源，返回其导入指令对应的工厂与参数
    fn push_source(&mut self, mut source: Box<dyn PropertySource>) -> Option<PendingImport> {
        if source.is_static() && !source.has_values() {
            debug!("丢弃没有值的静态属性源: {}", source.name());
            return None;
        }

        let import = Self::extract_import_config(source.as_ref());
        self.handle_dynamic_source_notifications(source.as_mut());

        info!(
            "注册属性源: {} (静态: {})",
            source.name(),
            source.is_static()
        );
        self.sources.push(source);

        self.resolve_import(import?)
    }

    fn resolve_import(&self, import: String) -> Option<PendingImport> {
        let Some((source_type, parameter)) = import.split_once(':') else {
            debug!("导入指令缺少类型分隔符，忽略: {}", import);
            return None;
        };

        let Some(factory) = self.source_factories.get(source_type) else {
            debug!("未知的属性源类型，忽略导入: {}", source_type);
            return None;
        };

        Some(PendingImport {
            factory: Rc::clone(factory),
            parameter: parameter.to_string(),
            directive: import,
        })
    }
}

/// 等待加载的导入属性源
struct PendingImport {
    factory: PropertySourceFactory,
    parameter: String,
    directive: String,
}

/// 逐个加入属性源并跟随导入链，工厂在 `push` 返回之后才被调用
fn follow_imports<P>(source: Box<dyn PropertySource>, mut push: P)
where
    P: FnMut(Box<dyn PropertySource>) -> Option<PendingImport>,
{
    let mut followed_imports = HashSet::new();
    let mut next = push(source);

    while let Some(import) = next.take() {
        if !followed_imports.insert(import.directive.clone()) {
            warn!("检测到循环导入，停止导入链: {}", import.directive);
            break;
        }

        debug!("按导入指令加载属性源: {}", import.directive);
        let source = (import.factory)(&import.parameter);
        next = push(source);
    }
}

fn relay_value_changed(listeners: &ChangeListeners, property_name: &str) {
    trace!("属性变更: {}", property_name);
    // 先复制一份，监听器内部可以继续注册新的监听器
    let callbacks = listeners.borrow().clone();
    for callback in callbacks {
        callback(property_name);
    }
}

impl Default for CompositingPropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompositingPropertyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factories: Vec<&String> = self.source_factories.keys().collect();
        factories.sort();
        f.debug_struct("CompositingPropertyResolver")
            .field("sources", &self.source_names())
            .field("source_factories", &factories)
            .field("change_listeners", &self.change_listeners.borrow().len())
            .finish()
    }
}

impl PropertyResolver for CompositingPropertyResolver {
    fn get_property(&self, property_name: &str) -> PropertyValue {
        self.sources
            .iter()
            .rev()
            .map(|source| source.get_property(property_name))
            .find(PropertyValue::is_present)
            .unwrap_or_default()
    }
}

impl ConfigurablePropertyResolver for CompositingPropertyResolver {
    fn register_property_source(&mut self, source: Box<dyn PropertySource>) {
        follow_imports(source, |source| self.push_source(source));
    }

    fn register_property_source_factory(&mut self, source_name: &str, factory: PropertySourceFactory) {
        debug!("注册属性源工厂: {}", source_name);
        self.source_factories.insert(source_name.to_string(), factory);
    }
}
