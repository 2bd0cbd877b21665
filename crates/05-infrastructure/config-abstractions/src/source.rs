//! 属性源抽象接口

use infrastructure_common::PropertyValue;
use std::fmt;
use std::rc::Rc;

/// 属性变更回调，参数为发生变更的属性名
pub type PropertyChangedCallback = Rc<dyn Fn(&str)>;

/// 属性源 trait
///
/// 能够回答"键 K 是否有值 / 值是什么"的配置来源。
///
/// - 静态属性源的值在其生命周期内不变，永远不会发出变更通知，
///   注册监听器也不会产生任何效果
/// - 动态属性源在值变化时同步通知已注册的监听器
pub trait PropertySource {
    /// 属性源名称，用于日志
    fn name(&self) -> &str;

    /// 获取属性值，不存在时返回 [`PropertyValue::Absent`]
    fn get_property(&self, property_name: &str) -> PropertyValue;

    /// 当前是否有可用的值
    fn has_values(&self) -> bool;

    /// 是否为静态属性源
    fn is_static(&self) -> bool {
        false
    }

    /// 检查属性是否存在
    fn contains_property(&self, property_name: &str) -> bool {
        self.get_property(property_name).is_present()
    }

    /// 获取监听器列表
    ///
    /// 静态属性源保持默认实现即可。
    fn value_watchers(&mut self) -> Option<&mut ValueWatchers> {
        None
    }

    /// 注册属性变更监听器，静态属性源忽略此调用
    fn add_value_watcher(&mut self, callback: PropertyChangedCallback) {
        if self.is_static() {
            return;
        }
        if let Some(watchers) = self.value_watchers() {
            watchers.add(callback);
        }
    }

    /// 移除所有监听器
    fn clear_value_watchers(&mut self) {
        if let Some(watchers) = self.value_watchers() {
            watchers.clear();
        }
    }
}

impl fmt::Debug for dyn PropertySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySource")
            .field("name", &self.name())
            .field("static", &self.is_static())
            .field("has_values", &self.has_values())
            .finish()
    }
}

/// 属性变更监听器列表
///
/// 动态属性源内嵌此结构来保存监听器并分发通知。
#[derive(Clone, Default)]
pub struct ValueWatchers {
    callbacks: Vec<PropertyChangedCallback>,
}

impl ValueWatchers {
    /// 创建空的监听器列表
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加监听器
    pub fn add(&mut self, callback: PropertyChangedCallback) {
        self.callbacks.push(callback);
    }

    /// 移除所有监听器
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 监听器数量
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// 是否没有监听器
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// 通知所有监听器
    pub fn notify(&self, property_name: &str) {
        for callback in &self.callbacks {
            callback(property_name);
        }
    }
}

impl fmt::Debug for ValueWatchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueWatchers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
