//! 属性源实现

use config_abstractions::{PropertyChangedCallback, PropertySource, ValueWatchers};
use infrastructure_common::PropertyValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// 内存属性表
///
/// 动态属性源。克隆得到的句柄共享同一张表，
/// 因此注册到解析器之后仍然可以通过保留的句柄修改属性。
/// 每次 [`set_property`](Self::set_property) / [`remove_property`](Self::remove_property)
/// 都会同步通知已注册的监听器。
#[derive(Debug, Clone)]
pub struct MapPropertySource {
    name: String,
    state: Rc<RefCell<MapState>>,
}

#[derive(Debug, Default)]
struct MapState {
    properties: HashMap<String, PropertyValue>,
    watchers: ValueWatchers,
}

impl MapPropertySource {
    /// 创建空的属性表
    pub fn new() -> Self {
        Self::with_name("map")
    }

    /// 创建带名称的空属性表
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Rc::new(RefCell::new(MapState::default())),
        }
    }

    /// 从键值对创建属性表
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let source = Self::new();
        {
            let mut state = source.state.borrow_mut();
            for (key, value) in pairs {
                let value = value.into();
                if value.is_present() {
                    state.properties.insert(key.into(), value);
                }
            }
        }
        source
    }

    /// 设置属性并通知监听器
    ///
    /// 设置为 [`PropertyValue::Absent`] 等同于删除。
    pub fn set_property(&self, property_name: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        let watchers = {
            let mut state = self.state.borrow_mut();
            if value.is_absent() {
                state.properties.remove(property_name);
            } else {
                state.properties.insert(property_name.to_string(), value);
            }
            state.watchers.clone()
        };

        trace!("属性表 {} 更新: {}", self.name, property_name);
        watchers.notify(property_name);
    }

    /// 删除属性并通知监听器，返回属性之前是否存在
    pub fn remove_property(&self, property_name: &str) -> bool {
        let (existed, watchers) = {
            let mut state = self.state.borrow_mut();
            let existed = state.properties.remove(property_name).is_some();
            (existed, state.watchers.clone())
        };

        if existed {
            trace!("属性表 {} 删除: {}", self.name, property_name);
            watchers.notify(property_name);
        }
        existed
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.state.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().properties.is_empty()
    }

    /// 已注册的监听器数量
    pub fn watcher_count(&self) -> usize {
        self.state.borrow().watchers.len()
    }
}

impl Default for MapPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, property_name: &str) -> PropertyValue {
        self.state
            .borrow()
            .properties
            .get(property_name)
            .cloned()
            .unwrap_or_default()
    }

    fn has_values(&self) -> bool {
        !self.state.borrow().properties.is_empty()
    }

    // 监听器保存在共享状态里，不能借出 `&mut`，因此直接覆盖增删方法
    fn add_value_watcher(&mut self, callback: PropertyChangedCallback) {
        self.state.borrow_mut().watchers.add(callback);
    }

    fn clear_value_watchers(&mut self) {
        self.state.borrow_mut().watchers.clear();
    }
}

/// 进程环境变量属性源
///
/// 动态属性源：每次读取都直接查询当前进程环境。
/// 属性名映射为环境变量名：`.` 替换为 `_`，去掉 `-`，字母转为大写，
/// 例如 `profiles.active` 对应 `PROFILES_ACTIVE`。
#[derive(Debug, Default)]
pub struct EnvironmentPropertySource {
    watchers: ValueWatchers,
}

impl EnvironmentPropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 属性名对应的环境变量名
    pub fn environment_variable_name(property_name: &str) -> String {
        property_name
            .chars()
            .filter(|c| *c != '-')
            .map(|c| match c {
                '.' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl From<&str> for EnvironmentPropertySource {
    fn from(_parameter: &str) -> Self {
        Self::new()
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get_property(&self, property_name: &str) -> PropertyValue {
        // 非 UTF-8 的值按有损转换返回，变量存在即视为有值
        std::env::var_os(Self::environment_variable_name(property_name))
            .map(|value| PropertyValue::from(value.to_string_lossy().into_owned()))
            .unwrap_or_default()
    }

    // 环境始终被视为有值
    fn has_values(&self) -> bool {
        true
    }

    fn value_watchers(&mut self) -> Option<&mut ValueWatchers> {
        Some(&mut self.watchers)
    }
}

/// 字符分隔的属性串
///
/// 把形如 `a=1;b=2` 的单行文本解析为静态属性源，分隔符默认为 `;`。
/// 适合从命令行参数或单个环境变量传入少量配置。
#[derive(Debug, Clone)]
pub struct CharSeparatedPropertySource {
    text: String,
    properties: HashMap<String, String>,
}

impl CharSeparatedPropertySource {
    /// 默认分隔符
    pub const DEFAULT_SEPARATOR: char = ';';

    /// 使用默认分隔符解析
    pub fn new(text: &str) -> Self {
        Self::with_separator(text, Self::DEFAULT_SEPARATOR)
    }

    /// 使用指定分隔符解析
    pub fn with_separator(text: &str, separator: char) -> Self {
        let properties: HashMap<String, String> = text
            .split(separator)
            .filter_map(|entry| {
                let (key, value) = entry.split_once('=')?;
                let (key, value) = (key.trim(), value.trim());
                (!key.is_empty() && !value.is_empty())
                    .then(|| (key.to_string(), value.to_string()))
            })
            .collect();

        debug!("解析分隔属性串: {} 项", properties.len());
        Self {
            text: text.to_string(),
            properties,
        }
    }
}

impl From<&str> for CharSeparatedPropertySource {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl PropertySource for CharSeparatedPropertySource {
    fn name(&self) -> &str {
        &self.text
    }

    fn get_property(&self, property_name: &str) -> PropertyValue {
        self.properties
            .get(property_name)
            .map(|value| PropertyValue::from(value.as_str()))
            .unwrap_or_default()
    }

    fn has_values(&self) -> bool {
        !self.properties.is_empty()
    }

    fn is_static(&self) -> bool {
        true
    }
}
