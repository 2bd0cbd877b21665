//! 属性解析器抽象接口

use crate::source::PropertySource;
use infrastructure_common::{ConfigError, ConfigResult, PropertyValue};
use std::rc::Rc;
use tracing::error;

/// 属性源工厂：根据一个字符串参数创建新的属性源
///
/// 参数的含义（文件路径、连接串等）由具体属性源决定。
/// 工厂以 `Rc` 共享，解析器可以在不持有自身借用的情况下调用它。
pub type PropertySourceFactory = Rc<dyn Fn(&str) -> Box<dyn PropertySource>>;

/// 属性解析器 trait
///
/// 应用与各个属性源之间的间接层。只有 [`get_property`](Self::get_property)
/// 需要实现，其余方法都是基于它的便捷转换。
pub trait PropertyResolver {
    /// 获取属性值，不存在时返回 [`PropertyValue::Absent`]
    fn get_property(&self, property_name: &str) -> PropertyValue;

    /// 检查属性是否存在
    fn contains_property(&self, property_name: &str) -> bool {
        self.get_property(property_name).is_present()
    }

    /// 获取属性的文本形式
    ///
    /// 文本原样返回，整数 / 浮点数 / 布尔值转换为规范文本，缺失时返回默认值。
    fn get_property_as_string(&self, property_name: &str, default_value: &str) -> String {
        self.get_property(property_name)
            .to_text()
            .unwrap_or_else(|| default_value.to_string())
    }

    /// 获取属性的整数形式
    ///
    /// 文本按整数解析，解析失败返回错误而不是默认值；浮点数向零截断；
    /// 布尔值转换为 1 / 0；缺失时返回默认值。
    fn get_property_as_int(&self, property_name: &str, default_value: i64) -> ConfigResult<i64> {
        match self.get_property(property_name) {
            PropertyValue::String(text) => {
                text.trim()
                    .parse::<i64>()
                    .map_err(|source| ConfigError::InvalidInteger {
                        key: property_name.to_string(),
                        value: text.clone(),
                        source,
                    })
            }
            PropertyValue::Int(value) => Ok(value),
            PropertyValue::Float(value) => Ok(value.trunc() as i64),
            PropertyValue::Bool(value) => Ok(i64::from(value)),
            PropertyValue::Absent => Ok(default_value),
        }
    }

    /// 获取属性的浮点数形式
    fn get_property_as_float(&self, property_name: &str, default_value: f64) -> ConfigResult<f64> {
        match self.get_property(property_name) {
            PropertyValue::String(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|source| ConfigError::InvalidFloat {
                        key: property_name.to_string(),
                        value: text.clone(),
                        source,
                    })
            }
            PropertyValue::Int(value) => Ok(value as f64),
            PropertyValue::Float(value) => Ok(value),
            PropertyValue::Bool(value) => Ok(if value { 1.0 } else { 0.0 }),
            PropertyValue::Absent => Ok(default_value),
        }
    }

    /// 获取属性的布尔形式
    ///
    /// 文本接受 true/false、yes/no、on/off、1/0（不区分大小写）。
    fn get_property_as_bool(&self, property_name: &str, default_value: bool) -> ConfigResult<bool> {
        match self.get_property(property_name) {
            PropertyValue::String(text) => parse_bool(&text).ok_or(ConfigError::InvalidBool {
                key: property_name.to_string(),
                value: text,
            }),
            PropertyValue::Int(value) => Ok(value != 0),
            PropertyValue::Float(value) => Ok(value != 0.0),
            PropertyValue::Bool(value) => Ok(value),
            PropertyValue::Absent => Ok(default_value),
        }
    }

    /// 获取必需的属性
    ///
    /// # Panics
    ///
    /// 属性缺失时 panic。仅用于启动阶段的关键配置。
    fn get_property_required(&self, property_name: &str) -> PropertyValue {
        let value = self.get_property(property_name);
        if value.is_absent() {
            let err = ConfigError::RequiredPropertyMissing {
                key: property_name.to_string(),
            };
            error!("{}", err);
            panic!("{}", err);
        }
        value
    }
}

/// 可注册属性源的解析器 trait
pub trait ConfigurablePropertyResolver: PropertyResolver {
    /// 注册属性源，所有权转移给解析器
    fn register_property_source(&mut self, source: Box<dyn PropertySource>);

    /// 以符号名称注册属性源工厂，同名工厂会被覆盖
    fn register_property_source_factory(&mut self, source_name: &str, factory: PropertySourceFactory);

    /// 把类型 `T` 绑定到符号名称，工厂通过 `T::from(参数)` 创建属性源
    fn register_source_type<T>(&mut self, source_name: &str)
    where
        T: PropertySource + for<'a> From<&'a str> + 'static,
        Self: Sized,
    {
        self.register_property_source_factory(
            source_name,
            Rc::new(|parameter: &str| -> Box<dyn PropertySource> { Box::new(T::from(parameter)) }),
        );
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
