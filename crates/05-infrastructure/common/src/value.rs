//! 属性值定义
//!
//! 所有跨越配置边界的值都使用 [`PropertyValue`] 表示。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 属性值
///
/// 封闭的五元标签联合：文本、64 位整数、64 位浮点数、布尔值以及缺失。
/// `Absent` 表示"没有值"，与空字符串不同。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// 文本
    String(String),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 布尔值
    Bool(bool),
    /// 缺失
    #[default]
    Absent,
}

impl PropertyValue {
    /// 是否缺失
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// 是否有值
    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// 获取文本值（仅当值为文本时）
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 转换为规范文本形式，缺失时返回 `None`
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            other => Some(other.to_string()),
        }
    }

    /// 值类型名称，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Absent => Ok(()),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
