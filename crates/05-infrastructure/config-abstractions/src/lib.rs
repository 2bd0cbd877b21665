//! # Configuration Abstractions
//!
//! 配置抽象层，定义属性源与属性解析器的核心接口和约定。
//!
//! ## 核心接口
//!
//! - [`PropertySource`] - 属性源接口
//! - [`ValueWatchers`] - 动态属性源的监听器列表
//! - [`PropertyResolver`] - 属性解析器接口（含类型转换便捷方法）
//! - [`ConfigurablePropertyResolver`] - 可注册属性源与属性源工厂的解析器

pub mod resolver;
pub mod source;

pub use resolver::*;
pub use source::*;

/// 导入指令使用的属性键
pub const IMPORT_CONFIG_KEY: &str = "import.config";
