//! # Infrastructure Common
//!
//! 这个 crate 提供了 Sprout 运行时各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`PropertyValue`] - 配置值的封闭标签联合
//! - [`TypeInfo`] - Bean 的编译期类型标识
//! - [`ConfigError`] / [`DependencyError`] / [`InfrastructureError`] - 错误类型
//!
//! ## 设计原则
//!
//! - 缺失值是一等公民，不是错误
//! - 可恢复的情况返回空结果，不可恢复的情况由调用方视为致命

pub mod errors;
pub mod metadata;
pub mod value;

pub use errors::*;
pub use metadata::*;
pub use value::*;
