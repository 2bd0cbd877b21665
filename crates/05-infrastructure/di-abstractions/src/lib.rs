//! # Dependency Injection Abstractions
//!
//! Bean 工厂与应用上下文的抽象层。
//!
//! ## 核心接口
//!
//! - [`Bean`] - Bean 能力声明（是否需要注入上下文 / 工厂 / 名称）
//! - [`BeanRef`] - 指向已注册 Bean 的非拥有句柄
//! - [`BeanFactory`] - 类型擦除的 Bean 注册表接口（对象安全）
//! - [`BeanFactoryExt`] - 建立在 [`BeanFactory`] 之上的类型化操作
//! - [`ApplicationContext`] - 组合属性解析与 Bean 工厂的应用上下文

pub mod bean;
pub mod context;
pub mod factory;

pub use bean::*;
pub use context::*;
pub use factory::*;
