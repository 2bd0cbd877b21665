//! # 基础设施组合层
//!
//! 把属性解析器与 Bean 工厂组合成应用上下文，并负责进程启动时的上下文创建。
//!
//! ## 主要功能
//!
//! - **应用上下文**: [`DefaultApplicationContext`] 同时是属性解析器和 Bean 工厂
//! - **启动**: [`create`] 解析命令行，确定应用名称与 profile，注册属性源工厂
//! - **日志**: [`init_logging`] 按 [`LoggingConfig`] 初始化 `tracing` 订阅者
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{ApplicationContext, Bean, BeanFactoryExt};
//! use config_abstractions::PropertyResolver;
//!
//! struct Greeter;
//! impl Bean for Greeter {}
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = infrastructure_composition::create_from_env()?;
//!     context.initialize();
//!
//!     let port = context.get_property_as_int("server.port", 8080)?;
//!     let greeter = context.create_singleton(|| Greeter);
//!     println!("{} 监听端口 {}，Bean 已创建: {}", context.name(), port, greeter.is_some());
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod context;
pub mod logging;

// 重新导出主要类型
pub use bean_macros::Bean;
pub use bootstrapper::{
    create, create_from_env, ContextArgs, ContextBootstrapper, ACTIVE_PROFILES_KEY, APPLICATION_NAME_KEY,
};
pub use context::{ContextOptions, DefaultApplicationContext, APPLICATION_PROPERTIES, BOOTSTRAP_PROPERTIES};
pub use logging::{init_logging, LoggingConfig};
