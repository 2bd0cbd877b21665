//! # Configuration Implementation
//!
//! 属性解析的具体实现：按注册顺序叠加的复合解析器，以及几种常用属性源。
//!
//! ## 主要组件
//!
//! - [`CompositingPropertyResolver`] - 后注册者优先的复合解析器，支持 `import.config` 导入链
//! - [`PropertyFilePropertySource`] - `key=value` 属性文件（静态）
//! - [`EnvironmentPropertySource`] - 进程环境变量（动态）
//! - [`MapPropertySource`] - 可在运行时修改的内存属性表（动态）
//! - [`CharSeparatedPropertySource`] - 单行分隔的 `k=v;k=v` 属性串（静态）

pub mod property_file;
pub mod providers;
pub mod resolver;

pub use property_file::*;
pub use providers::*;
pub use resolver::*;
