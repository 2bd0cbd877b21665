//! # Bean Macros
//!
//! 这个 crate 提供 `#[derive(Bean)]`，为类型生成 `di_abstractions::Bean` 实现。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use bean_macros::Bean;
//! use di_abstractions::{BeanFactory, BeanFactoryAware, BeanNameAware};
//! use std::rc::Weak;
//!
//! #[derive(Bean, Default)]
//! #[bean(factory_aware, name_aware)]
//! pub struct Registry {
//!     factory: Option<Weak<dyn BeanFactory>>,
//!     name: String,
//! }
//!
//! impl BeanFactoryAware for Registry {
//!     fn set_bean_factory(&mut self, factory: Weak<dyn BeanFactory>) {
//!         self.factory = Some(factory);
//!     }
//! }
//!
//! impl BeanNameAware for Registry {
//!     fn set_bean_name(&mut self, name: &str) {
//!         self.name = name.to_string();
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod bean;

/// Bean 派生宏
///
/// 生成 `di_abstractions::Bean` 实现。`#[bean(...)]` 声明需要的注入：
///
/// - `context_aware` - 需要实现 `ApplicationContextAware`
/// - `factory_aware` - 需要实现 `BeanFactoryAware`
/// - `name_aware` - 需要实现 `BeanNameAware`
///
/// 未声明的能力保持 trait 默认实现（返回 `None`）。
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    bean::derive_bean_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
