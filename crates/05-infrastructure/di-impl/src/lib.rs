//! # 依赖注入具体实现
//!
//! 提供定义注册表、作用域注册表、属性注册表以及解析引擎 [`Koin`]。
//!
//! ```
//! use di_abstractions::module;
//! use di_impl::Koin;
//! use std::sync::Arc;
//!
//! struct Repository;
//!
//! let koin = Koin::default();
//! koin.load_modules([module(|m| {
//!     m.single(|_| Ok(Arc::new(Repository)));
//! })])
//! .unwrap();
//!
//! let first = koin.get::<Repository>().unwrap();
//! let second = koin.get::<Repository>().unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

pub mod config;
pub mod container;
pub mod hooks;
pub mod lazy;
pub mod property;
pub mod registry;
pub mod scope_registry;
mod validation;

pub use config::ContainerConfig;
pub use container::Koin;
pub use hooks::ResolutionHook;
pub use lazy::Lazy;
pub use property::PropertyRegistry;
pub use registry::DefinitionRegistry;
pub use scope_registry::ScopeRegistry;
