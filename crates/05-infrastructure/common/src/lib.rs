//! # DI Common
//!
//! Lorn DI 各 crate 共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 解析引擎的错误类型
//! - [`ConfigError`] - 属性源加载错误
//! - [`Kind`] - 定义的生命周期类型
//! - [`TypeInfo`] / [`DefinitionKey`] - 定义的身份标识
//! - [`LogLevel`] - 容器日志级别

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
