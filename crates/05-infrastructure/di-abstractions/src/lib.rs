//! # Dependency Injection Abstractions
//!
//! 依赖注入的定义模型与解析抽象，解析引擎（`di-impl`）建立在这些类型之上。
//!
//! ## 核心类型
//!
//! - [`Definition`] - 定义：身份 + 生命周期 + 工厂函数
//! - [`Module`] - 定义的声明式构建器
//! - [`ResolveContext`] - 传递给工厂函数的解析上下文
//! - [`DependencyResolver`] - 解析引擎需要实现的对象安全接口
//! - [`InstanceHolder`] - 按生命周期缓存实例
//! - [`ScopeInstance`] - 作用域实例及其持有的实例
//! - [`Injectable`] - 可由 `#[derive(Injectable)]` 自动装配的类型

pub mod definition;
pub mod factory;
pub mod instance;
pub mod module;
pub mod parameters;
pub mod property;
pub mod resolver;
pub mod scope;

#[cfg(test)]
mod testing;

pub use definition::*;
pub use factory::*;
pub use instance::*;
pub use module::*;
pub use parameters::*;
pub use property::*;
pub use resolver::*;
pub use scope::*;

pub use di_common::{
    BoxError, DefinitionKey, DependencyError, DependencyResult, Kind, TypeInfo,
};
