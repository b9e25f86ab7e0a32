//! # 容器组合层
//!
//! 这个 crate 负责把模块、属性源和日志配置组合成一个可运行的容器。
//!
//! ## 主要功能
//!
//! - **应用构建器**: 使用构建者模式收集模块和启动选项
//! - **属性源管理**: 按优先级加载 TOML、JSON、环境变量等属性源
//! - **日志初始化**: 基于 `tracing-subscriber` 的日志配置
//! - **启动流程**: 加载属性和模块，校验依赖并创建启动实例
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{module, KoinApplication, LoggingConfig};
//! use std::sync::Arc;
//!
//! struct Greeting(String);
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let koin = KoinApplication::new()
//!         .with_logging(LoggingConfig::development())
//!         .add_config_toml("config.toml")
//!         .module(module(|m| {
//!             m.single(|ctx| {
//!                 let name: String = ctx.property_required("app.name")?;
//!                 Ok(Arc::new(Greeting(format!("hello, {name}"))))
//!             });
//!         }))
//!         .start()?;
//!
//!     println!("{}", koin.get::<Greeting>()?.0);
//!     koin.close();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod error;


// 重新导出主要类型
pub use builder::{KoinApplication, LoggingConfig};
pub use error::StartupError;

pub use component_macros::Injectable;
pub use config_impl::{
    EnvironmentPropertySource, JsonPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use di_abstractions::{
    module, parameters, DefinitionKey, DependencyError, DependencyResult, Injectable, Kind,
    Module, Parameters, ResolveContext, ScopeInstance, TypeInfo,
};
pub use di_common::LogLevel;
pub use di_impl::{ContainerConfig, Koin, Lazy, ResolutionHook};
