//! # Configuration Implementation
//!
//! 属性源实现，启动时把外部配置加载进容器的属性注册表。
//!
//! ## 主要组件
//!
//! - [`PropertySource`] - 属性源接口
//! - [`TomlPropertySource`] - TOML 文件属性源
//! - [`JsonPropertySource`] - JSON 文件属性源
//! - [`EnvironmentPropertySource`] - 环境变量属性源
//! - [`MapPropertySource`] - 内存属性源

pub mod providers;
pub mod source;

pub use providers::*;
pub use source::*;
