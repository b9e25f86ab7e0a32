//! 生命周期与日志级别

use serde::{Deserialize, Serialize};
use std::fmt;

/// 定义的生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// 单例模式 - 容器生命周期内只创建一个实例
    Single,
    /// 工厂模式 - 每次解析都创建新实例
    Factory,
    /// 作用域模式 - 每个作用域实例内创建一个实例
    Scoped,
}

impl Kind {
    /// 是否缓存实例
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Single | Self::Scoped)
    }
}

impl Default for Kind {
    fn default() -> Self {
        Self::Single
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Single => "single",
            Self::Factory => "factory",
            Self::Scoped => "scoped",
        };
        f.write_str(label)
    }
}

/// 容器日志级别
///
/// `Debug` 级别下引擎会输出每次解析的耗时。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// 是否在指定级别启用
    pub fn is_at(&self, level: LogLevel) -> bool {
        level != LogLevel::None && *self >= level
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}
