//! 启动错误类型

use di_common::{ConfigError, DependencyError};
use thiserror::Error;

/// 容器启动错误
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("日志初始化失败: {message}")]
    Logging { message: String },

    #[error("属性加载失败: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("容器启动失败: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("依赖校验失败，共 {} 个问题", .errors.len())]
    Validation { errors: Vec<DependencyError> },
}
