//! 容器配置

use di_common::LogLevel;
use serde::{Deserialize, Serialize};

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 容器日志级别
    pub log_level: LogLevel,
}

impl ContainerConfig {
    /// 开发环境配置：输出每次解析的耗时
    pub fn development() -> Self {
        Self {
            log_level: LogLevel::Debug,
            ..Self::default()
        }
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            log_level: LogLevel::Info,
        }
    }
}
