//! 错误类型定义

use crate::metadata::DefinitionKey;
use thiserror::Error;

/// 工厂函数可返回的任意错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("定义冲突: {key} 已注册，且双方都未允许覆盖")]
    DefinitionConflict { key: DefinitionKey },

    #[error("未找到定义: {key}，请检查模块声明")]
    NoDefinitionFound { key: DefinitionKey },

    #[error("定义不明确: '{type_name}' 存在多个候选 {candidates:?}，请指定名称")]
    AmbiguousDefinition {
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("作用域实例不匹配: {key} 需要作用域 '{required}'，实际提供 '{supplied}'")]
    BadScopeInstance {
        key: DefinitionKey,
        required: String,
        supplied: String,
    },

    #[error("实例创建失败: {key}, 原因: {source}")]
    InstanceCreation {
        key: DefinitionKey,
        #[source]
        source: BoxError,
    },

    #[error("作用域已存在: {scope_id}")]
    ScopeAlreadyExists { scope_id: String },

    #[error("作用域不存在: {scope_id}")]
    ScopeNotFound { scope_id: String },

    #[error("容器已关闭")]
    ContainerClosed,

    #[error("检测到循环依赖: {chain}")]
    CircularDependency { chain: String },

    #[error("解析深度超过上限 {max_depth}: {key}")]
    ResolutionDepthExceeded { key: DefinitionKey, max_depth: usize },

    #[error("缺少运行时参数: 索引 {index}, 期望类型 {expected}")]
    MissingParameter { index: usize, expected: &'static str },

    #[error("属性不存在: {key}")]
    PropertyNotFound { key: String },

    #[error("属性转换失败: {key}, 原因: {source}")]
    PropertyConversion {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("实例类型不匹配: {key} 无法转换为 {expected}")]
    TypeMismatch {
        key: DefinitionKey,
        expected: &'static str,
    },
}

impl DependencyError {
    /// 创建实例创建失败错误
    pub fn instance_creation(key: DefinitionKey, source: impl Into<BoxError>) -> Self {
        Self::InstanceCreation {
            key,
            source: source.into(),
        }
    }

    /// 沿 `InstanceCreation` 链向下查找最内层的依赖注入错误
    ///
    /// 工厂内部的递归解析失败会被外层定义包装，测试和调用方通常关心的是最初的失败原因。
    pub fn root_cause(&self) -> &DependencyError {
        let mut current = self;
        while let Self::InstanceCreation { source, .. } = current {
            match source.downcast_ref::<DependencyError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }
}

/// 属性源加载错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("属性文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("属性文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("属性文件解析失败: {path}, 原因: {source}")]
    ParseError { path: String, source: BoxError },

    #[error("属性值无效: {key}, 原因: {message}")]
    InvalidValue { key: String, message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
