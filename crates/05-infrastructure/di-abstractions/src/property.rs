//! 属性值转换

use di_common::{DependencyError, DependencyResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 将属性值反序列化为目标类型
///
/// 字符串值（例如来自环境变量的 `"42"`）在直接反序列化失败后会再按 JSON 解析一次。
pub fn decode_property<T: DeserializeOwned>(key: &str, value: Value) -> DependencyResult<T> {
    let raw = match &value {
        Value::String(raw) => Some(raw.clone()),
        _ => None,
    };

    match serde_json::from_value::<T>(value) {
        Ok(decoded) => Ok(decoded),
        Err(source) => raw
            .and_then(|raw| serde_json::from_str::<T>(&raw).ok())
            .ok_or_else(|| DependencyError::PropertyConversion {
                key: key.to_string(),
                source,
            }),
    }
}
