//! 属性注册表

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// 属性注册表，同名属性后写覆盖先写
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    values: RwLock<HashMap<String, Value>>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug!("设置属性: {}", key);
        self.values.write().insert(key, value);
    }

    /// 批量写入属性，返回新增的属性数量
    pub fn extend(&self, values: impl IntoIterator<Item = (String, Value)>) -> usize {
        let mut guard = self.values.write();
        let before = guard.len();
        guard.extend(values);
        guard.len() - before
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// 清空所有属性
    pub fn close(&self) {
        self.values.write().clear();
    }
}
