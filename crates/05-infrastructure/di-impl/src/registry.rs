//! 定义注册表

use di_abstractions::Definition;
use di_common::{DefinitionKey, DependencyError, DependencyResult, Kind, TypeInfo};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Default)]
struct RegistryInner {
    definitions: HashMap<DefinitionKey, Arc<Definition>>,
    /// 按类型索引，保持注册顺序
    by_type: HashMap<TypeInfo, Vec<DefinitionKey>>,
    /// 全局注册顺序
    order: Vec<DefinitionKey>,
}

/// 定义注册表
///
/// 以 `(类型, 名称)` 为键保存定义；实例创建从不在持锁期间进行。
#[derive(Default)]
pub struct DefinitionRegistry {
    inner: RwLock<RegistryInner>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册定义
    ///
    /// 同一身份已存在时，除非任一方允许覆盖，否则返回 `DefinitionConflict`。
    /// 覆盖后新定义沿用原定义的注册位置。
    pub fn register(&self, definition: Definition) -> DependencyResult<()> {
        self.register_all(vec![definition]).map(|_| ())
    }

    /// 批量注册定义，返回被覆盖的定义身份
    ///
    /// 整批（包括批内重复）先做冲突检查，存在冲突时不写入任何定义。
    pub fn register_all(&self, definitions: Vec<Definition>) -> DependencyResult<Vec<DefinitionKey>> {
        let mut inner = self.inner.write();
        check_conflicts(&inner, &definitions)?;

        let mut overridden = Vec::new();
        for definition in definitions {
            let key = definition.key().clone();
            if let Some(existing) = inner.definitions.get(&key) {
                warn!("覆盖定义: {}", key);
                existing.holder().close();
                inner.definitions.insert(key.clone(), Arc::new(definition));
                overridden.push(key);
                continue;
            }

            debug!("注册定义: {}", definition);
            inner
                .by_type
                .entry(key.type_info)
                .or_default()
                .push(key.clone());
            inner.order.push(key.clone());
            inner.definitions.insert(key, Arc::new(definition));
        }
        Ok(overridden)
    }

    /// 查找定义
    ///
    /// 指定名称时精确匹配；未指定名称时优先返回无名定义，其次是唯一的具名定义。
    pub fn find_definition(
        &self,
        type_info: TypeInfo,
        name: Option<&str>,
    ) -> DependencyResult<Arc<Definition>> {
        let inner = self.inner.read();
        let key = DefinitionKey::new(type_info, name.map(str::to_string));

        if let Some(definition) = inner.definitions.get(&key) {
            return Ok(Arc::clone(definition));
        }
        if name.is_some() {
            return Err(DependencyError::NoDefinitionFound { key });
        }

        let candidates = inner.by_type.get(&type_info).map(Vec::as_slice).unwrap_or(&[]);
        match candidates {
            [] => Err(DependencyError::NoDefinitionFound { key }),
            [only] => inner
                .definitions
                .get(only)
                .cloned()
                .ok_or(DependencyError::NoDefinitionFound { key }),
            many => Err(DependencyError::AmbiguousDefinition {
                type_name: type_info.name.to_string(),
                candidates: many
                    .iter()
                    .filter_map(|k| k.name.clone())
                    .collect(),
            }),
        }
    }

    /// 启动时需要创建的单例，按注册顺序
    pub fn find_all_created_at_start(&self) -> Vec<Arc<Definition>> {
        self.definitions()
            .into_iter()
            .filter(|d| d.kind() == Kind::Single && d.options().created_at_start)
            .collect()
    }

    /// 所有定义，按注册顺序
    pub fn definitions(&self) -> Vec<Arc<Definition>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|key| inner.definitions.get(key).cloned())
            .collect()
    }

    /// 所有定义身份，按注册顺序
    pub fn keys(&self) -> Vec<DefinitionKey> {
        self.inner.read().order.clone()
    }

    pub fn contains(&self, key: &DefinitionKey) -> bool {
        self.inner.read().definitions.contains_key(key)
    }

    /// 某类型是否有任意定义
    pub fn contains_type(&self, type_info: TypeInfo) -> bool {
        self.inner
            .read()
            .by_type
            .get(&type_info)
            .is_some_and(|keys| !keys.is_empty())
    }

    pub fn len(&self) -> usize {
        self.inner.read().definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 释放所有定义及其实例
    pub fn close(&self) {
        let mut inner = self.inner.write();
        for definition in inner.definitions.values() {
            definition.holder().close();
        }
        inner.definitions.clear();
        inner.by_type.clear();
        inner.order.clear();
    }
}

/// 逐个检查身份冲突，批内后出现的定义视为覆盖前者
fn check_conflicts(inner: &RegistryInner, definitions: &[Definition]) -> DependencyResult<()> {
    let mut pending: HashMap<&DefinitionKey, bool> = HashMap::new();
    for definition in definitions {
        let key = definition.key();
        let incoming = definition.options().allow_override;
        let current = pending
            .get(key)
            .copied()
            .or_else(|| inner.definitions.get(key).map(|d| d.options().allow_override));
        if current == Some(false) && !incoming {
            return Err(DependencyError::DefinitionConflict { key: key.clone() });
        }
        pending.insert(key, incoming);
    }
    Ok(())
}

impl std::fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
