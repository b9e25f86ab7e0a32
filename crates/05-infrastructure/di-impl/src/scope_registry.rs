//! 作用域注册表

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{ScopeDeclaration, ScopeInstance};
use di_common::{DefinitionKey, DependencyError, DependencyResult};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// 作用域注册表
///
/// 保存模块声明的作用域名称和当前存活的作用域实例。
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    declared: RwLock<HashSet<String>>,
    scopes: DashMap<String, Arc<ScopeInstance>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录模块声明的作用域
    pub fn declare(&self, declaration: ScopeDeclaration) {
        self.declared.write().insert(declaration.name);
    }

    pub fn is_declared(&self, scope_name: &str) -> bool {
        self.declared.read().contains(scope_name)
    }

    /// 创建作用域实例，`id` 重复时返回 `ScopeAlreadyExists`
    pub fn create_scope_instance(
        &self,
        scope_id: &str,
        scope_name: Option<&str>,
    ) -> DependencyResult<Arc<ScopeInstance>> {
        self.warn_if_undeclared(scope_name);

        match self.scopes.entry(scope_id.to_string()) {
            Entry::Occupied(_) => Err(DependencyError::ScopeAlreadyExists {
                scope_id: scope_id.to_string(),
            }),
            Entry::Vacant(entry) => {
                let scope = Arc::new(ScopeInstance::new(
                    scope_id,
                    scope_name.map(str::to_string),
                ));
                entry.insert(Arc::clone(&scope));
                debug!("创建作用域: {}", scope);
                Ok(scope)
            }
        }
    }

    /// 返回已有作用域实例，不存在时创建
    pub fn get_or_create_scope_instance(
        &self,
        scope_id: &str,
        scope_name: Option<&str>,
    ) -> Arc<ScopeInstance> {
        if let Some(scope) = self.get_scope_instance_or_null(scope_id) {
            return scope;
        }
        self.warn_if_undeclared(scope_name);

        let scope = self
            .scopes
            .entry(scope_id.to_string())
            .or_insert_with(|| {
                Arc::new(ScopeInstance::new(
                    scope_id,
                    scope_name.map(str::to_string),
                ))
            });
        Arc::clone(scope.value())
    }

    pub fn get_scope_instance_or_null(&self, scope_id: &str) -> Option<Arc<ScopeInstance>> {
        self.scopes.get(scope_id).map(|entry| Arc::clone(entry.value()))
    }

    /// 获取作用域实例，不存在时返回 `ScopeNotFound`
    pub fn get_scope_instance(&self, scope_id: &str) -> DependencyResult<Arc<ScopeInstance>> {
        self.get_scope_instance_or_null(scope_id)
            .ok_or_else(|| DependencyError::ScopeNotFound {
                scope_id: scope_id.to_string(),
            })
    }

    /// 删除作用域实例并释放其持有的实例，重复删除无副作用
    pub fn delete_scope_instance(&self, scope_id: &str) -> bool {
        match self.scopes.remove(scope_id) {
            Some((_, scope)) => {
                scope.close();
                debug!("删除作用域: {}", scope);
                true
            }
            None => false,
        }
    }

    /// 丢弃所有存活作用域中某个定义的实例，返回受影响的作用域数量
    pub fn evict(&self, key: &DefinitionKey) -> usize {
        let evicted = self
            .scopes
            .iter()
            .filter(|entry| entry.value().remove_holder(key))
            .count();
        if evicted > 0 {
            debug!("从 {} 个作用域中移除定义实例: {}", evicted, key);
        }
        evicted
    }

    /// 存活的作用域 id
    pub fn active_scope_ids(&self) -> Vec<String> {
        self.scopes.iter().map(|entry| entry.key().clone()).collect()
    }

    /// 删除所有作用域实例
    pub fn close(&self) {
        for scope_id in self.active_scope_ids() {
            self.delete_scope_instance(&scope_id);
        }
        self.declared.write().clear();
    }

    fn warn_if_undeclared(&self, scope_name: Option<&str>) {
        if let Some(name) = scope_name {
            if !self.is_declared(name) {
                warn!("作用域 '{}' 未在任何模块中声明", name);
            }
        }
    }
}
