//! 作用域
//!
//! 作用域实例按调用方管理的生命周期分组 `Scoped` 实例，删除时整体释放。

use crate::definition::Definition;
use crate::instance::InstanceHolder;
use dashmap::DashMap;
use di_common::{DefinitionKey, DependencyError, DependencyResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 模块中声明的作用域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDeclaration {
    /// 作用域名称
    pub name: String,
}

impl ScopeDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 作用域实例
pub struct ScopeInstance {
    id: String,
    scope_name: Option<String>,
    holders: DashMap<DefinitionKey, Arc<InstanceHolder>>,
    closed: AtomicBool,
}

impl ScopeInstance {
    /// 创建新的作用域实例
    pub fn new(id: impl Into<String>, scope_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            scope_name,
            holders: DashMap::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 声明的作用域名称
    pub fn scope_name(&self) -> Option<&str> {
        self.scope_name.as_deref()
    }

    /// 是否已删除
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 检查 `Scoped` 定义能否通过本作用域实例解析
    ///
    /// 双方的作用域名称必须都存在且相同。
    pub fn check_definition(&self, definition: &Definition) -> DependencyResult<()> {
        match (definition.scope_name(), self.scope_name()) {
            (Some(required), Some(supplied)) if required == supplied => Ok(()),
            (required, supplied) => Err(DependencyError::BadScopeInstance {
                key: definition.key().clone(),
                required: required.unwrap_or("<none>").to_string(),
                supplied: format!("{} (id: {})", supplied.unwrap_or("<none>"), self.id),
            }),
        }
    }

    /// 获取（必要时创建）定义在本作用域中的实例持有者
    pub fn holder_for(&self, definition: &Definition) -> DependencyResult<Arc<InstanceHolder>> {
        if self.is_closed() {
            return Err(DependencyError::ScopeNotFound {
                scope_id: self.id.clone(),
            });
        }

        // 先克隆出 Arc 再释放分片锁，工厂函数可能递归访问本作用域
        let holder = self
            .holders
            .entry(definition.key().clone())
            .or_default()
            .value()
            .clone();

        // 插入期间可能已被关闭，此时 close() 未必能看到这条记录
        if self.is_closed() {
            self.holders.remove(definition.key());
            holder.close();
            return Err(DependencyError::ScopeNotFound {
                scope_id: self.id.clone(),
            });
        }
        Ok(holder)
    }

    /// 移除并释放某个定义在本作用域中的实例，返回是否存在
    pub fn remove_holder(&self, key: &DefinitionKey) -> bool {
        match self.holders.remove(key) {
            Some((_, holder)) => {
                holder.close();
                true
            }
            None => false,
        }
    }

    /// 持有者数量（含尚未创建实例的）
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    /// 已创建实例的数量
    pub fn instance_count(&self) -> usize {
        self.holders
            .iter()
            .filter(|entry| entry.value().is_created())
            .count()
    }

    /// 释放所有实例，之后的解析会失败
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!("关闭作用域实例: {}", self.id);
        for entry in self.holders.iter() {
            entry.value().close();
        }
        self.holders.clear();
    }
}

impl fmt::Debug for ScopeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeInstance")
            .field("id", &self.id)
            .field("scope_name", &self.scope_name)
            .field("holders", &self.holders.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl fmt::Display for ScopeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope_name {
            Some(name) => write!(f, "ScopeInstance['{}' @ '{}']", self.id, name),
            None => write!(f, "ScopeInstance['{}']", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::testing::{context_for, NoopResolver};
    use crate::Parameters;

    #[derive(Debug)]
    struct Session;

    fn session_definition(scope_name: &str) -> Definition {
        let mut module = Module::new();
        module.scope(scope_name, |scope| {
            scope.scoped(|_| Ok(Arc::new(Session)));
        });
        let (mut definitions, _) = module.into_parts();
        definitions.remove(0)
    }

    #[test]
    fn test_check_definition_requires_matching_names() {
        let definition = session_definition("request");

        assert!(ScopeInstance::new("r1", Some("request".into()))
            .check_definition(&definition)
            .is_ok());

        let mismatch = ScopeInstance::new("s1", Some("session".into()))
            .check_definition(&definition)
            .unwrap_err();
        match mismatch {
            DependencyError::BadScopeInstance {
                required, supplied, ..
            } => {
                assert_eq!(required, "request");
                assert!(supplied.starts_with("session"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(ScopeInstance::new("open", None)
            .check_definition(&definition)
            .is_err());
    }

    #[test]
    fn test_holders_are_per_scope_instance() {
        let definition = session_definition("request");
        let first = ScopeInstance::new("r1", Some("request".into()));
        let second = ScopeInstance::new("r2", Some("request".into()));

        let a = first.holder_for(&definition).unwrap();
        let b = first.holder_for(&definition).unwrap();
        let c = second.holder_for(&definition).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_close_releases_holders_and_rejects_resolution() {
        let definition = session_definition("request");
        let scope = ScopeInstance::new("r1", Some("request".into()));
        let resolver = NoopResolver;
        let parameters = Parameters::new();

        let holder = scope.holder_for(&definition).unwrap();
        holder
            .get(&definition, &context_for(&resolver, &definition, &parameters))
            .unwrap();
        assert_eq!(scope.instance_count(), 1);

        scope.close();

        assert!(scope.is_closed());
        assert!(!holder.is_created());
        assert_eq!(scope.instance_count(), 0);
        assert!(matches!(
            scope.holder_for(&definition),
            Err(DependencyError::ScopeNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_holder_drops_cached_instance() {
        let definition = session_definition("request");
        let scope = ScopeInstance::new("r1", Some("request".into()));
        let resolver = NoopResolver;
        let parameters = Parameters::new();
        let ctx = context_for(&resolver, &definition, &parameters);

        let first = scope.holder_for(&definition).unwrap();
        let before = first.get(&definition, &ctx).unwrap();

        assert!(scope.remove_holder(definition.key()));
        assert!(!scope.remove_holder(definition.key()));
        assert!(!first.is_created());

        let after = scope
            .holder_for(&definition)
            .unwrap()
            .get(&definition, &ctx)
            .unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_close_racing_holder_for_leaves_no_holders() {
        use std::sync::Barrier;
        use std::thread;

        for _ in 0..20 {
            let definition = Arc::new(session_definition("request"));
            let scope = Arc::new(ScopeInstance::new("r1", Some("request".into())));
            let barrier = Arc::new(Barrier::new(5));

            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let definition = definition.clone();
                    let scope = scope.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        for _ in 0..50 {
                            if scope.holder_for(&definition).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();

            barrier.wait();
            scope.close();
            for worker in workers {
                worker.join().unwrap();
            }

            assert_eq!(scope.holder_count(), 0);
            assert!(matches!(
                scope.holder_for(&definition),
                Err(DependencyError::ScopeNotFound { .. })
            ));
        }
    }
}
