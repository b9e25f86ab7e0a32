//! 实例持有者
//!
//! 按定义的生命周期执行缓存策略：`Factory` 每次调用工厂函数，
//! `Single` / `Scoped` 只创建一次，并发首次访问时只有一个线程执行工厂函数。

use crate::definition::{AnyInstance, Definition};
use crate::resolver::ResolveContext;
use di_common::{DependencyResult, Kind};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 实例持有者
pub struct InstanceHolder {
    /// 关闭时整体替换为新的空单元，正在创建的调用仍写入旧单元
    cell: RwLock<Arc<OnceCell<AnyInstance>>>,
}

impl InstanceHolder {
    /// 创建空的实例持有者
    pub fn new() -> Self {
        Self {
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    /// 按定义的生命周期获取实例
    ///
    /// 创建失败时不缓存任何结果，下一次调用会重新尝试。
    pub fn get(
        &self,
        definition: &Definition,
        ctx: &ResolveContext<'_>,
    ) -> DependencyResult<AnyInstance> {
        match definition.kind() {
            Kind::Factory => definition.create(ctx),
            Kind::Single | Kind::Scoped => {
                let cell = self.cell.read().clone();
                if let Some(instance) = cell.get() {
                    return Ok(instance.clone());
                }

                cell.get_or_try_init(|| {
                    debug!("创建实例: {}", definition);
                    definition.create(ctx)
                })
                .cloned()
            }
        }
    }

    /// 是否已缓存实例
    pub fn is_created(&self) -> bool {
        self.cell.read().get().is_some()
    }

    /// 释放缓存的实例
    pub fn close(&self) {
        *self.cell.write() = Arc::new(OnceCell::new());
    }
}

impl Default for InstanceHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHolder")
            .field("created", &self.is_created())
            .finish()
    }
}
