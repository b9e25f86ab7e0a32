//! 延迟解析句柄

use crate::container::Koin;
use di_abstractions::{Parameters, ScopeInstance};
use di_common::DependencyResult;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// 延迟解析句柄
///
/// 首次调用 [`Lazy::get`] 时解析，成功结果在句柄生命周期内缓存；失败不缓存。
pub struct Lazy<T: ?Sized> {
    koin: Arc<Koin>,
    name: Option<String>,
    scope: Option<Arc<ScopeInstance>>,
    parameters: Parameters,
    value: OnceCell<Arc<T>>,
}

impl<T> Lazy<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new(
        koin: Arc<Koin>,
        name: Option<String>,
        scope: Option<Arc<ScopeInstance>>,
        parameters: Parameters,
    ) -> Self {
        Self {
            koin,
            name,
            scope,
            parameters,
            value: OnceCell::new(),
        }
    }

    /// 获取实例，首次调用时解析
    pub fn get(&self) -> DependencyResult<Arc<T>> {
        self.value
            .get_or_try_init(|| {
                self.koin.resolve::<T>(
                    self.name.as_deref(),
                    self.scope.as_ref(),
                    self.parameters.clone(),
                )
            })
            .cloned()
    }

    /// 是否已经解析
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("type", &std::any::type_name::<T>())
            .field("name", &self.name)
            .field("initialized", &self.value.get().is_some())
            .finish()
    }
}
