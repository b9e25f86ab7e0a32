//! 解析钩子

use di_common::{DefinitionKey, DependencyError};
use std::time::Duration;

/// 解析钩子
///
/// 每次解析（包括工厂函数内部的嵌套解析）结束后调用。钩子内不得回调容器。
pub trait ResolutionHook: Send + Sync {
    /// 解析成功
    fn on_resolved(&self, _key: &DefinitionKey, _elapsed: Duration) {}

    /// 解析失败
    fn on_failed(&self, _key: &DefinitionKey, _error: &DependencyError) {}
}
