//! 可自动装配的类型
//!
//! 不依赖运行时反射：依赖列表和构造逻辑在编译期由 `#[derive(Injectable)]` 生成，
//! 也可以手动实现。

use crate::resolver::ResolveContext;
use di_common::{DefinitionKey, DependencyResult};

/// 可注入类型 trait
pub trait Injectable: Sized + Send + Sync + 'static {
    /// 声明的依赖（类型 + 可选名称），按构造顺序排列
    fn dependencies() -> Vec<DefinitionKey> {
        Vec::new()
    }

    /// 通过解析上下文构建实例
    fn build(ctx: &ResolveContext<'_>) -> DependencyResult<Self>;
}
