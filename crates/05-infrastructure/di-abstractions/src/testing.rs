//! 单元测试辅助

use crate::definition::{AnyInstance, Definition};
use crate::parameters::Parameters;
use crate::resolver::{DependencyResolver, ResolutionPath, ResolveContext, ResolveRequest};
use di_common::{DependencyError, DependencyResult};

/// 不含任何定义的解析器
pub(crate) struct NoopResolver;

impl DependencyResolver for NoopResolver {
    fn resolve_any(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance> {
        Err(DependencyError::NoDefinitionFound { key: request.key() })
    }

    fn property_value(&self, _key: &str) -> DependencyResult<Option<serde_json::Value>> {
        Ok(None)
    }
}

pub(crate) fn context_for<'a>(
    resolver: &'a NoopResolver,
    definition: &'a Definition,
    parameters: &'a Parameters,
) -> ResolveContext<'a> {
    ResolveContext::new(
        resolver,
        None,
        parameters,
        ResolutionPath::root(definition.key()),
    )
}
