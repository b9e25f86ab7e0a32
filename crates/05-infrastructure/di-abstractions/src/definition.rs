//! 定义模型

use crate::instance::InstanceHolder;
use crate::resolver::ResolveContext;
use di_common::{BoxError, DefinitionKey, DependencyError, DependencyResult, Kind, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的实例
///
/// 内部存放的是 `Arc<T>`，因此 `T` 可以是 trait object。
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的工厂函数
pub type FactoryFn =
    Arc<dyn Fn(&ResolveContext<'_>) -> Result<AnyInstance, BoxError> + Send + Sync>;

/// 定义选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// 容器启动时立即创建
    pub created_at_start: bool,
    /// 允许覆盖同一身份的已有定义
    pub allow_override: bool,
}

/// 定义
///
/// 描述如何为某个类型生产实例。工厂函数只能经由 [`InstanceHolder`] 调用。
pub struct Definition {
    key: DefinitionKey,
    kind: Kind,
    scope_name: Option<String>,
    options: Options,
    dependencies: Vec<DefinitionKey>,
    factory: FactoryFn,
    holder: InstanceHolder,
}

impl Definition {
    /// 创建新的定义
    pub fn new<T, F>(kind: Kind, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move |ctx: &ResolveContext<'_>| {
            factory(ctx).map(|instance| Arc::new(instance) as AnyInstance)
        });

        Self {
            key: DefinitionKey::new(TypeInfo::of::<T>(), None),
            kind,
            scope_name: None,
            options: Options::default(),
            dependencies: Vec::new(),
            factory,
            holder: InstanceHolder::new(),
        }
    }

    /// 定义身份
    pub fn key(&self) -> &DefinitionKey {
        &self.key
    }

    /// 声明的类型
    pub fn type_info(&self) -> TypeInfo {
        self.key.type_info
    }

    /// 限定名称
    pub fn name(&self) -> Option<&str> {
        self.key.name.as_deref()
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// 所属作用域名称（仅 `Scoped`）
    pub fn scope_name(&self) -> Option<&str> {
        self.scope_name.as_deref()
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// 声明的依赖，仅用于静态校验
    pub fn dependencies(&self) -> &[DefinitionKey] {
        &self.dependencies
    }

    /// 容器级实例持有者（`Single` / `Factory`）
    pub fn holder(&self) -> &InstanceHolder {
        &self.holder
    }

    pub fn is_scoped(&self) -> bool {
        self.kind == Kind::Scoped
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.key.name = Some(name);
    }

    pub(crate) fn set_scope_name(&mut self, scope_name: String) {
        self.scope_name = Some(scope_name);
    }

    pub(crate) fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub(crate) fn add_dependency(&mut self, dependency: DefinitionKey) {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    pub(crate) fn set_dependencies(&mut self, dependencies: Vec<DefinitionKey>) {
        self.dependencies = dependencies;
    }

    /// 调用工厂函数，失败时包装为 `InstanceCreation`
    pub(crate) fn create(&self, ctx: &ResolveContext<'_>) -> DependencyResult<AnyInstance> {
        (self.factory)(ctx).map_err(|source| DependencyError::InstanceCreation {
            key: self.key.clone(),
            source,
        })
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("scope_name", &self.scope_name)
            .field("options", &self.options)
            .field("dependencies", &self.dependencies)
            .field("factory", &"<function>")
            .finish()
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.key)?;
        if let Some(scope_name) = &self.scope_name {
            write!(f, " @ '{}'", scope_name)?;
        }
        Ok(())
    }
}
