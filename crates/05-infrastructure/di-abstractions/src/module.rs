//! 模块
//!
//! 声明式地收集定义和作用域声明，启动时合并进定义注册表。

use crate::definition::Definition;
use crate::factory::Injectable;
use crate::resolver::ResolveContext;
use crate::scope::ScopeDeclaration;
use di_common::{BoxError, DefinitionKey, Kind, TypeInfo};
use std::ops::Add;
use std::sync::Arc;
use tracing::warn;

/// 模块
#[derive(Debug, Default)]
pub struct Module {
    /// 模块内所有单例在启动时创建
    created_at_start: bool,
    /// 模块内所有定义允许覆盖
    allow_override: bool,
    definitions: Vec<Definition>,
    scopes: Vec<ScopeDeclaration>,
}

impl Module {
    /// 创建新模块
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带模块级选项的模块
    pub fn with_options(created_at_start: bool, allow_override: bool) -> Self {
        Self {
            created_at_start,
            allow_override,
            ..Self::default()
        }
    }

    /// 声明单例定义
    pub fn single<T, F>(&mut self, factory: F) -> DefinitionBuilder<'_>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.declare(Definition::new(Kind::Single, factory))
    }

    /// 声明工厂定义
    pub fn factory<T, F>(&mut self, factory: F) -> DefinitionBuilder<'_>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.declare(Definition::new(Kind::Factory, factory))
    }

    /// 声明由 [`Injectable`] 构建的单例
    pub fn single_injectable<T: Injectable>(&mut self) -> DefinitionBuilder<'_> {
        self.declare(injectable_definition::<T>(Kind::Single))
    }

    /// 声明由 [`Injectable`] 构建的工厂定义
    pub fn factory_injectable<T: Injectable>(&mut self) -> DefinitionBuilder<'_> {
        self.declare(injectable_definition::<T>(Kind::Factory))
    }

    /// 以接口类型 `R` 注册由 `T` 构建的单例
    ///
    /// `bind` 把 `Arc<T>` 转换为 `Arc<R>`，通常写作 `|it| it`：
    ///
    /// ```
    /// use di_abstractions::{DependencyResult, Injectable, Module, ResolveContext};
    ///
    /// trait Clock: Send + Sync {}
    /// struct SystemClock;
    /// impl Clock for SystemClock {}
    ///
    /// impl Injectable for SystemClock {
    ///     fn build(_: &ResolveContext<'_>) -> DependencyResult<Self> {
    ///         Ok(SystemClock)
    ///     }
    /// }
    ///
    /// let mut module = Module::new();
    /// module.single_injectable_as::<dyn Clock, SystemClock>(|it| it);
    /// assert_eq!(module.len(), 1);
    /// ```
    pub fn single_injectable_as<R, T>(&mut self, bind: fn(Arc<T>) -> Arc<R>) -> DefinitionBuilder<'_>
    where
        R: ?Sized + Send + Sync + 'static,
        T: Injectable,
    {
        self.declare(injectable_definition_as::<R, T>(Kind::Single, bind))
    }

    /// 以接口类型 `R` 注册由 `T` 构建的工厂定义
    pub fn factory_injectable_as<R, T>(&mut self, bind: fn(Arc<T>) -> Arc<R>) -> DefinitionBuilder<'_>
    where
        R: ?Sized + Send + Sync + 'static,
        T: Injectable,
    {
        self.declare(injectable_definition_as::<R, T>(Kind::Factory, bind))
    }

    /// 声明作用域及其 `Scoped` 定义
    pub fn scope(
        &mut self,
        scope_name: impl Into<String>,
        declare: impl FnOnce(&mut ScopeDsl<'_>),
    ) -> &mut Self {
        let scope_name = scope_name.into();
        let mut dsl = ScopeDsl {
            scope_name: scope_name.clone(),
            definitions: &mut self.definitions,
        };
        declare(&mut dsl);
        self.scopes.push(ScopeDeclaration::new(scope_name));
        self
    }

    /// 以类型名称声明作用域，与 `create_scope_with_type::<T>` 配合使用
    pub fn scope_for<T: ?Sized + 'static>(
        &mut self,
        declare: impl FnOnce(&mut ScopeDsl<'_>),
    ) -> &mut Self {
        self.scope(TypeInfo::of::<T>().name, declare)
    }

    /// 已声明的定义
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// 已声明的作用域
    pub fn scopes(&self) -> &[ScopeDeclaration] {
        &self.scopes
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 拆分为定义和作用域声明，并把模块级选项合并进每个定义
    pub fn into_parts(self) -> (Vec<Definition>, Vec<ScopeDeclaration>) {
        let Self {
            created_at_start,
            allow_override,
            mut definitions,
            scopes,
        } = self;

        for definition in &mut definitions {
            let is_single = definition.kind() == Kind::Single;
            let options = definition.options_mut();
            options.allow_override |= allow_override;
            if is_single {
                options.created_at_start |= created_at_start;
            }
        }

        (definitions, scopes)
    }

    fn declare(&mut self, definition: Definition) -> DefinitionBuilder<'_> {
        self.definitions.push(definition);
        let index = self.definitions.len() - 1;
        DefinitionBuilder {
            definition: &mut self.definitions[index],
        }
    }
}

impl Add for Module {
    type Output = Vec<Module>;

    fn add(self, rhs: Module) -> Vec<Module> {
        vec![self, rhs]
    }
}

/// 以闭包形式构建模块
///
/// ```
/// use di_abstractions::module;
/// use std::sync::Arc;
///
/// let m = module(|m| {
///     m.single(|_| Ok(Arc::new(String::from("lorn"))));
/// });
/// assert_eq!(m.len(), 1);
/// ```
pub fn module(declare: impl FnOnce(&mut Module)) -> Module {
    let mut module = Module::new();
    declare(&mut module);
    module
}

/// 作用域内的定义声明
pub struct ScopeDsl<'m> {
    scope_name: String,
    definitions: &'m mut Vec<Definition>,
}

impl ScopeDsl<'_> {
    /// 声明 `Scoped` 定义
    pub fn scoped<T, F>(&mut self, factory: F) -> DefinitionBuilder<'_>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolveContext<'_>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.declare(Definition::new(Kind::Scoped, factory))
    }

    /// 声明由 [`Injectable`] 构建的 `Scoped` 定义
    pub fn scoped_injectable<T: Injectable>(&mut self) -> DefinitionBuilder<'_> {
        self.declare(injectable_definition::<T>(Kind::Scoped))
    }

    /// 以接口类型 `R` 声明由 `T` 构建的 `Scoped` 定义
    pub fn scoped_injectable_as<R, T>(&mut self, bind: fn(Arc<T>) -> Arc<R>) -> DefinitionBuilder<'_>
    where
        R: ?Sized + Send + Sync + 'static,
        T: Injectable,
    {
        self.declare(injectable_definition_as::<R, T>(Kind::Scoped, bind))
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    fn declare(&mut self, mut definition: Definition) -> DefinitionBuilder<'_> {
        definition.set_scope_name(self.scope_name.clone());
        self.definitions.push(definition);
        let index = self.definitions.len() - 1;
        DefinitionBuilder {
            definition: &mut self.definitions[index],
        }
    }
}

/// 定义构建器，用于补充名称和选项
pub struct DefinitionBuilder<'m> {
    definition: &'m mut Definition,
}

impl DefinitionBuilder<'_> {
    /// 设置限定名称
    pub fn named(self, name: impl Into<String>) -> Self {
        self.definition.set_name(name.into());
        self
    }

    /// 启动时创建（仅对单例生效）
    pub fn created_at_start(self) -> Self {
        if self.definition.kind() == Kind::Single {
            self.definition.options_mut().created_at_start = true;
        } else {
            warn!("忽略非单例定义的启动创建选项: {}", self.definition);
        }
        self
    }

    /// 允许覆盖同一身份的已有定义
    pub fn allow_override(self) -> Self {
        self.definition.options_mut().allow_override = true;
        self
    }

    /// 声明依赖类型，供静态校验使用
    pub fn depends_on<D: ?Sized + 'static>(self) -> Self {
        self.definition.add_dependency(DefinitionKey::of::<D>(None));
        self
    }

    /// 声明具名依赖，供静态校验使用
    pub fn depends_on_named<D: ?Sized + 'static>(self, name: &str) -> Self {
        self.definition.add_dependency(DefinitionKey::of::<D>(Some(name)));
        self
    }
}

fn injectable_definition<T: Injectable>(kind: Kind) -> Definition {
    let mut definition = Definition::new::<T, _>(kind, |ctx| Ok(Arc::new(T::build(ctx)?)));
    definition.set_dependencies(T::dependencies());
    definition
}

fn injectable_definition_as<R, T>(kind: Kind, bind: fn(Arc<T>) -> Arc<R>) -> Definition
where
    R: ?Sized + Send + Sync + 'static,
    T: Injectable,
{
    let mut definition =
        Definition::new::<R, _>(kind, move |ctx| Ok(bind(Arc::new(T::build(ctx)?))));
    definition.set_dependencies(T::dependencies());
    definition
}
