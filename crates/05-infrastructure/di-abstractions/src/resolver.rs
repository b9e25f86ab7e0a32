//! 解析抽象
//!
//! 工厂函数通过 [`ResolveContext`] 回调解析引擎获取自身依赖。

use crate::definition::AnyInstance;
use crate::parameters::Parameters;
use crate::property::decode_property;
use crate::scope::ScopeInstance;
use di_common::{DefinitionKey, DependencyError, DependencyResult, TypeInfo};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// 解析引擎接口
///
/// 对象安全，泛型便捷方法由 [`ResolveContext`] 和具体容器提供。
pub trait DependencyResolver: Send + Sync {
    /// 解析类型擦除后的实例
    fn resolve_any(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance>;

    /// 读取原始属性值
    fn property_value(&self, key: &str) -> DependencyResult<Option<serde_json::Value>>;
}

/// 一次解析请求
pub struct ResolveRequest<'a> {
    /// 请求的类型
    pub type_info: TypeInfo,
    /// 可选限定名称
    pub name: Option<&'a str>,
    /// 作用域实例
    pub scope: Option<&'a Arc<ScopeInstance>>,
    /// 运行时参数
    pub parameters: Parameters,
    /// 发起请求的解析链（顶层请求为空）
    pub path: Option<&'a ResolutionPath<'a>>,
}

impl<'a> ResolveRequest<'a> {
    /// 创建顶层解析请求
    pub fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            name: None,
            scope: None,
            parameters: Parameters::new(),
            path: None,
        }
    }

    pub fn with_name(mut self, name: Option<&'a str>) -> Self {
        self.name = name;
        self
    }

    pub fn with_scope(mut self, scope: Option<&'a Arc<ScopeInstance>>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_path(mut self, path: Option<&'a ResolutionPath<'a>>) -> Self {
        self.path = path;
        self
    }

    /// 请求对应的定义标识（用于错误信息）
    pub fn key(&self) -> DefinitionKey {
        DefinitionKey::new(self.type_info, self.name.map(str::to_string))
    }
}

/// 当前正在创建的定义链，用于检测循环依赖
#[derive(Clone, Copy)]
pub struct ResolutionPath<'a> {
    key: &'a DefinitionKey,
    parent: Option<&'a ResolutionPath<'a>>,
    depth: usize,
}

impl<'a> ResolutionPath<'a> {
    /// 以顶层定义开始解析链
    pub fn root(key: &'a DefinitionKey) -> Self {
        Self {
            key,
            parent: None,
            depth: 1,
        }
    }

    /// 在当前链末尾追加定义
    pub fn child(&'a self, key: &'a DefinitionKey) -> ResolutionPath<'a> {
        ResolutionPath {
            key,
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    pub fn key(&self) -> &DefinitionKey {
        self.key
    }

    /// 链长度
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 链上是否已包含该定义
    pub fn contains(&self, key: &DefinitionKey) -> bool {
        let mut current = Some(self);
        while let Some(path) = current {
            if path.key == key {
                return true;
            }
            current = path.parent;
        }
        false
    }

    /// 按解析顺序描述链条，末尾追加 `next`
    pub fn describe(&self, next: &DefinitionKey) -> String {
        let mut keys = Vec::with_capacity(self.depth + 1);
        let mut current = Some(self);
        while let Some(path) = current {
            keys.push(path.key.to_string());
            current = path.parent;
        }
        keys.reverse();
        keys.push(next.to_string());
        keys.join(" -> ")
    }
}

impl fmt::Debug for ResolutionPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionPath")
            .field("key", self.key)
            .field("depth", &self.depth)
            .finish()
    }
}

/// 解析上下文
///
/// 携带解析引擎、当前作用域实例、调用方提供的运行时参数以及当前解析链。
pub struct ResolveContext<'a> {
    resolver: &'a dyn DependencyResolver,
    scope: Option<&'a Arc<ScopeInstance>>,
    parameters: &'a Parameters,
    path: ResolutionPath<'a>,
}

impl<'a> ResolveContext<'a> {
    /// 创建新的解析上下文
    pub fn new(
        resolver: &'a dyn DependencyResolver,
        scope: Option<&'a Arc<ScopeInstance>>,
        parameters: &'a Parameters,
        path: ResolutionPath<'a>,
    ) -> Self {
        Self {
            resolver,
            scope,
            parameters,
            path,
        }
    }

    /// 解析依赖
    pub fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_with::<T>(None, Parameters::new())
    }

    /// 按名称解析依赖
    pub fn get_named<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_with::<T>(Some(name), Parameters::new())
    }

    /// 使用名称和运行时参数解析依赖，沿用当前作用域
    pub fn get_with<T>(&self, name: Option<&str>, parameters: Parameters) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let request = ResolveRequest::new(TypeInfo::of::<T>())
            .with_name(name)
            .with_scope(self.scope)
            .with_parameters(parameters)
            .with_path(Some(&self.path));
        let key = request.key();
        let instance = self.resolver.resolve_any(request)?;
        downcast_instance::<T>(instance, key)
    }

    /// 解析可选依赖，未注册时返回 `None`
    pub fn get_optional<T>(&self) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        optional(self.get::<T>())
    }

    /// 按名称解析可选依赖
    pub fn get_optional_named<T>(&self, name: &str) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        optional(self.get_named::<T>(name))
    }

    /// 读取指定位置的运行时参数
    pub fn param<T>(&self, index: usize) -> DependencyResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.parameters.get::<T>(index)
    }

    pub fn parameters(&self) -> &Parameters {
        self.parameters
    }

    /// 当前作用域实例
    pub fn scope(&self) -> Option<&Arc<ScopeInstance>> {
        self.scope
    }

    /// 当前解析链
    pub fn path(&self) -> &ResolutionPath<'a> {
        &self.path
    }

    /// 读取属性
    pub fn property<T: DeserializeOwned>(&self, key: &str) -> DependencyResult<Option<T>> {
        self.resolver
            .property_value(key)?
            .map(|value| decode_property(key, value))
            .transpose()
    }

    /// 读取必需属性，缺失时返回 `PropertyNotFound`
    pub fn property_required<T: DeserializeOwned>(&self, key: &str) -> DependencyResult<T> {
        self.property(key)?
            .ok_or_else(|| DependencyError::PropertyNotFound {
                key: key.to_string(),
            })
    }

    pub fn resolver(&self) -> &'a dyn DependencyResolver {
        self.resolver
    }
}

/// 未注册视为 `None`，其他错误照常返回
pub fn optional<T: ?Sized>(result: DependencyResult<Arc<T>>) -> DependencyResult<Option<Arc<T>>> {
    match result {
        Ok(instance) => Ok(Some(instance)),
        Err(DependencyError::NoDefinitionFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// 将类型擦除的实例还原为 `Arc<T>`
pub fn downcast_instance<T>(instance: AnyInstance, key: DefinitionKey) -> DependencyResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(DependencyError::TypeMismatch {
            key,
            expected: std::any::type_name::<T>(),
        })
}
