//! 解析引擎

use crate::config::ContainerConfig;
use crate::hooks::ResolutionHook;
use crate::lazy::Lazy;
use crate::property::PropertyRegistry;
use crate::registry::DefinitionRegistry;
use crate::scope_registry::ScopeRegistry;
use crate::validation::DependencyGraphValidator;
use di_abstractions::{
    decode_property, downcast_instance, optional, AnyInstance, Definition, DependencyResolver, Module,
    Parameters, ResolutionPath, ResolveContext, ResolveRequest, ScopeInstance,
};
use di_common::{
    DefinitionKey, DependencyError, DependencyResult, LogLevel, TypeInfo,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// 依赖注入容器
///
/// 持有定义注册表、作用域注册表和属性注册表，负责按生命周期解析实例。
/// 容器可在多线程间共享（通常以 `Arc<Koin>` 形式持有）。
pub struct Koin {
    config: ContainerConfig,
    definitions: DefinitionRegistry,
    scopes: ScopeRegistry,
    properties: PropertyRegistry,
    hooks: RwLock<Vec<Arc<dyn ResolutionHook>>>,
    closed: AtomicBool,
}

impl Koin {
    /// 创建空容器
    pub fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            definitions: DefinitionRegistry::new(),
            scopes: ScopeRegistry::new(),
            properties: PropertyRegistry::new(),
            hooks: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注册解析钩子
    pub fn add_hook(&self, hook: Arc<dyn ResolutionHook>) {
        self.hooks.write().push(hook);
    }

    // ---- 模块与定义 ----

    /// 加载模块，返回注册的定义数量
    ///
    /// 任一定义冲突时整批不生效。被覆盖的 `Scoped` 定义在存活作用域中的实例一并丢弃。
    pub fn load_modules(&self, modules: impl IntoIterator<Item = Module>) -> DependencyResult<usize> {
        self.ensure_open()?;
        let start = Instant::now();

        let mut definitions = Vec::new();
        let mut declarations = Vec::new();
        for module in modules {
            let (module_definitions, module_scopes) = module.into_parts();
            definitions.extend(module_definitions);
            declarations.extend(module_scopes);
        }
        let count = definitions.len();

        let overridden = self.definitions.register_all(definitions)?;
        for declaration in declarations {
            self.scopes.declare(declaration);
        }
        for key in &overridden {
            self.scopes.evict(key);
        }

        // 与 close() 并发时，关闭流程可能已经清空过注册表
        if self.is_closed() {
            self.definitions.close();
            return Err(DependencyError::ContainerClosed);
        }

        if self.config.log_level.is_at(LogLevel::Info) {
            info!(
                "加载了 {} 个定义，耗时 {:.3} ms",
                count,
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(count)
    }

    /// 创建所有启动时实例化的单例，首个失败即中止
    pub fn create_eager_instances(&self) -> DependencyResult<()> {
        self.ensure_open()?;
        let eager = self.definitions.find_all_created_at_start();
        if eager.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        for definition in &eager {
            let request = ResolveRequest::new(definition.type_info()).with_name(definition.name());
            self.resolve_any(request)?;
        }

        if self.config.log_level.is_at(LogLevel::Debug) {
            debug!(
                "创建了 {} 个启动实例，耗时 {:.3} ms",
                eager.len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(())
    }

    /// 是否存在匹配的定义
    pub fn is_registered<T: ?Sized + 'static>(&self, name: Option<&str>) -> bool {
        self.definitions
            .contains(&DefinitionKey::of::<T>(name))
    }

    /// 所有定义身份，按注册顺序
    pub fn definition_keys(&self) -> Vec<DefinitionKey> {
        self.definitions.keys()
    }

    /// 静态校验声明的依赖：依赖必须已注册，且依赖图无环
    pub fn validate(&self) -> Result<(), Vec<DependencyError>> {
        if self.is_closed() {
            return Err(vec![DependencyError::ContainerClosed]);
        }
        DependencyGraphValidator::new(&self.definitions.definitions()).validate()
    }

    // ---- 解析 ----

    /// 解析依赖
    pub fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>(None, None, Parameters::new())
    }

    /// 按名称解析依赖
    pub fn get_named<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>(Some(name), None, Parameters::new())
    }

    /// 使用名称和运行时参数解析依赖
    pub fn get_with<T>(&self, name: Option<&str>, parameters: Parameters) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>(name, None, parameters)
    }

    /// 解析可选依赖，未注册时返回 `None`
    pub fn get_optional<T>(&self) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        optional(self.get::<T>())
    }

    /// 通过作用域实例解析依赖
    pub fn get_scoped<T>(&self, scope: &Arc<ScopeInstance>) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>(None, Some(scope), Parameters::new())
    }

    /// 完整形式的解析：名称、作用域和运行时参数均可选
    pub fn resolve<T>(
        &self,
        name: Option<&str>,
        scope: Option<&Arc<ScopeInstance>>,
        parameters: Parameters,
    ) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let request = ResolveRequest::new(TypeInfo::of::<T>())
            .with_name(name)
            .with_scope(scope)
            .with_parameters(parameters);
        let key = request.key();
        let instance = self.resolve_any(request)?;
        downcast_instance::<T>(instance, key)
    }

    /// 延迟解析句柄，首次访问时解析
    pub fn inject<T>(self: &Arc<Self>) -> Lazy<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Lazy::new(Arc::clone(self), None, None, Parameters::new())
    }

    /// 带名称、作用域和参数的延迟解析句柄
    pub fn inject_with<T>(
        self: &Arc<Self>,
        name: Option<&str>,
        scope: Option<Arc<ScopeInstance>>,
        parameters: Parameters,
    ) -> Lazy<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Lazy::new(
            Arc::clone(self),
            name.map(str::to_string),
            scope,
            parameters,
        )
    }

    // ---- 作用域 ----

    /// 创建作用域实例
    pub fn create_scope(
        &self,
        scope_id: &str,
        scope_name: Option<&str>,
    ) -> DependencyResult<Arc<ScopeInstance>> {
        self.ensure_open()?;
        let scope = self.scopes.create_scope_instance(scope_id, scope_name)?;
        self.reject_if_closed(scope)
    }

    /// 以类型名称作为作用域名称创建作用域实例
    pub fn create_scope_with_type<T: ?Sized + 'static>(
        &self,
        scope_id: &str,
    ) -> DependencyResult<Arc<ScopeInstance>> {
        self.create_scope(scope_id, Some(TypeInfo::of::<T>().name))
    }

    /// 返回已有作用域实例，不存在时创建
    pub fn get_or_create_scope(
        &self,
        scope_id: &str,
        scope_name: Option<&str>,
    ) -> DependencyResult<Arc<ScopeInstance>> {
        self.ensure_open()?;
        let scope = self.scopes.get_or_create_scope_instance(scope_id, scope_name);
        self.reject_if_closed(scope)
    }

    /// 以类型名称作为作用域名称获取或创建作用域实例
    pub fn get_or_create_scope_with_type<T: ?Sized + 'static>(
        &self,
        scope_id: &str,
    ) -> DependencyResult<Arc<ScopeInstance>> {
        self.get_or_create_scope(scope_id, Some(TypeInfo::of::<T>().name))
    }

    pub fn get_scope(&self, scope_id: &str) -> DependencyResult<Arc<ScopeInstance>> {
        self.ensure_open()?;
        self.scopes.get_scope_instance(scope_id)
    }

    pub fn get_scope_or_null(&self, scope_id: &str) -> DependencyResult<Option<Arc<ScopeInstance>>> {
        self.ensure_open()?;
        Ok(self.scopes.get_scope_instance_or_null(scope_id))
    }

    /// 删除作用域实例，释放其中的实例；删除不存在的作用域不报错
    pub fn delete_scope(&self, scope_id: &str) -> DependencyResult<()> {
        self.ensure_open()?;
        self.scopes.delete_scope_instance(scope_id);
        Ok(())
    }

    /// 存活的作用域 id
    pub fn active_scope_ids(&self) -> Vec<String> {
        self.scopes.active_scope_ids()
    }

    // ---- 属性 ----

    /// 读取属性
    pub fn get_property<T: DeserializeOwned>(&self, key: &str) -> DependencyResult<Option<T>> {
        self.ensure_open()?;
        self.properties
            .get(key)
            .map(|value| decode_property(key, value))
            .transpose()
    }

    /// 读取属性，缺失时返回默认值
    pub fn get_property_or<T: DeserializeOwned>(&self, key: &str, default: T) -> DependencyResult<T> {
        Ok(self.get_property(key)?.unwrap_or(default))
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<Value>) -> DependencyResult<()> {
        self.ensure_open()?;
        self.properties.set(key, value.into());
        Ok(())
    }

    pub fn delete_property(&self, key: &str) -> DependencyResult<()> {
        self.ensure_open()?;
        self.properties.remove(key);
        Ok(())
    }

    /// 批量写入属性
    pub fn load_properties(&self, values: HashMap<String, Value>) -> DependencyResult<()> {
        self.ensure_open()?;
        let count = values.len();
        self.properties.extend(values);
        debug!("加载了 {} 个属性", count);
        Ok(())
    }

    // ---- 生命周期 ----

    /// 关闭容器：依次释放作用域、定义和属性。重复调用无副作用。
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.scopes.close();
        self.definitions.close();
        self.properties.close();
        if self.config.log_level.is_at(LogLevel::Info) {
            info!("容器已关闭");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> DependencyResult<()> {
        if self.is_closed() {
            Err(DependencyError::ContainerClosed)
        } else {
            Ok(())
        }
    }

    /// 作用域创建期间容器被关闭时，撤销刚创建的作用域
    fn reject_if_closed(&self, scope: Arc<ScopeInstance>) -> DependencyResult<Arc<ScopeInstance>> {
        if self.is_closed() {
            self.scopes.delete_scope_instance(scope.id());
            return Err(DependencyError::ContainerClosed);
        }
        Ok(scope)
    }

    fn resolve_definition(&self, request: &ResolveRequest<'_>) -> DependencyResult<AnyInstance> {
        let definition = self
            .definitions
            .find_definition(request.type_info, request.name)?;
        let key = definition.key();

        if let Some(parent) = request.path {
            if self.config.enable_circular_dependency_detection && parent.contains(key) {
                return Err(DependencyError::CircularDependency {
                    chain: parent.describe(key),
                });
            }
            if parent.depth() >= self.config.max_resolution_depth {
                return Err(DependencyError::ResolutionDepthExceeded {
                    key: key.clone(),
                    max_depth: self.config.max_resolution_depth,
                });
            }
        }

        let path = match request.path {
            Some(parent) => parent.child(key),
            None => ResolutionPath::root(key),
        };
        let ctx = ResolveContext::new(self, request.scope, &request.parameters, path);

        if definition.is_scoped() {
            let scope = request
                .scope
                .ok_or_else(|| missing_scope(&definition))?;
            scope.check_definition(&definition)?;
            let holder = scope.holder_for(&definition)?;
            holder.get(&definition, &ctx)
        } else {
            definition.holder().get(&definition, &ctx)
        }
    }
}

impl DependencyResolver for Koin {
    fn resolve_any(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance> {
        self.ensure_open()?;
        let key = request.key();
        let timed = self.config.log_level.is_at(LogLevel::Debug);
        if timed {
            debug!("+- get {}", key);
        }

        let start = Instant::now();
        let result = self.resolve_definition(&request);
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                if timed {
                    debug!("+- got {} in {:.3} ms", key, elapsed.as_secs_f64() * 1000.0);
                }
                for hook in self.hooks.read().iter() {
                    hook.on_resolved(&key, elapsed);
                }
            }
            Err(e) => {
                if self.config.log_level.is_at(LogLevel::Error) && request.path.is_none() {
                    error!("解析失败: {}, 原因: {}", key, e);
                }
                for hook in self.hooks.read().iter() {
                    hook.on_failed(&key, e);
                }
            }
        }
        result
    }

    fn property_value(&self, key: &str) -> DependencyResult<Option<Value>> {
        self.ensure_open()?;
        Ok(self.properties.get(key))
    }
}

impl Default for Koin {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}

impl fmt::Debug for Koin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Koin")
            .field("config", &self.config)
            .field("definitions", &self.definitions.len())
            .field("scopes", &self.scopes.active_scope_ids())
            .field("properties", &self.properties.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn missing_scope(definition: &Definition) -> DependencyError {
    DependencyError::BadScopeInstance {
        key: definition.key().clone(),
        required: definition.scope_name().unwrap_or("<none>").to_string(),
        supplied: "<none>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{parameters, module};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug)]
    struct Config {
        url: String,
    }

    #[derive(Debug)]
    struct Client {
        config: Arc<Config>,
    }

    fn started(modules: Vec<Module>) -> Koin {
        let koin = Koin::default();
        koin.load_modules(modules).unwrap();
        koin
    }

    #[test]
    fn test_nested_resolution_through_context() {
        let koin = started(vec![module(|m| {
            m.single(|_| {
                Ok(Arc::new(Config {
                    url: "db://local".into(),
                }))
            });
            m.factory(|ctx| {
                Ok(Arc::new(Client {
                    config: ctx.get()?,
                }))
            });
        })]);

        let first = koin.get::<Client>().unwrap();
        let second = koin.get::<Client>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first.config, &second.config));
        assert_eq!(first.config.url, "db://local");
    }

    #[test]
    fn test_parameters_reach_factory() {
        let koin = started(vec![module(|m| {
            m.factory(|ctx| {
                Ok(Arc::new(Config {
                    url: ctx.param::<String>(0)?,
                }))
            });
        })]);

        let config = koin
            .get_with::<Config>(None, parameters!["db://remote".to_string()])
            .unwrap();
        assert_eq!(config.url, "db://remote");

        let missing = koin.get::<Config>().unwrap_err();
        assert!(matches!(
            missing.root_cause(),
            DependencyError::MissingParameter { index: 0, .. }
        ));
    }

    #[test]
    fn test_cycle_reported_with_chain() {
        #[derive(Debug)]
        struct A;
        #[derive(Debug)]
        struct B;

        let koin = started(vec![module(|m| {
            m.single(|ctx| {
                ctx.get::<B>()?;
                Ok(Arc::new(A))
            });
            m.single(|ctx| {
                ctx.get::<A>()?;
                Ok(Arc::new(B))
            });
        })]);

        let error = koin.get::<A>().unwrap_err();
        match error.root_cause() {
            DependencyError::CircularDependency { chain } => {
                assert_eq!(chain.matches(" -> ").count(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_depth_limit_applies_without_cycle_detection() {
        #[derive(Debug)]
        struct Recursive;

        let config = ContainerConfig {
            enable_circular_dependency_detection: false,
            max_resolution_depth: 4,
            ..ContainerConfig::default()
        };
        let koin = Koin::new(config);
        koin.load_modules([module(|m| {
            m.factory(|ctx| {
                ctx.get::<Recursive>()?;
                Ok(Arc::new(Recursive))
            });
        })])
        .unwrap();

        let error = koin.get::<Recursive>().unwrap_err();
        assert!(matches!(
            error.root_cause(),
            DependencyError::ResolutionDepthExceeded { max_depth: 4, .. }
        ));
    }

    #[test]
    fn test_properties_are_typed() {
        let koin = Koin::default();
        koin.set_property("server.port", "8080").unwrap();
        koin.set_property("server.host", "localhost").unwrap();

        assert_eq!(koin.get_property::<u16>("server.port").unwrap(), Some(8080));
        assert_eq!(
            koin.get_property::<String>("server.host").unwrap().as_deref(),
            Some("localhost")
        );
        assert_eq!(koin.get_property_or("server.threads", 4u32).unwrap(), 4);
        assert!(matches!(
            koin.get_property::<u16>("server.host"),
            Err(DependencyError::PropertyConversion { .. })
        ));
    }

    #[test]
    fn test_hooks_observe_resolutions() {
        #[derive(Default)]
        struct Counting {
            resolved: AtomicUsize,
            failed: AtomicUsize,
        }

        impl ResolutionHook for Counting {
            fn on_resolved(&self, _key: &DefinitionKey, _elapsed: Duration) {
                self.resolved.fetch_add(1, Ordering::SeqCst);
            }

            fn on_failed(&self, _key: &DefinitionKey, _error: &DependencyError) {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        let koin = started(vec![module(|m| {
            m.single(|_| Ok(Arc::new(Config { url: String::new() })));
            m.single(|ctx| Ok(Arc::new(Client { config: ctx.get()? })));
        })]);
        let hook = Arc::new(Counting::default());
        koin.add_hook(hook.clone());

        koin.get::<Client>().unwrap();
        assert!(koin.get::<String>().is_err());

        // Client 与其嵌套的 Config 各一次
        assert_eq!(hook.resolved.load(Ordering::SeqCst), 2);
        assert_eq!(hook.failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_rejects_calls() {
        let koin = started(vec![module(|m| {
            m.single(|_| Ok(Arc::new(Config { url: String::new() })));
        })]);
        koin.get::<Config>().unwrap();

        koin.close();
        koin.close();

        assert!(koin.is_closed());
        assert!(matches!(koin.get::<Config>(), Err(DependencyError::ContainerClosed)));
        assert!(matches!(
            koin.create_scope("s1", None),
            Err(DependencyError::ContainerClosed)
        ));
        assert!(matches!(
            koin.load_modules(Vec::new()),
            Err(DependencyError::ContainerClosed)
        ));
        assert!(koin.definition_keys().is_empty());
    }
}
