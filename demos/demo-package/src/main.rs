//! # 依赖注入演示
//!
//! 演示容器的主要能力：
//! - 单例、工厂和作用域定义
//! - `#[derive(Injectable)]` 编译期装配
//! - 属性注入与运行时参数
//! - 延迟解析和容器关闭

use infrastructure_composition::{
    module, parameters, DependencyError, Injectable, KoinApplication, LoggingConfig,
    MapPropertySource, Module,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

// ========== 示例组件 ==========

/// 订单仓储接口
pub trait OrderRepository: Send + Sync {
    fn find(&self, id: u64) -> Option<String>;
}

/// 内存仓储实现
pub struct InMemoryOrders {
    prefix: String,
}

impl OrderRepository for InMemoryOrders {
    fn find(&self, id: u64) -> Option<String> {
        (id < 100).then(|| format!("{}-{:04}", self.prefix, id))
    }
}

/// 请求序号生成器
#[derive(Default)]
pub struct Sequence {
    next: AtomicU64,
}

impl Sequence {
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// 请求上下文，每个作用域一份
pub struct RequestContext {
    pub request_id: u64,
    pub user: String,
}

/// 订单服务，由派生宏装配
#[derive(Injectable)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    #[inject(property = "orders.page_size")]
    page_size: usize,
    #[inject(default)]
    sequence: Sequence,
}

impl OrderService {
    pub fn describe(&self, id: u64) -> String {
        let call = self.sequence.next();
        match self.orders.find(id) {
            Some(order) => format!("#{call} {order} (page size {})", self.page_size),
            None => format!("#{call} order {id} not found"),
        }
    }
}

// ========== 模块声明 ==========

fn app_module() -> Module {
    module(|m| {
        m.single(|ctx| {
            let prefix = ctx
                .property::<String>("orders.prefix")?
                .unwrap_or_else(|| "ORD".to_string());
            Ok(Arc::new(InMemoryOrders { prefix }) as Arc<dyn OrderRepository>)
        })
        .created_at_start();
        m.single(|_| Ok(Arc::new(Sequence::default())));
        m.factory_injectable::<OrderService>();

        m.scope("request", |scope| {
            scope.scoped(|ctx| {
                let sequence = ctx.get::<Sequence>()?;
                Ok(Arc::new(RequestContext {
                    request_id: sequence.next(),
                    user: ctx.param::<String>(0)?,
                }))
            });
        });
    })
}

// ========== 演示函数 ==========

fn demo_lifecycles(koin: &infrastructure_composition::Koin) -> anyhow::Result<()> {
    info!("=== 生命周期演示 ===");

    let first = koin.get::<dyn OrderRepository>()?;
    let second = koin.get::<dyn OrderRepository>()?;
    info!("单例是否相同: {}", Arc::ptr_eq(&first, &second));

    let a = koin.get::<OrderService>()?;
    let b = koin.get::<OrderService>()?;
    info!("工厂是否相同: {}", Arc::ptr_eq(&a, &b));
    info!("{}", a.describe(7));
    info!("{}", b.describe(700));
    Ok(())
}

fn demo_scopes(koin: &infrastructure_composition::Koin) -> anyhow::Result<()> {
    info!("=== 作用域演示 ===");

    for user in ["alice", "bob"] {
        let scope = koin.create_scope(&format!("req-{user}"), Some("request"))?;
        let context = koin.resolve::<RequestContext>(
            None,
            Some(&scope),
            parameters![user.to_string()],
        )?;
        let again = koin.get_scoped::<RequestContext>(&scope)?;
        info!(
            "请求 {} 用户 {}，同一作用域内复用: {}",
            context.request_id,
            context.user,
            Arc::ptr_eq(&context, &again)
        );
        koin.delete_scope(scope.id())?;
    }

    match koin.get::<RequestContext>() {
        Err(DependencyError::BadScopeInstance { required, .. }) => {
            warn!("未提供作用域时无法解析，需要作用域 '{}'", required)
        }
        other => warn!("意外结果: {:?}", other.map(|_| ())),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let koin = KoinApplication::new()
        .with_logging(LoggingConfig::development())
        .property_source(
            MapPropertySource::default()
                .with("orders.prefix", "DEMO")
                .with("orders.page_size", "20"),
        )
        .add_config_env_vars("DEMO")
        .module(app_module())
        .enable_validation(true)
        .start()?;

    demo_lifecycles(&koin)?;
    demo_scopes(&koin)?;

    let lazy = koin.inject::<OrderService>();
    info!("延迟句柄已解析: {}", lazy.is_initialized());
    info!("{}", lazy.get()?.describe(42));

    koin.close();
    info!("关闭后解析: {}", koin.get::<Sequence>().is_err());
    Ok(())
}
