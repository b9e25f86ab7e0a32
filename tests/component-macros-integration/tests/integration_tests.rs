//! `#[derive(Injectable)]` 与解析引擎的集成测试

use component_macros::Injectable;
use di_abstractions::{module, DefinitionKey, DependencyError, Injectable};
use di_impl::Koin;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug)]
pub struct Database {
    pub url: String,
}

pub trait AuditLog: Send + Sync {
    fn channel(&self) -> &str;
}

struct FileAudit;

impl AuditLog for FileAudit {
    fn channel(&self) -> &str {
        "file"
    }
}

#[derive(Debug, Default)]
pub struct Stats {
    pub hits: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_ms: u64,
}

#[derive(Injectable)]
pub struct OrderRepository {
    database: Arc<Database>,
}

#[derive(Injectable)]
pub struct OrderService {
    repository: Arc<OrderRepository>,
    #[inject(name = "audit")]
    audit: Arc<dyn AuditLog>,
    cache: Option<Arc<String>>,
    #[inject(property = "orders.page_size")]
    page_size: usize,
    #[inject(property = "orders.retry")]
    retry: Option<RetryPolicy>,
    #[inject(default)]
    stats: Stats,
}

fn koin() -> Koin {
    let koin = Koin::default();
    koin.load_modules([module(|m| {
        m.single(|_| {
            Ok(Arc::new(Database {
                url: "postgres://localhost/orders".into(),
            }))
        });
        m.single(|_| Ok(Arc::new(FileAudit) as Arc<dyn AuditLog>))
            .named("audit");
        m.single_injectable::<OrderRepository>();
        m.factory_injectable::<OrderService>();
    })])
    .unwrap();
    koin
}

#[test]
fn test_dependencies_follow_field_order() {
    assert_eq!(
        OrderService::dependencies(),
        vec![
            DefinitionKey::of::<OrderRepository>(None),
            DefinitionKey::of::<dyn AuditLog>(Some("audit")),
        ]
    );
    assert_eq!(
        OrderRepository::dependencies(),
        vec![DefinitionKey::of::<Database>(None)]
    );
}

#[test]
fn test_derived_type_is_wired() {
    let koin = koin();
    koin.set_property("orders.page_size", 25).unwrap();

    let service = koin.get::<OrderService>().unwrap();

    assert_eq!(service.repository.database.url, "postgres://localhost/orders");
    assert_eq!(service.audit.channel(), "file");
    assert!(service.cache.is_none());
    assert_eq!(service.page_size, 25);
    assert_eq!(service.retry, None);
    assert_eq!(service.stats.hits, 0);

    // 单例仓储在工厂实例之间共享
    let other = koin.get::<OrderService>().unwrap();
    assert!(Arc::ptr_eq(&service.repository, &other.repository));
}

#[test]
fn test_structured_property_is_deserialized() {
    let koin = koin();
    koin.set_property("orders.page_size", "50").unwrap();
    koin.set_property(
        "orders.retry",
        serde_json::json!({ "attempts": 3, "backoff_ms": 200 }),
    )
    .unwrap();

    let service = koin.get::<OrderService>().unwrap();

    assert_eq!(service.page_size, 50);
    assert_eq!(
        service.retry,
        Some(RetryPolicy {
            attempts: 3,
            backoff_ms: 200,
        })
    );
}

#[test]
fn test_missing_property_fails_creation() {
    let koin = koin();

    let error = match koin.get::<OrderService>() {
        Ok(_) => panic!("缺少属性时不应创建成功"),
        Err(error) => error,
    };

    assert!(matches!(
        error.root_cause(),
        DependencyError::PropertyNotFound { .. }
    ));
}

#[test]
fn test_validate_uses_declared_dependencies() {
    let koin = koin();
    assert!(koin.validate().is_ok());

    let incomplete = Koin::default();
    incomplete
        .load_modules([module(|m| {
            m.single_injectable::<OrderRepository>();
        })])
        .unwrap();

    let errors = incomplete.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
}

pub trait Notifier: Send + Sync {
    fn target(&self) -> String;
}

#[derive(Injectable)]
pub struct EmailNotifier {
    database: Arc<Database>,
}

impl Notifier for EmailNotifier {
    fn target(&self) -> String {
        format!("email via {}", self.database.url)
    }
}

#[test]
fn test_derived_type_bound_to_interface() {
    let koin = koin();
    koin.load_modules([module(|m| {
        m.single_injectable_as::<dyn Notifier, EmailNotifier>(|it| it);
        m.factory_injectable_as::<dyn Notifier, EmailNotifier>(|it| it)
            .named("fresh");
    })])
    .unwrap();

    let shared = koin.get::<dyn Notifier>().unwrap();
    assert!(Arc::ptr_eq(&shared, &koin.get::<dyn Notifier>().unwrap()));
    assert_eq!(shared.target(), "email via postgres://localhost/orders");

    let first = koin.get_named::<dyn Notifier>("fresh").unwrap();
    let second = koin.get_named::<dyn Notifier>("fresh").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    assert!(!koin.is_registered::<EmailNotifier>(None));
    assert!(koin.validate().is_ok());
}

#[test]
fn test_validate_follows_named_dependency() {
    let koin = Koin::default();
    koin.load_modules([module(|m| {
        m.single_injectable::<OrderService>();
        m.single_injectable::<OrderRepository>();
        m.single(|_| Ok(Arc::new(FileAudit) as Arc<dyn AuditLog>));
        m.single(|_| {
            Ok(Arc::new(Database {
                url: "postgres://localhost/orders".into(),
            }))
        });
    })])
    .unwrap();

    // 仅注册了无名的 AuditLog，而 OrderService 需要名为 "audit" 的定义
    let errors = koin.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].root_cause(),
        DependencyError::NoDefinitionFound { key } if key.name.as_deref() == Some("audit")
    ));
}
