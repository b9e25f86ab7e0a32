//! 多任务并发场景下的解析引擎集成测试
use di_abstractions::{module, parameters, Module};
use di_common::DependencyError;
use di_impl::Koin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct ConnectionPool {
    size: usize,
}

#[derive(Debug)]
struct RequestContext {
    request_id: String,
}

#[derive(Debug)]
struct Handler {
    pool: Arc<ConnectionPool>,
    context: Arc<RequestContext>,
}

fn app_module(pools_created: Arc<AtomicUsize>) -> Module {
    let mut module = Module::new();
    module.single(move |_| {
        pools_created.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(10));
        Ok(Arc::new(ConnectionPool { size: 16 }))
    });
    module.scope("request", |scope| {
        scope.scoped(|ctx| {
            Ok(Arc::new(RequestContext {
                request_id: ctx.param::<String>(0)?,
            }))
        });
    });
    module.factory(|ctx| {
        Ok(Arc::new(Handler {
            pool: ctx.get()?,
            context: ctx.get()?,
        }))
    });
    module
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_share_single() -> anyhow::Result<()> {
    let pools_created = Arc::new(AtomicUsize::new(0));
    let koin = Arc::new(Koin::default());
    koin.load_modules([app_module(pools_created.clone())])?;

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let koin = koin.clone();
            tokio::task::spawn_blocking(move || koin.get::<ConnectionPool>())
        })
        .collect();

    let mut pools = Vec::new();
    for task in tasks {
        pools.push(task.await??);
    }

    assert_eq!(pools_created.load(Ordering::SeqCst), 1);
    assert!(pools.iter().all(|p| Arc::ptr_eq(p, &pools[0])));
    assert_eq!(pools[0].size, 16);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_scopes_are_isolated() -> anyhow::Result<()> {
    let koin = Arc::new(Koin::default());
    koin.load_modules([app_module(Arc::new(AtomicUsize::new(0)))])?;

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let koin = koin.clone();
            tokio::task::spawn_blocking(move || -> Result<(String, String), DependencyError> {
                let scope_id = format!("request-{i}");
                let scope = koin.create_scope(&scope_id, Some("request"))?;
                let context: Arc<RequestContext> =
                    koin.resolve(None, Some(&scope), parameters![scope_id.clone()])?;
                let handler = koin.get_scoped::<Handler>(&scope)?;
                assert!(Arc::ptr_eq(&context, &handler.context));
                koin.delete_scope(&scope_id)?;
                Ok((scope_id, handler.context.request_id.clone()))
            })
        })
        .collect();

    for task in tasks {
        let (scope_id, request_id) = task.await??;
        assert_eq!(scope_id, request_id);
    }

    assert!(koin.active_scope_ids().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_lazy_handle_across_tasks() -> anyhow::Result<()> {
    let koin = Arc::new(Koin::default());
    koin.load_modules([module(|m| {
        m.single(|_| Ok(Arc::new(ConnectionPool { size: 4 })));
    })])?;

    let lazy = Arc::new(koin.inject::<ConnectionPool>());
    let handle = {
        let lazy = lazy.clone();
        tokio::spawn(async move { lazy.get() })
    };

    let from_task = handle.await??;
    let direct = koin.get::<ConnectionPool>()?;
    assert!(Arc::ptr_eq(&from_task, &direct));
    assert!(lazy.is_initialized());
    Ok(())
}
