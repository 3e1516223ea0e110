//! Tests for the tenant context carrier across tasks and threads.

use std::time::Duration;

use stratum_persistence::tenant::{TenantContext, TenantGuard, TenantId};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scopes_are_isolated() {
    let mut handles = Vec::new();
    for i in 0..100 {
        let tenant = TenantId::new(format!("tenant{}", i % 7));
        handles.push(tokio::spawn(TenantContext::scope_with(tenant.clone(), async move {
            for _ in 0..5 {
                tokio::task::yield_now().await;
                assert_eq!(TenantContext::current(), Some(tenant.clone()));
            }
        })));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_reused_worker_starts_empty() {
    tokio::spawn(TenantContext::scope_with(TenantId::new("tenant1"), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }))
    .await
    .unwrap();

    let seen = tokio::spawn(TenantContext::scope(async { TenantContext::current() }))
        .await
        .unwrap();
    assert_eq!(seen, None);
}

#[tokio::test]
async fn test_cleared_after_failure() {
    let result: Result<(), &str> = TenantContext::scope_with(TenantId::new("tenant1"), async {
        Err("handler failed")
    })
    .await;
    assert!(result.is_err());
    assert_eq!(TenantContext::current(), None);
}

#[tokio::test]
async fn test_panicking_task_leaves_nothing_behind() {
    let handle = tokio::spawn(TenantContext::scope_with(TenantId::new("tenant1"), async {
        if TenantContext::is_bound() {
            panic!("handler panicked");
        }
    }));
    assert!(handle.await.unwrap_err().is_panic());

    let seen = TenantContext::scope(async { TenantContext::current() }).await;
    assert_eq!(seen, None);
}

#[tokio::test]
async fn test_install_inside_scope_then_guard() {
    let seen = TenantContext::scope(async {
        assert!(!TenantContext::is_bound());
        let guard = TenantGuard::install(TenantId::new("tenant2")).unwrap();
        tokio::task::yield_now().await;
        let inside = TenantContext::current();
        drop(guard);
        (inside, TenantContext::current())
    })
    .await;
    assert_eq!(seen, (Some(TenantId::new("tenant2")), None));
}

#[tokio::test]
async fn test_blocking_worker_uses_thread_slot() {
    let seen = tokio::task::spawn_blocking(|| {
        TenantContext::sync_scope(TenantId::new("tenant1"), TenantContext::current)
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(seen, Some(TenantId::new("tenant1")));

    let after = tokio::task::spawn_blocking(TenantContext::current).await.unwrap();
    assert_eq!(after, None);
}

#[test]
fn test_threads_never_observe_each_other() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let tenant = TenantId::new(format!("tenant{}", i));
                TenantContext::sync_scope(tenant.clone(), || {
                    std::thread::sleep(Duration::from_millis(2));
                    TenantContext::current() == Some(tenant)
                })
                .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
