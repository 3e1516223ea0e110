//! Tests for tenant data isolation through the user store.

use std::sync::Arc;
use std::time::Duration;

use stratum_persistence::core::{MultiTenantConnectionProvider, UserStorage};
use stratum_persistence::error::{ResourceError, StorageError, TenantError};
use stratum_persistence::session::MultiTenancyConfig;
use stratum_persistence::tenant::{CurrentTenantResolver, TenantContext, TenantId};

use crate::common::{counting_store, seeded_data_source, statements_starting_with, store};

fn user_ids(users: Vec<stratum_persistence::User>) -> Vec<String> {
    users.into_iter().map(|u| u.user_id).collect()
}

// ============================================================================
// Routing
// ============================================================================

/// Scenario A: tenant1 reads tenant1's table.
#[tokio::test]
async fn test_list_users_hits_current_tenant_schema() {
    let data_source = seeded_data_source(4);
    let store = store(&data_source, &MultiTenancyConfig::default());

    let users = TenantContext::scope_with(TenantId::new("tenant1"), store.list_users())
        .await
        .unwrap();
    assert_eq!(user_ids(users), vec!["alice", "bob"]);

    let log = data_source.statements();
    assert_eq!(log[0].statement, "USE `tenant1`");
    assert!(log[1].statement.starts_with("SELECT"));
    assert_eq!(log[1].schema.as_deref(), Some("tenant1"));

    let users = TenantContext::scope_with(TenantId::new("tenant2"), store.list_users())
        .await
        .unwrap();
    assert_eq!(user_ids(users), vec!["carol"]);
}

#[tokio::test]
async fn test_resolver_and_provider_called_once_per_operation() {
    let data_source = seeded_data_source(4);
    let (store, resolver) = counting_store(&data_source);

    TenantContext::scope_with(TenantId::new("tenant1"), async {
        store.list_users().await.unwrap();
        store.update_user_password(2, "changed").await.unwrap();
    })
    .await;

    assert_eq!(resolver.calls(), 2);
    assert_eq!(statements_starting_with(&data_source, "USE").len(), 2);
    assert_eq!(data_source.stats().discarded, 2);
}

/// Re-checking an open session reads the bound tenant, not the resolver.
#[tokio::test]
async fn test_session_validation_does_not_resolve_again() {
    let data_source = seeded_data_source(4);
    let (store, resolver) = counting_store(&data_source);
    assert!(resolver.validate_existing_current_sessions());
    let sessions = store.sessions();

    TenantContext::scope_with(TenantId::new("tenant1"), async {
        let session = sessions.open_session().await.unwrap();
        assert!(sessions.verify_session(&session).is_ok());
        assert!(sessions.verify_session(&session).is_ok());
        sessions.close_session(session);
    })
    .await;

    assert_eq!(resolver.calls(), 1);
}

/// A session opened through the default tenant stays valid while nothing is bound.
#[tokio::test]
async fn test_default_tenant_session_passes_validation() {
    let data_source = seeded_data_source(4);
    let config = MultiTenancyConfig::new().with_default_tenant(TenantId::new("tenant2"));
    let store = store(&data_source, &config);
    let sessions = store.sessions();

    let session = sessions.open_session().await.unwrap();
    assert_eq!(session.tenant_id().as_str(), "tenant2");
    assert!(sessions.verify_session(&session).is_ok());
    sessions.close_session(session);
}

#[tokio::test]
async fn test_update_password_stays_in_tenant() {
    let data_source = seeded_data_source(4);
    let store = store(&data_source, &MultiTenancyConfig::default());

    let updated = TenantContext::scope_with(
        TenantId::new("tenant2"),
        store.update_user_password(1, "new-pw"),
    )
    .await
    .unwrap();

    assert_eq!(updated.user_id, "carol");
    assert_eq!(data_source.users("tenant2").unwrap()[0].user_pwd, "new-pw");
    assert_eq!(data_source.users("tenant1").unwrap()[0].user_pwd, "alice-pw");

    // Looked up, then written, on the one tenant connection.
    let log = data_source.statements();
    let steps: Vec<&str> = log.iter().map(|record| &record.statement[..6]).collect();
    assert_eq!(steps, vec!["USE `t", "SELECT", "UPDATE"]);
    assert!(log.iter().all(|record| record.connection_id == log[0].connection_id));
}

#[tokio::test]
async fn test_update_missing_user_is_not_found_and_session_closed() {
    let data_source = seeded_data_source(4);
    let store = store(&data_source, &MultiTenancyConfig::default());

    let err = TenantContext::scope_with(
        TenantId::new("tenant2"),
        store.update_user_password(2, "x"),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        StorageError::Resource(ResourceError::NotFound { .. })
    ));
    assert_eq!(err.to_string(), "user not found: 2");
    assert!(statements_starting_with(&data_source, "UPDATE").is_empty());

    let stats = data_source.stats();
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.discarded, 1);
}

/// Scenario D through the store: a missing schema fails before any query.
#[tokio::test]
async fn test_missing_schema_fails_without_query() {
    let data_source = seeded_data_source(4);
    data_source.create_schema("tenant3");
    data_source.drop_schema("tenant3");
    let store = store(&data_source, &MultiTenancyConfig::default());

    let err = TenantContext::scope_with(TenantId::new("tenant3"), store.list_users())
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Connection(_)));
    assert!(statements_starting_with(&data_source, "SELECT").is_empty());
    assert_eq!(data_source.stats().discarded, 1);
}

// ============================================================================
// Resolution policy
// ============================================================================

#[tokio::test]
async fn test_strict_resolution_fails_without_touching_pool() {
    let data_source = seeded_data_source(4);
    let store = store(&data_source, &MultiTenancyConfig::default());

    let err = store.list_users().await.unwrap_err();

    assert!(matches!(err, StorageError::Tenant(TenantError::Unbound)));
    assert_eq!(data_source.stats().created, 0);
}

#[tokio::test]
async fn test_default_tenant_fallback() {
    let data_source = seeded_data_source(4);
    let config = MultiTenancyConfig::new().with_default_tenant(TenantId::new("tenant2"));
    let store = store(&data_source, &config);

    let users = store.list_users().await.unwrap();
    assert_eq!(user_ids(users), vec!["carol"]);

    // A bound tenant still wins over the default.
    let users = TenantContext::scope_with(TenantId::new("tenant1"), store.list_users())
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
}

// ============================================================================
// Session validation
// ============================================================================

#[tokio::test]
async fn test_session_used_under_other_tenant_is_rejected() {
    let data_source = seeded_data_source(4);
    let store = store(&data_source, &MultiTenancyConfig::default());
    let sessions = store.sessions();

    let session = TenantContext::scope_with(TenantId::new("tenant1"), sessions.open_session())
        .await
        .unwrap();

    let err = TenantContext::scope_with(TenantId::new("tenant2"), async {
        sessions.verify_session(&session)
    })
    .await
    .unwrap_err();
    assert_eq!(
        err,
        TenantError::SessionMismatch {
            session_tenant: TenantId::new("tenant1"),
            current_tenant: TenantId::new("tenant2"),
        }
    );

    TenantContext::scope_with(TenantId::new("tenant1"), async {
        assert!(sessions.verify_session(&session).is_ok());
    })
    .await;

    sessions.close_session(session);
    assert_eq!(data_source.stats().discarded, 1);
}

#[tokio::test]
async fn test_session_validation_can_be_disabled() {
    let data_source = seeded_data_source(4);
    let config = MultiTenancyConfig::new().with_session_validation(false);
    let store = store(&data_source, &config);
    let sessions = store.sessions();

    let session = TenantContext::scope_with(TenantId::new("tenant1"), sessions.open_session())
        .await
        .unwrap();
    let result = TenantContext::scope_with(TenantId::new("tenant2"), async {
        sessions.verify_session(&session)
    })
    .await;

    assert!(result.is_ok());
    assert!(!sessions.provider().supports_aggressive_release());
}

// ============================================================================
// Concurrency and cancellation
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_cross_tenants() {
    let data_source = seeded_data_source(8);
    let store = Arc::new(store(&data_source, &MultiTenancyConfig::default()));

    let mut handles = Vec::new();
    for i in 0..64 {
        let store = Arc::clone(&store);
        let tenant = if i % 2 == 0 { "tenant1" } else { "tenant2" };
        handles.push(tokio::spawn(TenantContext::scope_with(
            TenantId::new(tenant),
            async move {
                tokio::task::yield_now().await;
                let users = store.list_users().await.unwrap();
                assert_eq!(TenantContext::current(), Some(TenantId::new(tenant)));
                (tenant, users.len())
            },
        )));
    }

    for handle in handles {
        let (tenant, count) = handle.await.unwrap();
        let expected = if tenant == "tenant1" { 2 } else { 1 };
        assert_eq!(count, expected, "wrong row count for {tenant}");
    }

    for record in data_source.statements() {
        if record.statement.starts_with("SELECT") {
            assert!(record.schema.is_some());
        }
    }
    let stats = data_source.stats();
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.returned, 0);
}

#[tokio::test]
async fn test_cancelled_operation_leaks_nothing() {
    let data_source = seeded_data_source(1);
    let store = store(&data_source, &MultiTenancyConfig::default());

    // Occupy the only connection so the operation blocks on the pool.
    let blocker = TenantContext::scope_with(TenantId::new("tenant1"), store.sessions().open_session())
        .await
        .unwrap();

    let pending = TenantContext::scope_with(TenantId::new("tenant2"), store.list_users());
    let outcome = tokio::time::timeout(Duration::from_millis(10), pending).await;
    assert!(outcome.is_err());

    assert_eq!(TenantContext::current(), None);
    assert_eq!(data_source.stats().in_use, 1);

    store.sessions().close_session(blocker);
    assert_eq!(data_source.stats().in_use, 0);
}
