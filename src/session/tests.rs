//! Lifecycle tests over a real (temporary) SQLite database.

use crate::{
    config::AuthConfig,
    db::{self, models::SessionState, now_ts},
    session::{
        refresh::RefreshTokenStore,
        secret::RawRefreshToken,
        store::SessionStore,
        SessionManager,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = db::create_pool(&dir.path().join("test.sqlite"), db::DatabaseOptions::default())
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    (dir, pool)
}

async fn insert_user(pool: &SqlitePool, id: &str) {
    let now = now_ts();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, display_name, created_at, updated_at) \
         VALUES (?1, ?2, 'x', NULL, ?3, ?3)",
    )
    .bind(id)
    .bind(format!("{}@example.com", id))
    .bind(now)
    .execute(pool)
    .await
    .unwrap();
}

fn manager(pool: &SqlitePool) -> SessionManager {
    SessionManager::new(
        pool.clone(),
        Arc::new(AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            session_ttl_secs: 3600,
            refresh_ttl_secs: 86400,
        }),
    )
}

#[tokio::test]
async fn deactivate_is_idempotent() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let store = SessionStore::new(pool.clone());

    let session = store.create("user_a", None, None, 3600).await.unwrap();

    assert_eq!(store.deactivate(&session.id).await.unwrap(), 1);
    assert_eq!(store.deactivate(&session.id).await.unwrap(), 0);
    assert_eq!(store.deactivate("sess_never_existed").await.unwrap(), 0);
}

#[tokio::test]
async fn touch_after_deactivate_is_a_noop() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let store = SessionStore::new(pool.clone());

    let session = store.create("user_a", None, None, 3600).await.unwrap();
    store.deactivate(&session.id).await.unwrap();

    assert!(store.touch(&session.id).await.unwrap().is_none());

    // last_activity_at must not have moved
    let last_activity: i64 =
        sqlx::query_scalar("SELECT last_activity_at FROM sessions WHERE id = ?1")
            .bind(&session.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(last_activity, session.last_activity_at);
}

#[tokio::test]
async fn touch_refreshes_activity_on_live_sessions() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let store = SessionStore::new(pool.clone());

    let session = store.create("user_a", None, Some(CHROME_MAC), 3600).await.unwrap();
    assert_eq!(session.device_info, "Chrome on macOS (desktop)");

    let touched = store.touch(&session.id).await.unwrap().unwrap();
    assert!(touched.last_activity_at >= session.last_activity_at);
    assert_eq!(touched.state(now_ts()), SessionState::Active);
}

#[tokio::test]
async fn expiry_boundary_is_strict() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let sessions = SessionStore::new(pool.clone());
    let tokens = RefreshTokenStore::new(pool.clone());

    // expires_at == now is already expired for the read path
    let session = sessions.create("user_a", None, None, 0).await.unwrap();
    assert!(sessions.get_active(&session.id).await.unwrap().is_none());

    // same strict comparison for refresh tokens
    let raw = RawRefreshToken::generate();
    tokens
        .store("user_a", &session.id, &raw, now_ts())
        .await
        .unwrap();
    assert!(tokens.validate(&raw).await.unwrap().is_none());
}

#[tokio::test]
async fn stored_token_validates_only_with_its_own_secret() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let sessions = SessionStore::new(pool.clone());
    let tokens = RefreshTokenStore::new(pool.clone());

    let session = sessions.create("user_a", None, None, 3600).await.unwrap();
    let raw = RawRefreshToken::generate();
    tokens
        .store("user_a", &session.id, &raw, now_ts() + 3600)
        .await
        .unwrap();

    let found = tokens.validate(&raw).await.unwrap().unwrap();
    assert_eq!(found.session_id, session.id);

    let other = RawRefreshToken::generate();
    assert!(tokens.validate(&other).await.unwrap().is_none());
}

#[tokio::test]
async fn rotation_produces_exactly_one_winner() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let mgr = manager(&pool);

    let login = mgr.login("user_a", None, None).await.unwrap();
    let stale = login.refresh_token.clone();

    // Two concurrent rotations with the identical still-valid secret
    let (a, b) = tokio::join!(mgr.refresh(&stale), mgr.refresh(&stale));
    assert!(
        a.is_ok() != b.is_ok(),
        "exactly one rotation must win, got a={:?} b={:?}",
        a.is_ok(),
        b.is_ok()
    );

    // Exactly one unrevoked, unexpired token remains for the session
    let valid_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM refresh_tokens \
         WHERE session_id = ?1 AND is_revoked = 0 AND expires_at > ?2",
    )
    .bind(&login.session.id)
    .bind(now_ts())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(valid_count, 1);

    // A third attempt with the stale secret fails like any invalid token
    assert!(mgr.refresh(&stale).await.is_err());
}

#[tokio::test]
async fn rotation_binds_replacement_to_the_same_session() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let mgr = manager(&pool);

    let login = mgr.login("user_a", None, None).await.unwrap();
    let rotated = mgr.refresh(&login.refresh_token).await.unwrap();

    assert_eq!(rotated.session_id, login.session.id);
    assert_eq!(rotated.user_id, "user_a");

    // The new secret works, the old one does not
    assert!(mgr.refresh(&login.refresh_token).await.is_err());
    assert!(mgr.refresh(&rotated.refresh_token).await.is_ok());
}

#[tokio::test]
async fn refresh_fails_once_the_session_is_logged_out() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let mgr = manager(&pool);

    let login = mgr.login("user_a", None, None).await.unwrap();
    mgr.logout(&login.session.id).await.unwrap();

    // Logout revoked the session's tokens; the pair dies together
    assert!(mgr.refresh(&login.refresh_token).await.is_err());
    assert!(mgr.authenticate(&login.session.id).await.is_err());
}

#[tokio::test]
async fn logout_all_leaves_zero_valid_state() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let mgr = manager(&pool);

    let logins = vec![
        mgr.login("user_a", None, None).await.unwrap(),
        mgr.login("user_a", None, None).await.unwrap(),
        mgr.login("user_a", None, None).await.unwrap(),
    ];
    assert_eq!(mgr.list_sessions("user_a").await.unwrap().len(), 3);

    assert_eq!(mgr.logout_all("user_a").await.unwrap(), 3);

    assert!(mgr.list_sessions("user_a").await.unwrap().is_empty());
    let tokens = RefreshTokenStore::new(pool.clone());
    for login in &logins {
        assert!(tokens.validate(&login.refresh_token).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn logout_others_keeps_only_the_caller() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let mgr = manager(&pool);

    let keep = mgr.login("user_a", None, None).await.unwrap();
    let other = mgr.login("user_a", None, None).await.unwrap();

    assert_eq!(mgr.logout_others("user_a", &keep.session.id).await.unwrap(), 1);

    let remaining = mgr.list_sessions("user_a").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.session.id);

    // The evicted session's refresh token is dead, the kept one still works
    assert!(mgr.refresh(&other.refresh_token).await.is_err());
    assert!(mgr.refresh(&keep.refresh_token).await.is_ok());
}

#[tokio::test]
async fn sweep_retention_asymmetry() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let sessions = SessionStore::new(pool.clone());
    let tokens = RefreshTokenStore::new(pool.clone());

    // Parent session kept alive so cascade deletion does not interfere
    let session = sessions.create("user_a", None, None, 3600).await.unwrap();

    let expired_only = RawRefreshToken::generate();
    tokens
        .store("user_a", &session.id, &expired_only, now_ts() - 10)
        .await
        .unwrap();

    let expired_revoked = RawRefreshToken::generate();
    tokens
        .store("user_a", &session.id, &expired_revoked, now_ts() - 10)
        .await
        .unwrap();
    assert_eq!(tokens.revoke(&expired_revoked).await.unwrap(), 1);

    let swept = tokens.sweep().await.unwrap();
    assert_eq!(swept, 1);

    // The expired-but-unrevoked row survives for the audit trail
    let remaining: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM refresh_tokens WHERE session_id = ?1",
    )
    .bind(&session.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn session_sweep_deletes_expired_rows_regardless_of_flag() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let sessions = SessionStore::new(pool.clone());

    let _expired_active = sessions.create("user_a", None, None, 0).await.unwrap();
    let expired_inactive = sessions.create("user_a", None, None, 0).await.unwrap();
    sessions.deactivate(&expired_inactive.id).await.unwrap();
    let live = sessions.create("user_a", None, None, 3600).await.unwrap();

    assert_eq!(sessions.sweep_expired().await.unwrap(), 2);

    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM sessions")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(ids, vec![live.id]);
}

#[tokio::test]
async fn revoking_an_already_dead_token_is_harmless() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let sessions = SessionStore::new(pool.clone());
    let tokens = RefreshTokenStore::new(pool.clone());

    let session = sessions.create("user_a", None, None, 3600).await.unwrap();
    let raw = RawRefreshToken::generate();
    tokens
        .store("user_a", &session.id, &raw, now_ts() + 3600)
        .await
        .unwrap();

    assert_eq!(tokens.revoke(&raw).await.unwrap(), 1);
    assert_eq!(tokens.revoke(&raw).await.unwrap(), 0);
    assert_eq!(tokens.revoke(&RawRefreshToken::generate()).await.unwrap(), 0);
}

#[tokio::test]
async fn authenticate_treats_revoked_sessions_as_unauthenticated() {
    let (_dir, pool) = test_pool().await;
    insert_user(&pool, "user_a").await;
    let mgr = manager(&pool);

    let login = mgr.login("user_a", None, None).await.unwrap();
    assert!(mgr.authenticate(&login.session.id).await.is_ok());

    mgr.logout(&login.session.id).await.unwrap();
    assert!(mgr.authenticate(&login.session.id).await.is_err());
}
