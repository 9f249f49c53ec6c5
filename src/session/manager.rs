/// Session and refresh-token lifecycle orchestration
///
/// Composes the session and refresh-token stores into the flows the route
/// layer consumes: login, per-request authentication, token rotation, and
/// the three logout shapes. It owns no SQL of its own beyond opening the
/// transactions that keep login and rotation crash-consistent.
use crate::{
    config::AuthConfig,
    db::models::SessionRecord,
    db::now_ts,
    error::{ConsoleError, ConsoleResult},
    session::{
        refresh::RefreshTokenStore,
        secret::RawRefreshToken,
        store::SessionStore,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Result of a successful login: the new session plus the raw refresh
/// token. The raw value is handed to the client exactly once and never
/// stored in cleartext again.
pub struct NewLogin {
    pub session: SessionRecord,
    pub refresh_token: RawRefreshToken,
    pub refresh_expires_at: i64,
}

/// Result of a successful rotation: a fresh token bound to the same session.
pub struct RotatedTokens {
    pub session_id: String,
    pub user_id: String,
    pub refresh_token: RawRefreshToken,
    pub refresh_expires_at: i64,
}

pub struct SessionManager {
    db: SqlitePool,
    sessions: SessionStore,
    tokens: RefreshTokenStore,
    auth: Arc<AuthConfig>,
}

impl SessionManager {
    pub fn new(db: SqlitePool, auth: Arc<AuthConfig>) -> Self {
        Self {
            sessions: SessionStore::new(db.clone()),
            tokens: RefreshTokenStore::new(db.clone()),
            db,
            auth,
        }
    }

    /// Create a session plus its first refresh token for a user whose
    /// credentials have already been verified.
    pub async fn login(
        &self,
        user_id: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> ConsoleResult<NewLogin> {
        let refresh_token = RawRefreshToken::generate();
        let refresh_expires_at = now_ts() + self.auth.refresh_ttl_secs;

        let mut tx = self.db.begin().await.map_err(ConsoleError::Database)?;

        let session = SessionStore::create_on(
            &mut *tx,
            user_id,
            ip_address,
            user_agent,
            self.auth.session_ttl_secs,
        )
        .await?;

        RefreshTokenStore::store_on(
            &mut *tx,
            user_id,
            &session.id,
            &refresh_token,
            refresh_expires_at,
        )
        .await?;

        tx.commit().await.map_err(ConsoleError::Database)?;

        tracing::info!(
            session_id = %session.id,
            device = %session.device_info,
            "session created"
        );

        Ok(NewLogin {
            session,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Per-request liveness check, run after the bearer credential has been
    /// verified structurally. A null touch means the session was revoked
    /// server-side; the request is unauthenticated even though the
    /// credential itself was valid.
    pub async fn authenticate(&self, session_id: &str) -> ConsoleResult<SessionRecord> {
        self.sessions
            .touch(session_id)
            .await?
            .ok_or_else(ConsoleError::invalid_credentials)
    }

    /// Rotate a refresh token: revoke the presented one and mint a
    /// replacement bound to the same session.
    ///
    /// The revoke step is a single conditional update, so of two
    /// concurrent calls with the same still-valid secret exactly one
    /// performs the valid→revoked flip and proceeds; the loser gets the
    /// same generic authentication error as a token that was never valid.
    pub async fn refresh(&self, presented: &RawRefreshToken) -> ConsoleResult<RotatedTokens> {
        let mut tx = self.db.begin().await.map_err(ConsoleError::Database)?;

        let old = RefreshTokenStore::revoke_if_valid_on(&mut *tx, presented)
            .await?
            .ok_or_else(ConsoleError::invalid_credentials)?;

        let replacement = RawRefreshToken::generate();
        let refresh_expires_at = now_ts() + self.auth.refresh_ttl_secs;

        RefreshTokenStore::store_on(
            &mut *tx,
            &old.user_id,
            &old.session_id,
            &replacement,
            refresh_expires_at,
        )
        .await?;

        // The session must still be active for the rotation to stand
        SessionStore::touch_on(&mut *tx, &old.session_id)
            .await?
            .ok_or_else(ConsoleError::invalid_credentials)?;

        tx.commit().await.map_err(ConsoleError::Database)?;

        tracing::debug!(session_id = %old.session_id, "refresh token rotated");

        Ok(RotatedTokens {
            session_id: old.session_id,
            user_id: old.user_id,
            refresh_token: replacement,
            refresh_expires_at,
        })
    }

    /// Log out one device: deactivate the session and revoke its tokens.
    /// Both halves must run or a live refresh token would point at a dead
    /// session.
    pub async fn logout(&self, session_id: &str) -> ConsoleResult<()> {
        self.sessions.deactivate(session_id).await?;
        self.tokens.revoke_for_session(session_id).await?;

        tracing::info!(session_id = %session_id, "session logged out");
        Ok(())
    }

    /// Log out every other device, keeping the caller's session.
    pub async fn logout_others(&self, user_id: &str, keep_session_id: &str) -> ConsoleResult<u64> {
        let others: Vec<String> = self
            .sessions
            .list_active_for_user(user_id)
            .await?
            .into_iter()
            .filter(|s| s.id != keep_session_id)
            .map(|s| s.id)
            .collect();

        let count = self.sessions.deactivate_others(user_id, keep_session_id).await?;
        for session_id in &others {
            self.tokens.revoke_for_session(session_id).await?;
        }

        tracing::info!(count, "other sessions logged out");
        Ok(count)
    }

    /// Log out every device, the caller's included. Also the forced global
    /// logout path (password change): afterwards the user has zero valid
    /// sessions and zero valid refresh tokens.
    pub async fn logout_all(&self, user_id: &str) -> ConsoleResult<u64> {
        let count = self.sessions.deactivate_all(user_id).await?;
        self.tokens.revoke_for_user(user_id).await?;

        tracing::info!(count, "all sessions logged out");
        Ok(count)
    }

    /// Active sessions for the "your devices" view, most recent first.
    pub async fn list_sessions(&self, user_id: &str) -> ConsoleResult<Vec<SessionRecord>> {
        self.sessions.list_active_for_user(user_id).await
    }

    /// Store handles for the background sweep jobs.
    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn token_store(&self) -> &RefreshTokenStore {
        &self.tokens
    }
}
