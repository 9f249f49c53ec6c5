/// Persistence operations for the `refresh_tokens` table
///
/// Lookups are always by SHA-256 digest; a raw secret never appears in a
/// query predicate or a log line. Revocation flags rows rather than
/// deleting them, so a used token leaves evidence until the sweep.
use crate::{
    db::models::RefreshTokenRecord,
    db::now_ts,
    error::{ConsoleError, ConsoleResult},
    session::ids,
    session::secret::RawRefreshToken,
};
use sqlx::{SqliteConnection, SqlitePool};

pub struct RefreshTokenStore {
    db: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new unrevoked token bound to a session.
    pub async fn store(
        &self,
        user_id: &str,
        session_id: &str,
        raw: &RawRefreshToken,
        expires_at: i64,
    ) -> ConsoleResult<RefreshTokenRecord> {
        let mut conn = self.db.acquire().await.map_err(ConsoleError::Database)?;
        Self::store_on(&mut conn, user_id, session_id, raw, expires_at).await
    }

    /// Transaction-aware variant of [`store`](Self::store).
    pub async fn store_on(
        conn: &mut SqliteConnection,
        user_id: &str,
        session_id: &str,
        raw: &RawRefreshToken,
        expires_at: i64,
    ) -> ConsoleResult<RefreshTokenRecord> {
        let id = ids::generate(ids::IdKind::RefreshToken);
        let hash = raw.digest();
        let now = now_ts();

        sqlx::query(
            "INSERT INTO refresh_tokens \
             (id, user_id, session_id, token_hash, is_revoked, revoked_at, expires_at, created_at) \
             VALUES (?1, ?2, ?3, ?4, 0, NULL, ?5, ?6)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(session_id)
        .bind(hash.as_str())
        .bind(expires_at)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(RefreshTokenRecord {
            id,
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            token_hash: hash.as_str().to_string(),
            is_revoked: false,
            revoked_at: None,
            expires_at,
            created_at: now,
        })
    }

    /// Look up a presented token by digest; `Some` only while it is both
    /// unrevoked and unexpired (strict comparison). This is the sole
    /// authentication check for the refresh flow.
    pub async fn validate(&self, raw: &RawRefreshToken) -> ConsoleResult<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT id, user_id, session_id, token_hash, is_revoked, revoked_at, \
                    expires_at, created_at \
             FROM refresh_tokens \
             WHERE token_hash = ?1 AND is_revoked = 0 AND expires_at > ?2",
        )
        .bind(raw.digest().as_str())
        .bind(now_ts())
        .fetch_optional(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(record)
    }

    /// Flag the matching row revoked, whatever its prior validity.
    /// Revoking an already-revoked or unknown token affects 0 rows.
    pub async fn revoke(&self, raw: &RawRefreshToken) -> ConsoleResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1, revoked_at = ?1 \
             WHERE token_hash = ?2 AND is_revoked = 0",
        )
        .bind(now_ts())
        .bind(raw.digest().as_str())
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Atomically revoke the token iff it is still valid, returning the row
    /// that was flipped.
    ///
    /// This single conditional update is what serializes concurrent
    /// rotations: of two requests presenting the same still-valid secret,
    /// only the one whose update returns a row performed the valid→revoked
    /// transition and may mint a replacement.
    pub async fn revoke_if_valid_on(
        conn: &mut SqliteConnection,
        raw: &RawRefreshToken,
    ) -> ConsoleResult<Option<RefreshTokenRecord>> {
        let now = now_ts();

        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "UPDATE refresh_tokens SET is_revoked = 1, revoked_at = ?1 \
             WHERE token_hash = ?2 AND is_revoked = 0 AND expires_at > ?1 \
             RETURNING id, user_id, session_id, token_hash, is_revoked, revoked_at, \
                       expires_at, created_at",
        )
        .bind(now)
        .bind(raw.digest().as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(record)
    }

    /// Revoke every currently-unrevoked token for a session. Called when a
    /// session is deactivated so no refresh token outlives it.
    pub async fn revoke_for_session(&self, session_id: &str) -> ConsoleResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1, revoked_at = ?1 \
             WHERE session_id = ?2 AND is_revoked = 0",
        )
        .bind(now_ts())
        .bind(session_id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Revoke every currently-unrevoked token for a user (global logout,
    /// password change).
    pub async fn revoke_for_user(&self, user_id: &str) -> ConsoleResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1, revoked_at = ?1 \
             WHERE user_id = ?2 AND is_revoked = 0",
        )
        .bind(now_ts())
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Hard-delete rows that are both revoked and past expiry.
    ///
    /// Expired-but-unrevoked rows are deliberately retained: a token that
    /// aged out without ever being rotated or revoked stays visible for
    /// audit until its parent session is swept.
    pub async fn sweep(&self) -> ConsoleResult<u64> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE is_revoked = 1 AND expires_at <= ?1")
                .bind(now_ts())
                .execute(&self.db)
                .await
                .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }
}
