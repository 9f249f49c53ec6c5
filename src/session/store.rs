/// Persistence operations for the `sessions` table
///
/// All mutations are WHERE-guarded conditional updates so that concurrent
/// calls stay idempotent: a second `deactivate` on an already-inactive row
/// affects zero rows instead of erroring or double-counting.
use crate::{
    db::models::SessionRecord,
    db::now_ts,
    error::{ConsoleError, ConsoleResult},
    session::{device, ids},
};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SessionStore {
    db: SqlitePool,
}

impl SessionStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new active session for the user.
    ///
    /// `ttl_secs` is the access-session lifetime; `expires_at` is set to
    /// `now + ttl_secs` and the row starts with `last_activity_at = now`.
    pub async fn create(
        &self,
        user_id: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        ttl_secs: i64,
    ) -> ConsoleResult<SessionRecord> {
        let mut conn = self.db.acquire().await.map_err(ConsoleError::Database)?;
        Self::create_on(&mut conn, user_id, ip_address, user_agent, ttl_secs).await
    }

    /// Transaction-aware variant of [`create`](Self::create).
    pub async fn create_on(
        conn: &mut SqliteConnection,
        user_id: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        ttl_secs: i64,
    ) -> ConsoleResult<SessionRecord> {
        let id = ids::generate(ids::IdKind::Session);
        let device_info = device::describe(user_agent);
        let now = now_ts();

        sqlx::query(
            "INSERT INTO sessions \
             (id, user_id, ip_address, user_agent, device_info, is_active, \
              last_activity_at, expires_at, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?6, ?6)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(ip_address)
        .bind(user_agent)
        .bind(&device_info)
        .bind(now)
        .bind(now + ttl_secs)
        .execute(&mut *conn)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(SessionRecord {
            id,
            user_id: user_id.to_string(),
            ip_address: ip_address.map(String::from),
            user_agent: user_agent.map(String::from),
            device_info,
            is_active: true,
            last_activity_at: now,
            expires_at: now + ttl_secs,
            created_at: now,
            updated_at: now,
        })
    }

    /// Record activity on a session, only if it is still active.
    ///
    /// Returns `None` for a deactivated session without mutating the row;
    /// a stale in-flight request cannot resurrect a revoked session.
    pub async fn touch(&self, session_id: &str) -> ConsoleResult<Option<SessionRecord>> {
        let mut conn = self.db.acquire().await.map_err(ConsoleError::Database)?;
        Self::touch_on(&mut conn, session_id).await
    }

    /// Transaction-aware variant of [`touch`](Self::touch).
    pub async fn touch_on(
        conn: &mut SqliteConnection,
        session_id: &str,
    ) -> ConsoleResult<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "UPDATE sessions SET last_activity_at = ?1, updated_at = ?1 \
             WHERE id = ?2 AND is_active = 1 \
             RETURNING id, user_id, ip_address, user_agent, device_info, is_active, \
                       last_activity_at, expires_at, created_at, updated_at",
        )
        .bind(now_ts())
        .bind(session_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(record)
    }

    /// Fetch a session iff it is active and unexpired.
    ///
    /// Expiry is computed at read time with a strict comparison, so a row
    /// the sweep has not yet deleted is still treated as absent here.
    pub async fn get_active(&self, session_id: &str) -> ConsoleResult<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, ip_address, user_agent, device_info, is_active, \
                    last_activity_at, expires_at, created_at, updated_at \
             FROM sessions WHERE id = ?1 AND is_active = 1 AND expires_at > ?2",
        )
        .bind(session_id)
        .bind(now_ts())
        .fetch_optional(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(record)
    }

    /// All active, unexpired sessions for a user, most recently active first.
    pub async fn list_active_for_user(&self, user_id: &str) -> ConsoleResult<Vec<SessionRecord>> {
        let records = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, ip_address, user_agent, device_info, is_active, \
                    last_activity_at, expires_at, created_at, updated_at \
             FROM sessions WHERE user_id = ?1 AND is_active = 1 AND expires_at > ?2 \
             ORDER BY last_activity_at DESC",
        )
        .bind(user_id)
        .bind(now_ts())
        .fetch_all(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(records)
    }

    /// Deactivate a session. Terminal; idempotent (second call affects 0 rows).
    pub async fn deactivate(&self, session_id: &str) -> ConsoleResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = 0, updated_at = ?1 \
             WHERE id = ?2 AND is_active = 1",
        )
        .bind(now_ts())
        .bind(session_id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Deactivate every active session for the user except one.
    pub async fn deactivate_others(
        &self,
        user_id: &str,
        keep_session_id: &str,
    ) -> ConsoleResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = 0, updated_at = ?1 \
             WHERE user_id = ?2 AND id != ?3 AND is_active = 1",
        )
        .bind(now_ts())
        .bind(user_id)
        .bind(keep_session_id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Deactivate every active session for the user, the caller's included.
    pub async fn deactivate_all(&self, user_id: &str) -> ConsoleResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = 0, updated_at = ?1 \
             WHERE user_id = ?2 AND is_active = 1",
        )
        .bind(now_ts())
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Hard-delete every session past its expiry, active flag irrelevant.
    /// Runs from the background sweep job, never from the request path.
    pub async fn sweep_expired(&self) -> ConsoleResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(now_ts())
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }
}
