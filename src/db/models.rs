/// Row types for the console database
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User account record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Session record: one authenticated device/browser context.
///
/// `is_active` is a soft-delete marker; deactivation is terminal and a row
/// is never reactivated. An expired row may still carry `is_active = 1`
/// until the sweep job deletes it, which is why liveness is computed at
/// read time rather than from the flag alone.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: String,
    pub is_active: bool,
    pub last_activity_at: i64,
    pub expires_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Tagged session liveness, derived from the two persisted fields so
/// callers never re-combine `is_active` and `expires_at` by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Expired,
    Terminated,
}

impl SessionRecord {
    /// Liveness at the given instant. Deactivation wins over expiry.
    pub fn state(&self, now: i64) -> SessionState {
        if !self.is_active {
            SessionState::Terminated
        } else if self.expires_at <= now {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }
}

/// Refresh token record. Only the SHA-256 digest of the secret is stored;
/// the raw value is handed to the client once at mint time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub token_hash: String,
    pub is_revoked: bool,
    pub revoked_at: Option<i64>,
    pub expires_at: i64,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(is_active: bool, expires_at: i64) -> SessionRecord {
        SessionRecord {
            id: "sess_test".to_string(),
            user_id: "user_test".to_string(),
            ip_address: None,
            user_agent: None,
            device_info: "unknown".to_string(),
            is_active,
            last_activity_at: 0,
            expires_at,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn state_is_active_only_before_expiry() {
        let s = session(true, 100);
        assert_eq!(s.state(99), SessionState::Active);
        // Strict comparison: expiring exactly now is already expired
        assert_eq!(s.state(100), SessionState::Expired);
        assert_eq!(s.state(101), SessionState::Expired);
    }

    #[test]
    fn deactivation_wins_over_expiry() {
        let s = session(false, 100);
        assert_eq!(s.state(50), SessionState::Terminated);
        assert_eq!(s.state(200), SessionState::Terminated);
    }
}
