/// Account manager implementation using runtime queries
use crate::{
    db::models::UserRecord,
    db::now_ts,
    error::{ConsoleError, ConsoleResult},
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
}

impl AccountManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new account
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> ConsoleResult<UserRecord> {
        self.validate_email(email)?;
        self.validate_password(password)?;

        if self.email_exists(email).await? {
            return Err(ConsoleError::Conflict("Email already registered".to_string()));
        }

        let password_hash = Self::hash_password(password)?;
        let id = format!("user_{}", Uuid::now_v7().simple());
        let now = now_ts();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, display_name, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .bind(&id)
        .bind(email)
        .bind(&password_hash)
        .bind(display_name)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(UserRecord {
            id,
            email: email.to_string(),
            password_hash,
            display_name: display_name.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Verify an email/password pair, returning the account on success.
    ///
    /// "No such user" and "wrong password" both surface as the same
    /// authentication error.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> ConsoleResult<UserRecord> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or_else(ConsoleError::invalid_credentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(ConsoleError::invalid_credentials());
        }

        Ok(user)
    }

    /// Change the account password. The caller is responsible for forcing
    /// a global logout afterwards so no session outlives the old secret.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> ConsoleResult<()> {
        self.validate_password(new_password)?;

        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(ConsoleError::invalid_credentials)?;

        if !Self::verify_password(current_password, &user.password_hash)? {
            return Err(ConsoleError::invalid_credentials());
        }

        let password_hash = Self::hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(&password_hash)
            .bind(now_ts())
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(())
    }

    /// Change the account email after re-verifying the password.
    pub async fn change_email(
        &self,
        user_id: &str,
        password: &str,
        new_email: &str,
    ) -> ConsoleResult<()> {
        self.validate_email(new_email)?;

        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(ConsoleError::invalid_credentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(ConsoleError::invalid_credentials());
        }

        if self.email_exists(new_email).await? {
            return Err(ConsoleError::Conflict("Email already registered".to_string()));
        }

        sqlx::query("UPDATE users SET email = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(new_email)
            .bind(now_ts())
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(())
    }

    /// Get account by id
    pub async fn get_by_id(&self, user_id: &str) -> ConsoleResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, display_name, created_at, updated_at \
             FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> ConsoleResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, display_name, created_at, updated_at \
             FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> ConsoleResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(count > 0)
    }

    fn hash_password(password: &str) -> ConsoleResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ConsoleError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(password: &str, hash: &str) -> ConsoleResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ConsoleError::Internal(format!("Corrupt password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn validate_email(&self, email: &str) -> ConsoleResult<()> {
        if email.len() < 3 || email.len() > 254 || !email.contains('@') {
            return Err(ConsoleError::Validation("Invalid email address".to_string()));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> ConsoleResult<()> {
        if password.len() < 8 {
            return Err(ConsoleError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashing_round_trips() {
        let hash = AccountManager::hash_password("correct horse battery").unwrap();
        assert!(AccountManager::verify_password("correct horse battery", &hash).unwrap());
        assert!(!AccountManager::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = AccountManager::hash_password("same-password").unwrap();
        let b = AccountManager::hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
