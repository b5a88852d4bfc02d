use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use super::{StoreError, UniqueField};
use crate::models::user::User;

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at, updated_at";

/// Access to the `users` table.
#[derive(Clone)]
pub struct UserRepo {
    pool: SqlitePool,
}

impl UserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Reads only the stored password hash.
    pub async fn password_hash(&self, email: &str) -> Result<Option<String>, StoreError> {
        let hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(hash)
    }

    /// Inserts a user. The unique indexes on email and username are the
    /// authoritative guard; a violation comes back as `StoreError::Duplicate`.
    pub async fn insert(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, password_hash, created_at) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(user)
    }

    /// Replaces the stored hash and stamps `updated_at`. Returns whether a
    /// row was touched.
    pub async fn update_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE email = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(email)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            // SQLite reports the offending column, e.g. "UNIQUE constraint failed: users.email".
            let message = db_err.message();
            if message.contains("users.username") {
                return StoreError::Duplicate(UniqueField::Username);
            }
            if message.contains("users.email") {
                return StoreError::Duplicate(UniqueField::Email);
            }
        }
    }
    StoreError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store;

    async fn repo() -> UserRepo {
        UserRepo::new(store::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn insert_then_lookup() {
        let users = repo().await;
        let created = users.insert("a@x.com", "alice", "hash").await.unwrap();
        assert_eq!(created.email, "a@x.com");
        assert!(created.updated_at.is_none());

        let by_email = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.username, "alice");
        let by_name = users.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        assert!(users.email_exists("a@x.com").await.unwrap());
        assert!(!users.email_exists("A@x.com").await.unwrap());
        assert!(users.username_exists("alice").await.unwrap());
        assert_eq!(
            users.password_hash("a@x.com").await.unwrap().as_deref(),
            Some("hash")
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_the_store() {
        let users = repo().await;
        users.insert("a@x.com", "alice", "hash").await.unwrap();
        let err = users.insert("a@x.com", "bob", "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Email)));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_by_the_store() {
        let users = repo().await;
        users.insert("a@x.com", "alice", "hash").await.unwrap();
        let err = users.insert("b@x.com", "alice", "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Username)));
    }

    #[tokio::test]
    async fn update_password_hash_sets_updated_at() {
        let users = repo().await;
        users.insert("a@x.com", "alice", "old").await.unwrap();

        assert!(users.update_password_hash("a@x.com", "new").await.unwrap());
        let user = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new");
        assert!(user.updated_at.is_some());

        assert!(!users.update_password_hash("nobody@x.com", "new").await.unwrap());
    }
}
