//! Users and roles on the `users` table.

use async_trait::async_trait;
use sqlx::SqlitePool;

use kardex_core::types::{Role, User};

use crate::contracts::UserStore;
use crate::error::{StoreError, StoreResult};

/// SQLite implementation of [`UserStore`].
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteUserStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
    role: String,
}

impl UserRow {
    fn into_user(self) -> StoreResult<User> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::corrupt("user", format!("unknown role '{}'", self.role)))?;
        Ok(User {
            username: self.username,
            password_hash: self.password_hash,
            role,
        })
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn save(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO UPDATE SET
                password_hash = excluded.password_hash,
                role = excluded.role
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, username: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT username, password_hash, role FROM users WHERE username = ?1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT username, password_hash, role FROM users ORDER BY username")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn delete(&self, username: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
