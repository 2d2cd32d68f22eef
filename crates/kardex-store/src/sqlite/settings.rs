//! Per-user preferences on the `settings` table.

use async_trait::async_trait;
use sqlx::SqlitePool;

use kardex_core::types::Settings;

use crate::contracts::SettingsStore;
use crate::error::StoreResult;

/// SQLite implementation of [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSettingsStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    username: String,
    theme: String,
    low_stock_threshold: i64,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Settings {
            username: row.username,
            theme: row.theme,
            low_stock_threshold: row.low_stock_threshold,
        }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn save(&self, settings: &Settings) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (username, theme, low_stock_threshold)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO UPDATE SET
                theme = excluded.theme,
                low_stock_threshold = excluded.low_stock_threshold
            "#,
        )
        .bind(&settings.username)
        .bind(&settings.theme)
        .bind(settings.low_stock_threshold)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, username: &str) -> StoreResult<Option<Settings>> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT username, theme, low_stock_threshold FROM settings WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Settings::from))
    }

    async fn delete(&self, username: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{Database, DbConfig};

    #[tokio::test]
    async fn save_get_delete_round_trip() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        let store = SqliteSettingsStore::new(db.pool().clone());

        assert!(store.get("ana").await.unwrap().is_none());

        let mut prefs = Settings::for_user("ana");
        prefs.low_stock_threshold = 3;
        store.save(&prefs).await.unwrap();

        let loaded = store.get("ana").await.unwrap().unwrap();
        assert_eq!(loaded.theme, "dark");
        assert_eq!(loaded.low_stock_threshold, 3);

        assert!(store.delete("ana").await.unwrap());
        assert!(!store.delete("ana").await.unwrap());
    }
}
