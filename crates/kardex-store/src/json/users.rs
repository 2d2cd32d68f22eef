//! Users and roles on `users.json`.

use std::path::Path;

use async_trait::async_trait;

use kardex_core::types::User;

use crate::contracts::UserStore;
use crate::error::StoreResult;
use crate::json::{ensure_dir, FamilyFile};

/// JSON flat-file implementation of [`UserStore`].
pub struct JsonUserStore {
    file: FamilyFile<User>,
}

impl JsonUserStore {
    pub async fn open(dir: &Path) -> StoreResult<Self> {
        ensure_dir(dir).await?;
        Ok(JsonUserStore {
            file: FamilyFile::new(dir, "users.json", "user"),
        })
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn save(&self, user: &User) -> StoreResult<()> {
        let record = user.clone();
        self.file
            .update(move |users| {
                match users.iter_mut().find(|u| u.username == record.username) {
                    Some(existing) => *existing = record,
                    None => {
                        users.push(record);
                        users.sort_by(|a, b| a.username.cmp(&b.username));
                    }
                }
                Ok(())
            })
            .await
    }

    async fn get(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.file.load().await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let mut users = self.file.load().await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn delete(&self, username: &str) -> StoreResult<bool> {
        let username = username.to_string();
        self.file
            .update(move |users| {
                let before = users.len();
                users.retain(|u| u.username != username);
                Ok(users.len() != before)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kardex_core::types::Role;

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kardex-users-{}", uuid::Uuid::new_v4().simple()))
    }

    fn user(username: &str, role: Role) -> User {
        User {
            username: username.to_string(),
            password_hash: "$argon2id$test".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn upsert_and_role_change_round_trip() {
        let store = JsonUserStore::open(&scratch_dir()).await.unwrap();

        store.save(&user("ana", Role::Operator)).await.unwrap();
        store.save(&user("ana", Role::Admin)).await.unwrap();

        let stored = store.get("ana").await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let store = JsonUserStore::open(&scratch_dir()).await.unwrap();
        store.save(&user("ana", Role::Operator)).await.unwrap();

        assert!(store.delete("ana").await.unwrap());
        assert!(!store.delete("ana").await.unwrap());
    }
}
