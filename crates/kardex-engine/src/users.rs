//! # User Service
//!
//! Accounts, roles and per-user preferences. Every mutation goes through
//! the guard in `kardex_core::guard`; every guard rejection that crosses
//! the protected-role boundary is recorded as a Security audit event, so
//! the trail shows the attempt, not just the absence of the change.
//!
//! ## Credential Handling
//! Passwords are hashed with Argon2id and stored as PHC strings;
//! verification never compares plain text. Authentication failures are
//! reported as `InvalidCredentials` without distinguishing a wrong
//! username from a wrong password.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::{info, warn};

use kardex_core::types::{AuditKind, Role, Settings, User};
use kardex_core::{guard, validation, CoreError};
use kardex_store::{SettingsStore, UserStore};

use crate::audit::AuditRecorder;
use crate::error::{EngineError, EngineResult};

// =============================================================================
// User Service
// =============================================================================

#[derive(Clone)]
pub struct Users {
    store: Arc<dyn UserStore>,
    settings: Arc<dyn SettingsStore>,
    audit: AuditRecorder,
}

impl Users {
    pub fn new(
        store: Arc<dyn UserStore>,
        settings: Arc<dyn SettingsStore>,
        audit: AuditRecorder,
    ) -> Self {
        Users {
            store,
            settings,
            audit,
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    pub async fn get_user(&self, username: &str) -> EngineResult<User> {
        self.store
            .get(username)
            .await?
            .ok_or_else(|| CoreError::UnknownUser(username.to_string()).into())
    }

    pub async fn list_users(&self) -> EngineResult<Vec<User>> {
        Ok(self.store.list().await?)
    }

    /// Writes the pre-provisioned protected account directly, bypassing
    /// the guard. Refused once any protected account exists: seeding is
    /// the only path that may ever produce one, and it runs once.
    pub async fn seed_protected(&self, user: &User) -> EngineResult<User> {
        debug_assert!(user.role.is_protected());

        let all = self.store.list().await?;
        if let Some(existing) = all.iter().find(|u| u.role.is_protected()) {
            return Err(CoreError::protected(
                &existing.username,
                "a protected account already exists",
            )
            .into());
        }

        self.store.save(user).await?;
        info!(username = %user.username, "Protected account provisioned");
        self.audit
            .success(
                &user.username,
                AuditKind::System,
                &user.username,
                "Protected account provisioned",
            )
            .await;
        Ok(user.clone())
    }

    /// Creates a user. The protected role can never be granted here; the
    /// single protected account is pre-seeded.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        actor: &str,
    ) -> EngineResult<User> {
        // Normalized once here; validation, the guard, the duplicate
        // lookup and the stored record must all see the same key, or a
        // whitespace variant slips past the duplicate check and the
        // upsert overwrites the existing account.
        let username = username.trim();
        validation::validate_username(username)?;
        validation::validate_password(password)?;

        if let Err(e) = guard::check_assign(username, role) {
            self.security_reject(actor, username, &e).await;
            return Err(e.into());
        }

        if self.store.get(username).await?.is_some() {
            return Err(CoreError::DuplicateUser(username.to_string()).into());
        }

        let user = User {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role,
        };
        self.store.save(&user).await?;

        info!(username = %user.username, role = %user.role, "User created");
        self.audit
            .success(
                actor,
                AuditKind::User,
                &user.username,
                format!("Created user '{}' with role {}", user.username, user.role),
            )
            .await;
        Ok(user)
    }

    /// Deletes a user, subject to the guard: never the protected account,
    /// never yourself, never the last admin. Their settings go too.
    pub async fn delete_user(&self, username: &str, actor: &str) -> EngineResult<()> {
        let target = self.get_user(username).await?;
        let all = self.store.list().await?;

        if let Err(e) = guard::check_delete(actor, &target, &all) {
            if e.is_security_relevant() {
                self.security_reject(actor, username, &e).await;
            }
            return Err(e.into());
        }

        self.store.delete(username).await?;
        self.settings.delete(username).await?;

        self.audit
            .success(
                actor,
                AuditKind::User,
                username,
                format!("Deleted user '{username}'"),
            )
            .await;
        Ok(())
    }

    /// Changes a user's role, subject to the guard.
    pub async fn change_role(
        &self,
        username: &str,
        new_role: Role,
        actor: &str,
    ) -> EngineResult<User> {
        let mut target = self.get_user(username).await?;
        let all = self.store.list().await?;

        if let Err(e) = guard::check_change(&target, new_role, &all) {
            if e.is_security_relevant() {
                self.security_reject(actor, username, &e).await;
            }
            return Err(e.into());
        }

        let old_role = target.role;
        target.role = new_role;
        self.store.save(&target).await?;

        self.audit
            .success(
                actor,
                AuditKind::User,
                username,
                format!("Changed role of '{username}': {old_role} -> {new_role}"),
            )
            .await;
        Ok(target)
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    /// Verifies a username/password pair. Failed attempts are recorded as
    /// Security events; the error stays deliberately vague.
    pub async fn authenticate(&self, username: &str, password: &str) -> EngineResult<User> {
        let user = match self.store.get(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login attempt for unknown user");
                self.audit
                    .rejected(username, AuditKind::Security, username, "Failed login")
                    .await;
                return Err(CoreError::InvalidCredentials.into());
            }
        };

        if !verify_password(password, &user.password_hash) {
            warn!(username = %username, "Login attempt with wrong password");
            self.audit
                .rejected(username, AuditKind::Security, username, "Failed login")
                .await;
            return Err(CoreError::InvalidCredentials.into());
        }

        Ok(user)
    }

    pub async fn change_password(
        &self,
        username: &str,
        new_password: &str,
        actor: &str,
    ) -> EngineResult<()> {
        validation::validate_password(new_password)?;

        let mut user = self.get_user(username).await?;
        user.password_hash = hash_password(new_password)?;
        self.store.save(&user).await?;

        self.audit
            .success(
                actor,
                AuditKind::User,
                username,
                format!("Password changed for '{username}'"),
            )
            .await;
        Ok(())
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// A user's settings, defaulted when never saved.
    pub async fn settings_for(&self, username: &str) -> EngineResult<Settings> {
        Ok(self
            .settings
            .get(username)
            .await?
            .unwrap_or_else(|| Settings::for_user(username)))
    }

    pub async fn set_theme(&self, username: &str, theme: &str) -> EngineResult<Settings> {
        let mut prefs = self.settings_for(username).await?;
        prefs.theme = theme.to_string();
        self.settings.save(&prefs).await?;
        Ok(prefs)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// One Security/Rejected event per refused protected-role attempt.
    async fn security_reject(&self, actor: &str, target: &str, err: &CoreError) {
        warn!(actor = %actor, target = %target, error = %err, "Guard rejected user mutation");
        self.audit
            .rejected(actor, AuditKind::Security, target, err.to_string())
            .await;
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Hashes a password to an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, EngineError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| EngineError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string. An unparseable hash
/// verifies as false rather than erroring: the account is unusable either
/// way, and login must not leak why.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
