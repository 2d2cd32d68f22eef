//! Protected-role enforcement end to end: every path that could touch
//! the protected account is rejected and leaves a Security audit event.

use kardex_core::types::{AuditKind, AuditOutcome, Role, User};
use kardex_core::{CoreError, PROTECTED_USERNAME};
use kardex_engine::users::hash_password;
use kardex_engine::{Engine, EngineError};
use kardex_store::BackendConfig;

async fn engine_with_roster() -> Engine {
    let engine = Engine::open(BackendConfig::sqlite_in_memory()).await.unwrap();

    engine
        .users()
        .seed_protected(&User {
            username: PROTECTED_USERNAME.to_string(),
            password_hash: hash_password("china2024").unwrap(),
            role: Role::Root,
        })
        .await
        .unwrap();
    engine
        .users()
        .create_user("ana", "admin123", Role::Admin, "seed")
        .await
        .unwrap();
    engine
        .users()
        .create_user("luis", "caja123", Role::Operator, "seed")
        .await
        .unwrap();

    engine
}

fn assert_protected(err: EngineError) {
    assert!(matches!(
        err,
        EngineError::Core(CoreError::ProtectedRoleViolation { .. })
    ));
}

#[tokio::test]
async fn protected_account_rejects_demote_delete_and_assign() {
    let engine = engine_with_roster().await;
    let users = engine.users();

    // Change the protected account's role
    assert_protected(
        users
            .change_role(PROTECTED_USERNAME, Role::Operator, "ana")
            .await
            .unwrap_err(),
    );

    // Delete the protected account
    assert_protected(users.delete_user(PROTECTED_USERNAME, "ana").await.unwrap_err());

    // Grant the protected role to someone else
    assert_protected(
        users
            .change_role("luis", Role::Root, "ana")
            .await
            .unwrap_err(),
    );
    assert_protected(
        users
            .create_user("second_root", "pass1234", Role::Root, "ana")
            .await
            .unwrap_err(),
    );

    // The account is still there, still protected
    let root = users.get_user(PROTECTED_USERNAME).await.unwrap();
    assert_eq!(root.role, Role::Root);
}

#[tokio::test]
async fn every_rejection_is_a_security_audit_event() {
    let engine = engine_with_roster().await;
    let before = engine
        .audit()
        .recent(100)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == AuditKind::Security)
        .count();

    let _ = engine
        .users()
        .change_role(PROTECTED_USERNAME, Role::Admin, "ana")
        .await;
    let _ = engine.users().delete_user(PROTECTED_USERNAME, "ana").await;
    let _ = engine.users().change_role("luis", Role::Root, "ana").await;

    let security: Vec<_> = engine
        .audit()
        .recent(100)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.kind == AuditKind::Security)
        .collect();

    assert_eq!(security.len() - before, 3);
    assert!(security
        .iter()
        .take(3)
        .all(|e| e.outcome == AuditOutcome::Rejected));
}

#[tokio::test]
async fn whitespace_username_cannot_shadow_an_existing_account() {
    let engine = engine_with_roster().await;
    let users = engine.users();

    // " admin_china" trims to the protected username; creating it must be
    // a duplicate, not an upsert that replaces the account
    let err = users
        .create_user(
            &format!(" {PROTECTED_USERNAME}"),
            "pwned123",
            Role::Operator,
            "mallory",
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::DuplicateUser(_))
    ));
    let root = users.get_user(PROTECTED_USERNAME).await.unwrap();
    assert_eq!(root.role, Role::Root);

    // Same for ordinary accounts: ana's credentials survive
    assert!(matches!(
        users
            .create_user("ana ", "pwned123", Role::Operator, "mallory")
            .await
            .unwrap_err(),
        EngineError::Core(CoreError::DuplicateUser(_))
    ));
    assert!(users.authenticate("ana", "admin123").await.is_ok());
}

#[tokio::test]
async fn second_protected_account_cannot_be_seeded() {
    let engine = engine_with_roster().await;
    let err = engine
        .users()
        .seed_protected(&User {
            username: "another_root".to_string(),
            password_hash: hash_password("x".repeat(8).as_str()).unwrap(),
            role: Role::Root,
        })
        .await
        .unwrap_err();
    assert_protected(err);
}

#[tokio::test]
async fn last_admin_and_self_delete_rules() {
    let engine = Engine::open(BackendConfig::sqlite_in_memory()).await.unwrap();
    let users = engine.users();

    users
        .create_user("ana", "admin123", Role::Admin, "seed")
        .await
        .unwrap();
    users
        .create_user("luis", "caja123", Role::Operator, "seed")
        .await
        .unwrap();

    // No protected account here: ana is the only admin
    assert!(matches!(
        users.delete_user("ana", "luis").await.unwrap_err(),
        EngineError::Core(CoreError::LastAdmin { .. })
    ));
    assert!(matches!(
        users.change_role("ana", Role::Operator, "luis").await.unwrap_err(),
        EngineError::Core(CoreError::LastAdmin { .. })
    ));

    // Nobody deletes themselves
    assert!(matches!(
        users.delete_user("luis", "luis").await.unwrap_err(),
        EngineError::Core(CoreError::SelfDelete { .. })
    ));
}

#[tokio::test]
async fn authentication_and_password_change() {
    let engine = engine_with_roster().await;
    let users = engine.users();

    let user = users.authenticate("ana", "admin123").await.unwrap();
    assert_eq!(user.role, Role::Admin);

    assert!(matches!(
        users.authenticate("ana", "wrong").await.unwrap_err(),
        EngineError::Core(CoreError::InvalidCredentials)
    ));
    assert!(matches!(
        users.authenticate("ghost", "admin123").await.unwrap_err(),
        EngineError::Core(CoreError::InvalidCredentials)
    ));

    users.change_password("ana", "newpass1", "ana").await.unwrap();
    assert!(users.authenticate("ana", "admin123").await.is_err());
    assert!(users.authenticate("ana", "newpass1").await.is_ok());
}

#[tokio::test]
async fn deleting_a_user_removes_their_settings() {
    let engine = engine_with_roster().await;
    let users = engine.users();

    users.set_theme("luis", "light").await.unwrap();
    assert_eq!(users.settings_for("luis").await.unwrap().theme, "light");

    users.delete_user("luis", "ana").await.unwrap();

    // Back to defaults: the stored record is gone
    assert_eq!(users.settings_for("luis").await.unwrap().theme, "dark");
}
