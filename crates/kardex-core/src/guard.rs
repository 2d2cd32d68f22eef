//! # Access Control Guard
//!
//! The single choke point for user-mutation rules. Every code path that
//! creates, deletes, or re-roles a user must pass through these checks;
//! no caller re-implements them.
//!
//! ## Protected Role State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Role Transitions                                     │
//! │                                                                         │
//! │   Operator ◄──────────► Admin          (allowed, last-admin permitting) │
//! │                                                                         │
//! │   * ──────X──────► Root                (assignment always rejected)     │
//! │   Root ───X──────► *                   (demotion always rejected)       │
//! │   delete(Root holder)                  (always rejected)                │
//! │                                                                         │
//! │   The Root holder exists from seeding onward. The guard makes the       │
//! │   protected state unreachable and inescapable at runtime.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Additional Rules
//! - The last admin-capable account can be neither deleted nor demoted.
//! - No account may delete itself.
//!
//! All rejections are [`CoreError::ProtectedRoleViolation`],
//! [`CoreError::LastAdmin`] or [`CoreError::SelfDelete`]; callers record
//! the protected-role ones as security audit events.

use crate::error::{CoreError, CoreResult};
use crate::types::{Role, User};

// =============================================================================
// Guard Checks
// =============================================================================

/// Rejects any attempt to grant the protected role.
///
/// Applies to both user creation and role changes: there is no code path
/// that may produce a second protected account.
pub fn check_assign(username: &str, role: Role) -> CoreResult<()> {
    if role.is_protected() {
        return Err(CoreError::protected(
            username,
            "the protected role cannot be assigned",
        ));
    }
    Ok(())
}

/// Checks whether `target` may be deleted.
///
/// `actor` is the account performing the deletion; `users` is the full
/// current user list (needed for the last-admin rule).
pub fn check_delete(actor: &str, target: &User, users: &[User]) -> CoreResult<()> {
    if target.role.is_protected() {
        return Err(CoreError::protected(
            &target.username,
            "the protected account cannot be deleted",
        ));
    }

    if actor == target.username {
        return Err(CoreError::SelfDelete {
            username: target.username.to_string(),
        });
    }

    if target.role.is_admin() && admin_count_excluding(users, &target.username) == 0 {
        return Err(CoreError::LastAdmin {
            username: target.username.to_string(),
        });
    }

    Ok(())
}

/// Checks whether `target`'s role may be changed to `new_role`.
pub fn check_change(target: &User, new_role: Role, users: &[User]) -> CoreResult<()> {
    if target.role.is_protected() {
        return Err(CoreError::protected(
            &target.username,
            "the protected account's role cannot be changed",
        ));
    }

    check_assign(&target.username, new_role)?;

    if target.role == new_role {
        return Ok(());
    }

    // Demoting an admin: make sure someone with admin access remains.
    if target.role.is_admin()
        && !new_role.is_admin()
        && admin_count_excluding(users, &target.username) == 0
    {
        return Err(CoreError::LastAdmin {
            username: target.username.to_string(),
        });
    }

    Ok(())
}

/// Counts admin-capable accounts other than `excluded`. The protected
/// account counts: it always retains admin access.
fn admin_count_excluding(users: &[User], excluded: &str) -> usize {
    users
        .iter()
        .filter(|u| u.username != excluded && u.role.is_admin())
        .count()
}

// =============================================================================
// Unit Tests
// =============================================================================
