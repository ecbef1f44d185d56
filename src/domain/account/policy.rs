//! Pure authorization policy for admin user management.
//!
//! The five interacting rules around role elevation and deactivation are
//! expressed as plain functions over `(actor role, target role, requested
//! change, self-action?)` so each rule is independently testable without a
//! router or a database.

use super::account::Role;

/// Rejected admin mutations, split by how they surface to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Only a super-admin may perform this mutation (403).
    RequiresSuperAdmin,
    /// Accounts holding super-admin may only be modified by a super-admin (403).
    SuperAdminTargetProtected,
    /// A super-admin may not demote their own account (400).
    CannotDemoteSelf,
    /// A super-admin account can never be deactivated (400).
    SuperAdminCannotBeDeactivated,
    /// An account may not deactivate itself (400).
    CannotDeactivateSelf,
}

/// Decides whether `actor_role` may set `target`'s role to `new_role`.
///
/// Callers have already passed the admin guard; this only enforces the
/// super-admin rules on top.
pub fn decide_role_change(
    actor_role: Role,
    target_current_role: Role,
    new_role: Role,
    is_self: bool,
) -> Result<(), PolicyViolation> {
    if target_current_role == Role::SuperAdmin && actor_role != Role::SuperAdmin {
        return Err(PolicyViolation::SuperAdminTargetProtected);
    }
    if new_role == Role::SuperAdmin && actor_role != Role::SuperAdmin {
        return Err(PolicyViolation::RequiresSuperAdmin);
    }
    if is_self && target_current_role == Role::SuperAdmin && new_role != Role::SuperAdmin {
        return Err(PolicyViolation::CannotDemoteSelf);
    }
    Ok(())
}

/// Decides whether `actor_role` may flip `target`'s active flag to `new_active`.
pub fn decide_status_toggle(
    actor_role: Role,
    target_role: Role,
    new_active: bool,
    is_self: bool,
) -> Result<(), PolicyViolation> {
    if target_role == Role::SuperAdmin && !new_active {
        return Err(PolicyViolation::SuperAdminCannotBeDeactivated);
    }
    if target_role == Role::SuperAdmin && actor_role != Role::SuperAdmin {
        return Err(PolicyViolation::SuperAdminTargetProtected);
    }
    if is_self && !new_active {
        return Err(PolicyViolation::CannotDeactivateSelf);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ROLES: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    fn arb_role() -> impl Strategy<Value = Role> {
        prop::sample::select(ROLES.to_vec())
    }

    // ══════════════════════════════════════════════════════════════
    // Role change rules
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn admin_may_promote_user_to_admin() {
        assert!(decide_role_change(Role::Admin, Role::User, Role::Admin, false).is_ok());
    }

    #[test]
    fn only_super_admin_assigns_super_admin() {
        assert_eq!(
            decide_role_change(Role::Admin, Role::User, Role::SuperAdmin, false),
            Err(PolicyViolation::RequiresSuperAdmin)
        );
        assert!(decide_role_change(Role::SuperAdmin, Role::User, Role::SuperAdmin, false).is_ok());
    }

    #[test]
    fn super_admin_cannot_self_demote() {
        assert_eq!(
            decide_role_change(Role::SuperAdmin, Role::SuperAdmin, Role::Admin, true),
            Err(PolicyViolation::CannotDemoteSelf)
        );
        assert_eq!(
            decide_role_change(Role::SuperAdmin, Role::SuperAdmin, Role::User, true),
            Err(PolicyViolation::CannotDemoteSelf)
        );
    }

    #[test]
    fn super_admin_may_demote_another_super_admin() {
        assert!(decide_role_change(Role::SuperAdmin, Role::SuperAdmin, Role::Admin, false).is_ok());
    }

    #[test]
    fn non_super_admin_cannot_touch_super_admin_target() {
        assert_eq!(
            decide_role_change(Role::Admin, Role::SuperAdmin, Role::User, false),
            Err(PolicyViolation::SuperAdminTargetProtected)
        );
    }

    #[test]
    fn reassigning_same_role_to_self_is_allowed() {
        assert!(
            decide_role_change(Role::SuperAdmin, Role::SuperAdmin, Role::SuperAdmin, true).is_ok()
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Status toggle rules
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn admin_may_deactivate_regular_user() {
        assert!(decide_status_toggle(Role::Admin, Role::User, false, false).is_ok());
    }

    #[test]
    fn super_admin_can_never_be_deactivated() {
        for actor in ROLES {
            assert_eq!(
                decide_status_toggle(actor, Role::SuperAdmin, false, false),
                Err(PolicyViolation::SuperAdminCannotBeDeactivated),
                "actor {:?} deactivated a super-admin",
                actor
            );
        }
    }

    #[test]
    fn self_deactivation_is_rejected() {
        assert_eq!(
            decide_status_toggle(Role::Admin, Role::Admin, false, true),
            Err(PolicyViolation::CannotDeactivateSelf)
        );
    }

    #[test]
    fn reactivation_of_regular_user_is_allowed() {
        assert!(decide_status_toggle(Role::Admin, Role::User, true, false).is_ok());
    }

    #[test]
    fn only_super_admin_reactivates_super_admin() {
        // Deactivated super-admin rows cannot exist through this operation,
        // but the modify-protection still applies to the toggle itself.
        assert_eq!(
            decide_status_toggle(Role::Admin, Role::SuperAdmin, true, false),
            Err(PolicyViolation::SuperAdminTargetProtected)
        );
        assert!(decide_status_toggle(Role::SuperAdmin, Role::SuperAdmin, true, false).is_ok());
    }

    // ══════════════════════════════════════════════════════════════
    // Properties over the whole input space
    // ══════════════════════════════════════════════════════════════

    proptest! {
        /// No combination of inputs ever lets a non-super-admin mint one.
        #[test]
        fn super_admin_is_never_assigned_by_lesser_roles(
            actor in arb_role(),
            target in arb_role(),
            is_self in any::<bool>(),
        ) {
            prop_assume!(actor != Role::SuperAdmin);
            prop_assert!(
                decide_role_change(actor, target, Role::SuperAdmin, is_self).is_err()
            );
        }

        /// Deactivating a super-admin fails for every actor, self or not.
        #[test]
        fn super_admin_deactivation_always_fails(
            actor in arb_role(),
            is_self in any::<bool>(),
        ) {
            prop_assert_eq!(
                decide_status_toggle(actor, Role::SuperAdmin, false, is_self),
                Err(PolicyViolation::SuperAdminCannotBeDeactivated)
            );
        }

        /// Self-deactivation fails for every role.
        #[test]
        fn self_deactivation_always_fails(actor in arb_role()) {
            prop_assert!(decide_status_toggle(actor, actor, false, true).is_err());
        }

        /// Allowed role changes never involve a super-admin target or a
        /// super-admin grant unless the actor is a super-admin.
        #[test]
        fn allowed_changes_respect_super_admin_boundary(
            actor in arb_role(),
            target in arb_role(),
            new_role in arb_role(),
            is_self in any::<bool>(),
        ) {
            if decide_role_change(actor, target, new_role, is_self).is_ok()
                && (target == Role::SuperAdmin || new_role == Role::SuperAdmin)
            {
                prop_assert_eq!(actor, Role::SuperAdmin);
            }
        }
    }
}
