//! Authorization policy for RecipeBox.
//!
//! Pure role and ownership checks. Read access and modify access are
//! granted differently on purpose:
//!
//! | action | owner | public | admin | super_admin |
//! |--------|-------|--------|-------|-------------|
//! | read   | yes   | yes    | no    | yes         |
//! | modify | yes   | no     | yes   | yes         |
//!
//! Callers must confirm the resource exists before asking, so a missing
//! resource is reported as not found rather than forbidden.

use crate::db::{Role, User};
use crate::{RecipeBoxError, Result};

/// A resource with an owning user and a visibility flag.
pub trait OwnedResource {
    /// ID of the user who created the resource.
    fn owner_id(&self) -> i64;

    /// Whether anyone may read the resource.
    fn is_public(&self) -> bool;
}

/// True for `admin` and `super_admin`.
///
/// ```
/// use recipebox::auth::policy::is_admin;
/// use recipebox::db::{Role, User};
///
/// let mut user = User {
///     id: 1,
///     username: "mod".into(),
///     password_hash: String::new(),
///     role: Role::Admin,
///     created_at: String::new(),
/// };
/// assert!(is_admin(&user));
/// user.role = Role::User;
/// assert!(!is_admin(&user));
/// ```
pub fn is_admin(user: &User) -> bool {
    matches!(user.role, Role::Admin | Role::SuperAdmin)
}

/// True only for `super_admin`.
pub fn is_super_admin(user: &User) -> bool {
    user.role == Role::SuperAdmin
}

/// True if `user` created `resource`.
pub fn is_owner<R: OwnedResource + ?Sized>(user: &User, resource: &R) -> bool {
    resource.owner_id() == user.id
}

/// Read access: public, owned, or super admin.
///
/// Plain admins get no read bypass on private resources.
pub fn can_access<R: OwnedResource + ?Sized>(user: &User, resource: &R) -> bool {
    resource.is_public() || is_owner(user, resource) || is_super_admin(user)
}

/// Update, delete or visibility change: owned, or any admin.
pub fn can_modify<R: OwnedResource + ?Sized>(user: &User, resource: &R) -> bool {
    is_owner(user, resource) || is_admin(user)
}

/// Require an admin or super admin.
pub fn require_admin(user: &User) -> Result<()> {
    if !is_admin(user) {
        return Err(RecipeBoxError::Forbidden("admin access required".to_string()));
    }
    Ok(())
}

/// Require a super admin.
pub fn require_super_admin(user: &User) -> Result<()> {
    if !is_super_admin(user) {
        return Err(RecipeBoxError::Forbidden(
            "super admin access required".to_string(),
        ));
    }
    Ok(())
}

/// Require read access to `resource`.
pub fn require_access<R: OwnedResource + ?Sized>(user: &User, resource: &R) -> Result<()> {
    if !can_access(user, resource) {
        return Err(RecipeBoxError::Forbidden("not allowed to view".to_string()));
    }
    Ok(())
}

/// Require modify access to `resource`.
pub fn require_modify<R: OwnedResource + ?Sized>(user: &User, resource: &R) -> Result<()> {
    if !can_modify(user, resource) {
        return Err(RecipeBoxError::Forbidden("not allowed to modify".to_string()));
    }
    Ok(())
}

/// Require that `user` owns `resource`. Roles grant nothing here.
pub fn require_owner<R: OwnedResource + ?Sized>(user: &User, resource: &R) -> Result<()> {
    if !is_owner(user, resource) {
        return Err(RecipeBoxError::Forbidden("owner access required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        owner: i64,
        public: bool,
    }

    impl OwnedResource for Doc {
        fn owner_id(&self) -> i64 {
            self.owner
        }

        fn is_public(&self) -> bool {
            self.public
        }
    }

    fn create_user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            password_hash: String::new(),
            role,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn private_of(owner: i64) -> Doc {
        Doc {
            owner,
            public: false,
        }
    }

    fn public_of(owner: i64) -> Doc {
        Doc {
            owner,
            public: true,
        }
    }

    // ========================================================================
    // Role predicates
    // ========================================================================

    #[test]
    fn test_is_admin() {
        assert!(!is_admin(&create_user(1, Role::User)));
        assert!(is_admin(&create_user(1, Role::Admin)));
        assert!(is_admin(&create_user(1, Role::SuperAdmin)));
    }

    #[test]
    fn test_is_super_admin() {
        assert!(!is_super_admin(&create_user(1, Role::User)));
        assert!(!is_super_admin(&create_user(1, Role::Admin)));
        assert!(is_super_admin(&create_user(1, Role::SuperAdmin)));
    }

    #[test]
    fn test_require_admin() {
        assert!(matches!(
            require_admin(&create_user(1, Role::User)),
            Err(RecipeBoxError::Forbidden(_))
        ));
        assert!(require_admin(&create_user(1, Role::Admin)).is_ok());
        assert!(require_admin(&create_user(1, Role::SuperAdmin)).is_ok());
    }

    #[test]
    fn test_require_super_admin() {
        assert!(require_super_admin(&create_user(1, Role::User)).is_err());
        assert!(require_super_admin(&create_user(1, Role::Admin)).is_err());
        assert!(require_super_admin(&create_user(1, Role::SuperAdmin)).is_ok());
    }

    // ========================================================================
    // Read access
    // ========================================================================

    #[test]
    fn test_non_owner_denied_private() {
        let user = create_user(2, Role::User);
        assert!(!can_access(&user, &private_of(1)));
        assert!(matches!(
            require_access(&user, &private_of(1)),
            Err(RecipeBoxError::Forbidden(_))
        ));
    }

    #[test]
    fn test_anyone_reads_public() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert!(can_access(&create_user(2, role), &public_of(1)));
        }
    }

    #[test]
    fn test_owner_always_reads() {
        let owner = create_user(1, Role::User);
        assert!(can_access(&owner, &private_of(1)));
        assert!(can_access(&owner, &public_of(1)));
    }

    #[test]
    fn test_super_admin_reads_private() {
        assert!(can_access(&create_user(9, Role::SuperAdmin), &private_of(1)));
    }

    #[test]
    fn test_admin_has_no_read_bypass() {
        assert!(!can_access(&create_user(9, Role::Admin), &private_of(1)));
    }

    // ========================================================================
    // Modify access
    // ========================================================================

    #[test]
    fn test_owner_modifies() {
        assert!(can_modify(&create_user(1, Role::User), &private_of(1)));
    }

    #[test]
    fn test_non_owner_user_cannot_modify() {
        let user = create_user(2, Role::User);
        assert!(!can_modify(&user, &private_of(1)));
        // Public does not mean writable.
        assert!(!can_modify(&user, &public_of(1)));
        assert!(require_modify(&user, &public_of(1)).is_err());
    }

    #[test]
    fn test_admins_modify_others() {
        assert!(can_modify(&create_user(9, Role::Admin), &private_of(1)));
        assert!(can_modify(&create_user(9, Role::SuperAdmin), &private_of(1)));
        assert!(require_modify(&create_user(9, Role::Admin), &private_of(1)).is_ok());
    }

    // ========================================================================
    // Owner-only
    // ========================================================================

    #[test]
    fn test_require_owner() {
        assert!(require_owner(&create_user(1, Role::User), &private_of(1)).is_ok());
        assert!(require_owner(&create_user(2, Role::User), &public_of(1)).is_err());
        assert!(require_owner(&create_user(9, Role::SuperAdmin), &private_of(1)).is_err());
    }
}
