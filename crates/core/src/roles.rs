//! Well-known role name constants.
//!
//! These must match the CHECK constraint in
//! `20260815000003_create_profiles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";

/// The set of all valid profile roles.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CLIENT];

/// Returns `true` if the given role name is valid.
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}
