//! Roles and their permission bitmask.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::Result;

/// Name of the role given to fresh accounts.
pub const DEFAULT_ROLE: &str = "User";
/// Name of the role holding every permission.
pub const ADMIN_ROLE: &str = "Administrator";

/// Capability bits a role may hold.
///
/// Each bit is an independent power of two; a role's `permissions` column
/// is the sum of the bits it grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Permission {
    Follow = 0x01,
    Comment = 0x02,
    Write = 0x04,
    Moderate = 0x08,
    Admin = 0x10,
}

impl Permission {
    pub const fn bits(self) -> i32 {
        self as i32
    }
}

/// Role as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub default: bool,
    pub permissions: i32,
}

impl Role {
    pub fn has_permission(&self, perm: Permission) -> bool {
        self.permissions & perm.bits() == perm.bits()
    }

    pub fn add_permission(&mut self, perm: Permission) {
        if !self.has_permission(perm) {
            self.permissions += perm.bits();
        }
    }

    pub fn remove_permission(&mut self, perm: Permission) {
        if self.has_permission(perm) {
            self.permissions -= perm.bits();
        }
    }

    pub fn reset_permissions(&mut self) {
        self.permissions = 0;
    }
}

/// Handle database requests for roles.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new [`RoleRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert the three built-in roles.
    ///
    /// Runs on every deployment, so it must stay idempotent: existing rows
    /// are reset and rebuilt rather than duplicated.
    pub async fn seed(&self) -> Result<()> {
        let roles: [(&str, &[Permission]); 3] = [
            (
                DEFAULT_ROLE,
                &[Permission::Follow, Permission::Comment, Permission::Write],
            ),
            (
                "Moderator",
                &[
                    Permission::Follow,
                    Permission::Comment,
                    Permission::Write,
                    Permission::Moderate,
                ],
            ),
            (
                ADMIN_ROLE,
                &[
                    Permission::Follow,
                    Permission::Comment,
                    Permission::Write,
                    Permission::Moderate,
                    Permission::Admin,
                ],
            ),
        ];

        for (name, permissions) in roles {
            let mut role =
                self.find_by_name(name).await?.unwrap_or_else(|| Role {
                    name: name.to_owned(),
                    ..Default::default()
                });

            role.reset_permissions();
            for perm in permissions {
                role.add_permission(*perm);
            }
            role.default = role.name == DEFAULT_ROLE;

            sqlx::query(
                r#"INSERT INTO roles (name, "default", permissions)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (name) DO UPDATE
                    SET "default" = EXCLUDED."default",
                        permissions = EXCLUDED.permissions"#,
            )
            .bind(&role.name)
            .bind(role.default)
            .bind(role.permissions)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!("roles seeded");

        Ok(())
    }

    /// Find a role using `id` field.
    pub async fn find_by_id(&self, id: i32) -> Result<Role> {
        Ok(sqlx::query_as::<_, Role>(
            r#"SELECT id, name, "default", permissions FROM roles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Find a role using `name` field.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            r#"SELECT id, name, "default", permissions FROM roles WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Find the role given to fresh accounts.
    pub async fn find_default(&self) -> Result<Option<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            r#"SELECT id, name, "default", permissions FROM roles WHERE "default" = TRUE"#,
        )
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Every role, ordered by name.
    pub async fn all(&self) -> Result<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            r#"SELECT id, name, "default", permissions FROM roles ORDER BY name"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_with(permissions: &[Permission]) -> Role {
        let mut role = Role::default();
        for perm in permissions {
            role.add_permission(*perm);
        }
        role
    }

    const ALL: [Permission; 5] = [
        Permission::Follow,
        Permission::Comment,
        Permission::Write,
        Permission::Moderate,
        Permission::Admin,
    ];

    #[test]
    fn test_has_permission_matches_granted_set() {
        let granted = [Permission::Follow, Permission::Write];
        let role = role_with(&granted);

        for perm in ALL {
            assert_eq!(role.has_permission(perm), granted.contains(&perm));
        }
    }

    #[test]
    fn test_empty_role_denies_everything() {
        let role = Role::default();

        for perm in ALL {
            assert!(!role.has_permission(perm));
        }
    }

    #[test]
    fn test_add_permission_is_idempotent() {
        let mut role = Role::default();
        role.add_permission(Permission::Comment);
        role.add_permission(Permission::Comment);

        assert_eq!(role.permissions, Permission::Comment.bits());
    }

    #[test]
    fn test_remove_absent_permission_is_a_no_op() {
        let mut role = role_with(&[Permission::Follow]);
        role.remove_permission(Permission::Admin);

        assert_eq!(role.permissions, Permission::Follow.bits());

        role.remove_permission(Permission::Follow);
        assert_eq!(role.permissions, 0);
    }

    #[test]
    fn test_reset_clears_every_bit() {
        let mut role = role_with(&ALL);
        role.reset_permissions();

        assert_eq!(role.permissions, 0);
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_seed_twice_is_idempotent(pool: sqlx::PgPool) {
        let repo = RoleRepository::new(pool);

        repo.seed().await.unwrap();
        let first = repo.all().await.unwrap();
        repo.seed().await.unwrap();
        let second = repo.all().await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);

        let default = repo.find_default().await.unwrap().unwrap();
        assert_eq!(default.name, DEFAULT_ROLE);

        let admin = repo.find_by_name(ADMIN_ROLE).await.unwrap().unwrap();
        assert!(admin.has_permission(Permission::Admin));
        assert_eq!(admin.permissions, 0x1F);
    }
}
