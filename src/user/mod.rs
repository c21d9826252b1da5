mod builder;
mod repository;
mod service;

pub use builder::*;
pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::role::{Permission, Role};

const GRAVATAR_URL: &str = "https://secure.gravatar.com/avatar";

/// User as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub role_id: Option<i32>,
    #[serde(skip)]
    pub password_hash: String,
    pub confirmed: bool,
    /// Display name.
    pub name: String,
    pub about_me: Option<String>,
    pub member_since: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Hex MD5 of the lowercased email, computed once at creation.
    pub avatar_hash: Option<String>,
}

impl User {
    /// Avatar URL served by gravatar.
    pub fn gravatar(&self, size: u16) -> String {
        let hash = self
            .avatar_hash
            .clone()
            .unwrap_or_else(|| crate::crypto::avatar_hash(&self.email));

        format!("{GRAVATAR_URL}/{hash}?s={size}&d=identicon&r=g")
    }
}

/// Requester resolved by the authentication middleware.
///
/// The anonymous variant answers every permission check with a denial, so
/// callers never need a null check on "no logged-in user."
#[derive(Clone, Debug)]
pub enum Principal {
    Known { user: User, role: Option<Role> },
    Anonymous,
}

impl Principal {
    /// Whether the requester holds `perm` through its role.
    pub fn can(&self, perm: Permission) -> bool {
        match self {
            Principal::Known {
                role: Some(role), ..
            } => role.has_permission(perm),
            _ => false,
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.can(Permission::Admin)
    }

    /// Known user behind the request, or `Unauthorized`.
    pub fn user(&self) -> Result<&User> {
        match self {
            Principal::Known { user, .. } => Ok(user),
            Principal::Anonymous => Err(ServerError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Permission; 5] = [
        Permission::Follow,
        Permission::Comment,
        Permission::Write,
        Permission::Moderate,
        Permission::Admin,
    ];

    #[test]
    fn test_anonymous_denies_every_permission() {
        let principal = Principal::Anonymous;

        for perm in ALL {
            assert!(!principal.can(perm));
        }
        assert!(!principal.is_administrator());
        assert!(principal.user().is_err());
    }

    #[test]
    fn test_known_user_without_role_denies_every_permission() {
        let principal = Principal::Known {
            user: User::default(),
            role: None,
        };

        for perm in ALL {
            assert!(!principal.can(perm));
        }
    }

    #[test]
    fn test_known_user_follows_its_role() {
        let mut role = Role::default();
        role.add_permission(Permission::Follow);
        role.add_permission(Permission::Admin);

        let principal = Principal::Known {
            user: User::default(),
            role: Some(role),
        };

        assert!(principal.can(Permission::Follow));
        assert!(!principal.can(Permission::Moderate));
        assert!(principal.is_administrator());
        assert!(principal.user().is_ok());
    }

    #[test]
    fn test_gravatar_prefers_stored_hash() {
        let user = User {
            email: "someone@example.com".into(),
            avatar_hash: Some("55502f40dc8b7c769880b10874abc9d0".into()),
            ..Default::default()
        };

        assert_eq!(
            user.gravatar(100),
            "https://secure.gravatar.com/avatar/55502f40dc8b7c769880b10874abc9d0?s=100&d=identicon&r=g"
        );
    }
}
