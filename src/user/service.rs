//! Account operations over the user repository.

use std::sync::Arc;

use crate::crypto::{Crypto, avatar_hash};
use crate::error::{Result, ServerError};
use crate::mail::{MailManager, Template};
use crate::role::{ADMIN_ROLE, Permission, RoleRepository};
use crate::token::{DEFAULT_EXPIRY, Intent, TokenManager};
use crate::user::{NewUser, Principal, User, UserRepository};

/// Fields an administrator may rewrite on any profile.
#[derive(Debug, Clone)]
pub struct AdminProfileUpdate {
    pub email: String,
    pub username: String,
    pub confirmed: bool,
    pub role_id: i32,
    pub name: String,
    pub about_me: Option<String>,
}

/// Account manager.
#[derive(Clone)]
pub struct AccountService {
    pub repo: UserRepository,
    pub roles: RoleRepository,
    crypto: Arc<Crypto>,
    token: TokenManager,
    mail: MailManager,
    admin_email: Option<String>,
}

impl AccountService {
    /// Create a new [`AccountService`].
    pub fn new(
        repo: UserRepository,
        roles: RoleRepository,
        crypto: Arc<Crypto>,
        token: TokenManager,
        mail: MailManager,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            repo,
            roles,
            crypto,
            token,
            mail,
            admin_email,
        }
    }

    /// Register a new account and dispatch its confirmation email.
    ///
    /// Duplicate email or username surfaces from the schema's unique
    /// constraints, not from a pre-check.
    pub async fn register(&self, new: NewUser) -> Result<User> {
        let user = User {
            role_id: self.assign_role(&new.email).await?,
            password_hash: self.crypto.pwd.hash_password(&new.password)?,
            avatar_hash: Some(avatar_hash(&new.email)),
            email: new.email,
            username: new.username,
            name: new.name,
            ..Default::default()
        };
        let user = self.repo.insert(&user).await?;

        let token = self
            .token
            .issue(Intent::Confirm { confirm: user.id }, DEFAULT_EXPIRY)?;
        self.mail
            .send(Template::Confirm, &user.email, &user.username, &token);

        tracing::info!(user_id = user.id, "account created");

        Ok(user)
    }

    /// The configured admin email gets the administrator role, everyone
    /// else the role marked default.
    async fn assign_role(&self, email: &str) -> Result<Option<i32>> {
        if self.admin_email.as_deref() == Some(email) {
            if let Some(role) = self.roles.find_by_name(ADMIN_ROLE).await? {
                return Ok(Some(role.id));
            }
        }

        Ok(self.roles.find_default().await?.map(|role| role.id))
    }

    /// Check a candidate password against the stored hash.
    pub fn verify_password(&self, user: &User, candidate: &str) -> bool {
        self.crypto
            .pwd
            .verify_password(candidate, &user.password_hash)
    }

    /// Authenticate by email and password, returning a session token.
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        match self.repo.find_by_email(email).await? {
            Some(user) if self.verify_password(&user, password) => {
                let token = self.token.create(user.id)?;
                Ok((user, token))
            },
            _ => Err(ServerError::Unauthorized),
        }
    }

    /// Flip `confirmed` when the token targets the acting user.
    ///
    /// Nothing is mutated on failure.
    pub async fn confirm(&self, user: &User, token: &str) -> Result<()> {
        match self.token.verify(token)? {
            Intent::Confirm { confirm } if confirm == user.id => {
                self.repo.update_confirmed(user.id, true).await
            },
            _ => Err(ServerError::InvalidToken),
        }
    }

    /// Send a fresh confirmation email to the acting user.
    pub fn resend_confirmation(&self, user: &User) -> Result<()> {
        let token = self
            .token
            .issue(Intent::Confirm { confirm: user.id }, DEFAULT_EXPIRY)?;
        self.mail
            .send(Template::Confirm, &user.email, &user.username, &token);

        Ok(())
    }

    /// Email a reset token when the address belongs to an account.
    ///
    /// Always succeeds, so callers cannot enumerate registered emails.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        if let Some(user) = self.repo.find_by_email(email).await? {
            let token = self
                .token
                .issue(Intent::Reset { reset: user.id }, DEFAULT_EXPIRY)?;
            self.mail
                .send(Template::Reset, &user.email, &user.username, &token);
        }

        Ok(())
    }

    /// Set a new password from a reset token.
    ///
    /// The token subject must still exist.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<()> {
        let Intent::Reset { reset } = self.token.verify(token)? else {
            return Err(ServerError::InvalidToken);
        };
        let user = self
            .repo
            .find_by_id(reset)
            .await
            .map_err(|_| ServerError::InvalidToken)?;

        let hash = self.crypto.pwd.hash_password(new_password)?;
        self.repo.update_password(user.id, &hash).await
    }

    /// Replace the password of a logged-in user.
    pub async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if !self.verify_password(user, old_password) {
            return Err(ServerError::Unauthorized);
        }

        let hash = self.crypto.pwd.hash_password(new_password)?;
        self.repo.update_password(user.id, &hash).await
    }

    /// Email a change-email token to the new address.
    pub async fn request_email_change(
        &self,
        user: &User,
        new_email: &str,
        password: &str,
    ) -> Result<()> {
        if !self.verify_password(user, password) {
            return Err(ServerError::Unauthorized);
        }
        if self.repo.email_taken(new_email, user.id).await? {
            return Err(ServerError::DuplicateEmail);
        }

        let token = self.token.issue(
            Intent::ChangeEmail {
                change_email: user.id,
                new_email: new_email.trim().to_lowercase(),
            },
            DEFAULT_EXPIRY,
        )?;
        self.mail
            .send(Template::ChangeEmail, new_email, &user.username, &token);

        Ok(())
    }

    /// Apply a pending email change; the avatar hash follows the new
    /// address.
    pub async fn change_email(&self, user: &User, token: &str) -> Result<()> {
        match self.token.verify(token)? {
            Intent::ChangeEmail {
                change_email,
                new_email,
            } if change_email == user.id => {
                let avatar = avatar_hash(&new_email);
                self.repo.update_email(user.id, &new_email, &avatar).await
            },
            _ => Err(ServerError::InvalidToken),
        }
    }

    /// Self-service update of display name and bio.
    pub async fn edit_profile(
        &self,
        user: &User,
        name: &str,
        about_me: Option<&str>,
    ) -> Result<()> {
        self.repo.update_profile(user.id, name, about_me).await
    }

    /// Rewrite any profile, administrators only.
    ///
    /// The permission check lives here, not on the HTTP layer.
    pub async fn edit_profile_as_admin(
        &self,
        acting: &Principal,
        target_id: i32,
        update: AdminProfileUpdate,
    ) -> Result<User> {
        if !acting.can(Permission::Admin) {
            return Err(ServerError::Forbidden);
        }

        let mut user = self.repo.find_by_id(target_id).await?;

        if self.repo.email_taken(&update.email, user.id).await? {
            return Err(ServerError::DuplicateEmail);
        }
        if self.repo.username_taken(&update.username, user.id).await? {
            return Err(ServerError::DuplicateUsername);
        }
        let role = self.roles.find_by_id(update.role_id).await?;

        user.email = update.email;
        user.username = update.username;
        user.confirmed = update.confirmed;
        user.role_id = Some(role.id);
        user.name = update.name;
        user.about_me = update.about_me;

        self.repo.admin_update(&user).await?;

        tracing::info!(user_id = user.id, "profile updated by administrator");

        Ok(user)
    }

    /// Bump `last_seen`; runs on every authenticated request.
    pub async fn ping(&self, user_id: i32) -> Result<()> {
        self.repo.ping(user_id).await
    }
}
