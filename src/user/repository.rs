//! Handle database requests.

use sqlx::PgPool;

use crate::error::{Result, ServerError};
use crate::user::User;

const COLUMNS: &str = "id, email, username, role_id, password_hash, \
                       confirmed, name, about_me, member_since, last_seen, \
                       avatar_hash";

const EMAIL_KEY: &str = "users_email_key";
const USERNAME_KEY: &str = "users_username_key";

/// Map unique-constraint violations to their per-field duplicate error.
fn unique_violation(err: sqlx::Error) -> ServerError {
    if let sqlx::Error::Database(ref db) = err {
        match db.constraint() {
            Some(EMAIL_KEY) => return ServerError::DuplicateEmail,
            Some(USERNAME_KEY) => return ServerError::DuplicateUsername,
            _ => {},
        }
    }

    err.into()
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    ///
    /// Duplicate detection rides on the schema's unique constraints.
    pub async fn insert(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users
                (email, username, role_id, password_hash, confirmed, name, about_me, avatar_hash)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {COLUMNS}"#,
        ))
        .bind(&user.email)
        .bind(&user.username)
        .bind(user.role_id)
        .bind(&user.password_hash)
        .bind(user.confirmed)
        .bind(&user.name)
        .bind(&user.about_me)
        .bind(&user.avatar_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation)
    }

    /// Find a user using `id` field.
    pub async fn find_by_id(&self, id: i32) -> Result<User> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Find a user using `email` field.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Find a user using `username` field.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1",
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Whether another user already holds `email`.
    pub async fn email_taken(&self, email: &str, excluded: i32) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(excluded)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Whether another user already holds `username`.
    pub async fn username_taken(
        &self,
        username: &str,
        excluded: i32,
    ) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
        )
        .bind(username)
        .bind(excluded)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Self-service profile fields.
    pub async fn update_profile(
        &self,
        id: i32,
        name: &str,
        about_me: Option<&str>,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET name = $1, about_me = $2 WHERE id = $3")
            .bind(name)
            .bind(about_me)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Every field an administrator may edit.
    pub async fn admin_update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"UPDATE users
                SET email = $1, username = $2, confirmed = $3, role_id = $4,
                    name = $5, about_me = $6
                WHERE id = $7"#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(user.confirmed)
        .bind(user.role_id)
        .bind(&user.name)
        .bind(&user.about_me)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(unique_violation)?;

        Ok(())
    }

    pub async fn update_password(&self, id: i32, hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The avatar hash follows the email.
    pub async fn update_email(
        &self,
        id: i32,
        email: &str,
        avatar_hash: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET email = $1, avatar_hash = $2 WHERE id = $3",
        )
        .bind(email)
        .bind(avatar_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(unique_violation)?;

        Ok(())
    }

    pub async fn update_confirmed(&self, id: i32, confirmed: bool) -> Result<()> {
        sqlx::query("UPDATE users SET confirmed = $1 WHERE id = $2")
            .bind(confirmed)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Bump `last_seen` to the current time.
    pub async fn ping(&self, id: i32) -> Result<()> {
        sqlx::query("UPDATE users SET last_seen = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
