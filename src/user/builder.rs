//! Typed builder for user registration.

/// Value is missing on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

/// [`NewUser`] builder; `email` and `username` are required before
/// [`UserBuilder::build`] exists.
#[derive(Debug, Clone)]
pub struct UserBuilder<Email, Username> {
    email: Email,
    username: Username,
    password: String,
    name: String,
}

impl UserBuilder<Missing, Missing> {
    /// Create a new [`UserBuilder`].
    pub fn new() -> Self {
        Self {
            email: Missing,
            username: Missing,
            password: String::default(),
            name: String::default(),
        }
    }
}

impl Default for UserBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Username> UserBuilder<Missing, Username> {
    /// Update `email` field on [`UserBuilder`].
    pub fn email(
        self,
        email: impl Into<String>,
    ) -> UserBuilder<Present<String>, Username> {
        UserBuilder {
            email: Present(email.into().trim().to_lowercase()),
            username: self.username,
            password: self.password,
            name: self.name,
        }
    }
}

impl<Email> UserBuilder<Email, Missing> {
    /// Update `username` field on [`UserBuilder`].
    pub fn username(
        self,
        username: impl Into<String>,
    ) -> UserBuilder<Email, Present<String>> {
        UserBuilder {
            email: self.email,
            username: Present(username.into()),
            password: self.password,
            name: self.name,
        }
    }
}

impl<Email, Username> UserBuilder<Email, Username> {
    /// Update `password` field on [`UserBuilder`].
    pub fn password(mut self, password: impl ToString) -> Self {
        self.password = password.to_string();
        self
    }

    /// Update `name` field on [`UserBuilder`].
    pub fn name(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }
}

impl UserBuilder<Present<String>, Present<String>> {
    /// Build a [`NewUser`] once every required field is present.
    pub fn build(self) -> NewUser {
        NewUser {
            email: self.email.0,
            username: self.username.0,
            password: self.password,
            name: self.name,
        }
    }
}

/// Registration input for [`super::AccountService::register`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_normalizes_email() {
        let new = UserBuilder::new()
            .email(" Someone@Example.COM ")
            .username("someone")
            .password("secret-password")
            .build();

        assert_eq!(new.email, "someone@example.com");
        assert_eq!(new.username, "someone");
        assert_eq!(new.name, "");
    }
}
