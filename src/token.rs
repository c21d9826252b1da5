//! Manage signed expiring tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Default lifetime of action tokens sent by email.
pub const DEFAULT_EXPIRY: u64 = 3600; // 1 hour.
/// Lifetime of session tokens returned on login.
pub const SESSION_EXPIRY: u64 = 60 * 60 * 24; // 24 hours.

/// Pieces of information asserted on a session JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the instance that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: i32,
}

/// Payload of a single-purpose action token.
///
/// Each variant serializes with its own field names, so a token issued for
/// one intent never verifies as another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Intent {
    Confirm { confirm: i32 },
    Reset { reset: i32 },
    ChangeEmail { change_email: i32, new_email: String },
}

impl Intent {
    /// User the token was issued for.
    pub fn subject(&self) -> i32 {
        match self {
            Intent::Confirm { confirm } => *confirm,
            Intent::Reset { reset } => *reset,
            Intent::ChangeEmail { change_email, .. } => *change_email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IntentClaims {
    exp: u64,
    iat: u64,
    iss: String,
    #[serde(flatten)]
    intent: Intent,
}

/// Manage session and action tokens.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    name: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] signing with a shared secret.
    pub fn new(name: &str, secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // An expired token must be rejected right away, not a minute later.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            name: name.to_owned(),
        }
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Create a new session token.
    pub fn create(&self, user_id: i32) -> Result<String> {
        let time = Self::now();
        let claims = Claims {
            exp: time + SESSION_EXPIRY,
            iat: time,
            iss: self.name.clone(),
            sub: user_id,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Decode and check a session token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ServerError::Unauthorized)
    }

    /// Issue an action token carrying `intent`, valid for `expiry` seconds.
    pub fn issue(&self, intent: Intent, expiry: u64) -> Result<String> {
        let time = Self::now();
        let claims = IntentClaims {
            exp: time + expiry,
            iat: time,
            iss: self.name.clone(),
            intent,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify an action token.
    ///
    /// Any failure (bad signature, malformed payload, elapsed expiry) is
    /// collapsed into [`ServerError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<Intent> {
        decode::<IntentClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.intent)
            .map_err(|_| ServerError::InvalidToken)
    }
}
