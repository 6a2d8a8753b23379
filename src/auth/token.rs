use crate::error::{AppError, AuthError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies signed, time-limited identity tokens.
///
/// The codec holds the signing secret; it is built once at startup and shared.
/// Verification performs no I/O: it checks the HS256 signature, the token
/// structure and the `exp` claim against the current time, with no leeway.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    /// Generates a token for `subject`, valid for seven days from now.
    pub fn issue(&self, subject: Uuid) -> Result<String, AppError> {
        self.issue_at(subject, Utc::now())
    }

    /// Generates a token for `subject` as if it had been issued at `issued_at`.
    pub fn issue_at(&self, subject: Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let expiration = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiration overflow".into()))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Decodes and validates a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                AuthError::InvalidToken
            })
    }

    /// Verifies a token and returns the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| {
            log::debug!("token rejected: subject {:?} is not a user id", claims.sub);
            AuthError::InvalidToken
        })
    }
}
