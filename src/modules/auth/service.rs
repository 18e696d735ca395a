use super::dto::TokenClaims;
use axum::http::{HeaderMap, header};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, get_current_timestamp,
};
use thiserror::Error;
use time::Duration;
use uuid::Uuid;

pub const TOKEN_ISSUER: &str = "tubely-access";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authorization header included in request")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

pub struct AuthService;

impl AuthService {
    /// Returns the token part of `Authorization: Bearer <token>`.
    pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        match value.split_once(' ') {
            Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AuthError::MalformedHeader),
        }
    }

    /// Verifies signature, issuer and expiry, returning the user id from `sub`.
    pub fn validate_jwt(token: &str, secret: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?
        .claims;

        Ok(claims.sub)
    }

    /// Issues an access token for `user_id` valid for `expires_in`.
    pub fn make_jwt(user_id: Uuid, secret: &str, expires_in: Duration) -> Result<String, AuthError> {
        let now = get_current_timestamp() as i64;

        let claims = TokenClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id,
            exp: now + expires_in.whole_seconds(),
            iat: now,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(token)
    }
}
