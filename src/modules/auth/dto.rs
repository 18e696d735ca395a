use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}
