use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use super::claims::{Claims, Role, TokenType};

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Access-token claims in the HR backend's format, valid for `ttl_secs`.
pub fn access_claims(user_id: u64, username: &str, role: Role, ttl_secs: usize) -> Claims {
    Claims {
        user_id,
        sub: username.to_string(),
        role: role.id(),
        exp: unix_now() + ttl_secs,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        employee_id: None,
    }
}

/// Signs `claims` with HS256. The gateway itself only verifies; tooling and
/// tests use this to mint tokens.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
}
