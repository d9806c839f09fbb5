use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use blossom_types::api::Claims;
use blossom_types::models::User;

/// Tokens are valid for one hour.
const TOKEN_TTL_SECS: i64 = 60 * 60;

pub fn generate_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        id: user.id,
        is_admin: user.is_admin,
        exp: (chrono::Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Check signature and expiry; HS256 only.
pub fn verify_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
