use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Admin email
    pub uid: i32,    // Admin ID
    pub exp: usize,  // Expiration timestamp
}

/// Sign a new HS256 token for an admin.
pub fn sign(admin_id: i32, email: &str, ttl_hours: i64, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| anyhow!("token expiry overflows"))?
        .timestamp();

    let claims = Claims {
        sub: email.to_owned(),
        uid: admin_id,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a token. Expired or tampered tokens are rejected.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
