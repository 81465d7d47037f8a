// fitgestao/src/utils/jwt.rs
use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::configs::initializer::FitgestaoConfig;
use crate::models::session_model::{AuthPayload, Session};

/// Token body: who the session belongs to plus the auth payload verbatim.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
    pub payload: AuthPayload,
}

impl SessionClaims {
    pub fn into_session(self) -> Session {
        Session::from_payload(&self.payload)
    }
}

pub fn create_session_token(user_id: &str, payload: &AuthPayload, config: &FitgestaoConfig) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(config.session_timeout_secs()))
        .context("Session timeout overflows the clock")?
        .timestamp() as usize;

    let claims = SessionClaims {
        sub: user_id.to_owned(),
        exp: expiration,
        payload: payload.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .context("Failed to encode session token")
}

pub fn decode_session_token(token: &str, config: &FitgestaoConfig) -> Result<SessionClaims> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .context("Invalid session token")?;
    Ok(data.claims)
}

pub fn is_token_expired(claims: &SessionClaims) -> bool {
    let now = chrono::Utc::now().timestamp() as usize;
    claims.exp < now
}
