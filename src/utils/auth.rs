// fitgestao/src/utils/auth.rs
use actix_session::Session as CookieSession;
use anyhow::Result;
use tracing::debug;

use crate::configs::initializer::FitgestaoConfig;
use crate::models::session_model::{AuthPayload, Session};
use crate::utils::jwt::{create_session_token, decode_session_token, is_token_expired};

pub const SESSION_TOKEN_KEY: &str = "fitgestao_token";

/// Resolve the request's [`Session`] from the cookie session token.
///
/// Anything short of a valid, unexpired token yields an anonymous session.
pub fn extract_session(cookie_session: &CookieSession, config: &FitgestaoConfig) -> Session {
    let token = match cookie_session.get::<String>(SESSION_TOKEN_KEY) {
        Ok(Some(token)) => token,
        Ok(None) => return Session::anonymous(),
        Err(e) => {
            debug!("Unreadable session cookie: {}", e);
            return Session::anonymous();
        }
    };

    match decode_session_token(&token, config) {
        Ok(claims) if !is_token_expired(&claims) => claims.into_session(),
        Ok(_) => Session::anonymous(),
        Err(e) => {
            debug!("Discarding session token: {:#}", e);
            Session::anonymous()
        }
    }
}

/// Sign `payload` and store it for subsequent requests.
pub fn store_session_token(
    cookie_session: &CookieSession,
    user_id: &str,
    payload: &AuthPayload,
    config: &FitgestaoConfig,
) -> Result<()> {
    let token = create_session_token(user_id, payload, config)?;
    cookie_session
        .insert(SESSION_TOKEN_KEY, token)
        .map_err(|e| anyhow::anyhow!("Failed to store session token: {}", e))?;
    Ok(())
}

pub fn clear_session(cookie_session: &CookieSession) {
    cookie_session.remove(SESSION_TOKEN_KEY);
    cookie_session.purge();
}
