// fitgestao/src/helpers/auth_helper.rs
use actix_session::Session as CookieSession;
use actix_web::{HttpMessage, HttpRequest};

use crate::configs::initializer::FitgestaoConfig;
use crate::models::session_model::Session;
use crate::utils::auth::extract_session;

/// Session for a handler: the one a gate already resolved, otherwise read
/// fresh from the cookie.
pub fn current_session(req: &HttpRequest, cookie_session: &CookieSession, config: &FitgestaoConfig) -> Session {
    if let Some(session) = req.extensions().get::<Session>() {
        return session.clone();
    }
    extract_session(cookie_session, config)
}
