// fitgestao/src/controllers/auth_controller.rs
use actix_session::Session as CookieSession;
use actix_web::{http::header, web, HttpResponse, Responder};
use tracing::info;

use crate::configs::initializer::FitgestaoConfig;
use crate::utils::auth::clear_session;

/// GET|POST /fitgestao/logout - drop the session token and send the user to login
pub async fn logout_action(cookie_session: CookieSession, config: web::Data<FitgestaoConfig>) -> impl Responder {
    clear_session(&cookie_session);
    info!("Session cleared");
    HttpResponse::Found()
        .append_header((header::LOCATION, config.login_path.clone()))
        .finish()
}
