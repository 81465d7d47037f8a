// fitgestao/src/controllers/dashboard_controller.rs

use actix_session::Session as CookieSession;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::configs::initializer::FitgestaoConfig;
use crate::error::FitgestaoError;
use crate::helpers::auth_helper::current_session;
use crate::menu::{modules_in, MenuNode};
use crate::models::session_model::{DaysRemaining, Role};
use crate::registry::{get_registered_menus, get_visible_menus};
use crate::utils::gate::license_is_valid;
use crate::utils::rbac::PermissionEvaluator;
use crate::utils::structs::{ApiResponse, PermissionQuery};

#[derive(Debug, Serialize)]
pub struct PermissionSummary {
    pub role: Option<Role>,
    pub license_valid: bool,
    pub full_access: bool,
    pub special_actions: Vec<String>,
    pub modules: Vec<String>,
}

/// GET /fitgestao/menu - navigation visible to the current session
pub async fn menu_view(
    req: HttpRequest,
    cookie_session: CookieSession,
    config: web::Data<FitgestaoConfig>,
) -> impl Responder {
    let session = current_session(&req, &cookie_session, &config);
    // Ungated entries still need a signed-in user here.
    let menus: Vec<MenuNode> = match session.active_user() {
        Some(_) => get_visible_menus(Some(&session)),
        None => Vec::new(),
    };
    HttpResponse::Ok().json(ApiResponse::success(menus))
}

/// GET /fitgestao/me/permissions
pub async fn permissions_view(
    req: HttpRequest,
    cookie_session: CookieSession,
    config: web::Data<FitgestaoConfig>,
) -> Result<HttpResponse, FitgestaoError> {
    let session = current_session(&req, &cookie_session, &config);
    let user = session.active_user().ok_or(FitgestaoError::Unauthorized)?;
    let evaluator = PermissionEvaluator::standard();

    let modules = modules_in(&get_registered_menus())
        .into_iter()
        .filter(|module| evaluator.can_access_module(Some(&session), module))
        .collect();

    let summary = PermissionSummary {
        role: user.role,
        license_valid: license_is_valid(user, &evaluator),
        full_access: evaluator.is_full_access(Some(&session)),
        special_actions: user.permissions.special_actions_list(),
        modules,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// GET /fitgestao/me/can?module=..&action=..
pub async fn can_view(
    req: HttpRequest,
    cookie_session: CookieSession,
    config: web::Data<FitgestaoConfig>,
    query: web::Query<PermissionQuery>,
) -> Result<HttpResponse, FitgestaoError> {
    let module = query
        .module
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| FitgestaoError::BadRequest("module is required".to_string()))?;
    let action = query.action.as_deref().unwrap_or("acessar");

    let session = current_session(&req, &cookie_session, &config);
    let allowed = PermissionEvaluator::standard().has_permission(Some(&session), module, action);

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "module": module,
        "action": action,
        "allowed": allowed,
    }))))
}

/// GET /fitgestao/licencas - license status, behind the `licencas` gate
pub async fn license_view(
    req: HttpRequest,
    cookie_session: CookieSession,
    config: web::Data<FitgestaoConfig>,
) -> Result<HttpResponse, FitgestaoError> {
    let session = current_session(&req, &cookie_session, &config);
    let user = session.active_user().ok_or(FitgestaoError::Unauthorized)?;
    let days: Option<DaysRemaining> = user.license.as_ref().map(|l| l.days_remaining);

    info!("License status viewed (role: {:?})", user.role);
    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "daysRemaining": days,
        "valid": license_is_valid(user, &PermissionEvaluator::standard()),
    }))))
}

/// GET /fitgestao/usuarios - user management landing, behind the role guard
pub async fn users_view(
    req: HttpRequest,
    cookie_session: CookieSession,
    config: web::Data<FitgestaoConfig>,
) -> impl Responder {
    let session = current_session(&req, &cookie_session, &config);
    HttpResponse::Ok().json(ApiResponse::success(json!({
        "role": session.role(),
        "canCreate": PermissionEvaluator::standard().has_permission(Some(&session), "usuarios", "criar"),
    })))
}
