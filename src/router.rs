// fitgestao/src/router.rs
use actix_web::{dev::HttpServiceFactory, web, Scope};
use tracing::info;

use crate::controllers::auth_controller::logout_action;
use crate::controllers::dashboard_controller::{can_view, license_view, menu_view, permissions_view, users_view};
use crate::models::session_model::Role;
use crate::utils::gate::GateRequirements;
use crate::utils::rbac::MODULE_LICENCAS;
use crate::utils::structs::{RoleGuard, RouteGate};

/// A scope behind the full route gate.
pub fn protected_scope<F>(path: &str, requirements: GateRequirements, configure: F) -> impl HttpServiceFactory
where
    F: FnOnce(&mut web::ServiceConfig),
{
    info!("🔐 Protected scope {} requires {:?}", path, requirements);
    web::scope(path).wrap(RouteGate::new(requirements)).configure(configure)
}

/// A scope behind the page-level role allow-list.
pub fn restricted_scope<F>(path: &str, roles: Vec<Role>, configure: F) -> impl HttpServiceFactory
where
    F: FnOnce(&mut web::ServiceConfig),
{
    info!("🔐 Restricted scope {} allows roles {:?}", path, roles);
    web::scope(path).wrap(RoleGuard::new(roles)).configure(configure)
}

pub fn register_fitgestao_routes() -> Scope {
    info!("🔧 Starting FitGestão route registration...");

    web::scope("/fitgestao")
        .route("/menu", web::get().to(menu_view))
        .route("/me/permissions", web::get().to(permissions_view))
        .route("/me/can", web::get().to(can_view))
        .route("/logout", web::get().to(logout_action))
        .route("/logout", web::post().to(logout_action))
        .service(protected_scope(
            "/licencas",
            GateRequirements::permission(MODULE_LICENCAS, "acessar"),
            |cfg| {
                cfg.route("", web::get().to(license_view));
            },
        ))
        .service(restricted_scope("/usuarios", vec![Role::SuperAdmin, Role::Admin], |cfg| {
            cfg.route("", web::get().to(users_view));
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::initializer::{get_session_middleware, FitgestaoConfig};
    use crate::models::session_model::AuthPayload;
    use crate::utils::auth::store_session_token;
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App, HttpResponse};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn test_config() -> FitgestaoConfig {
        FitgestaoConfig {
            jwt_secret: "test_secret_key_that_is_long_enough_for_testing_purposes".to_string(),
            session_secret: String::new(),
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            session_timeout: Duration::from_secs(3600),
            login_path: "/entrar".to_string(),
            menu_path: None,
        }
    }

    async fn sign_in(
        session: actix_session::Session,
        config: web::Data<FitgestaoConfig>,
        payload: web::Json<AuthPayload>,
    ) -> HttpResponse {
        match store_session_token(&session, "7", &payload, &config) {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(_) => HttpResponse::InternalServerError().finish(),
        }
    }

    macro_rules! app {
        () => {{
            let config = test_config();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(config.clone()))
                    .wrap(get_session_middleware(&config))
                    .route("/sign-in", web::post().to(sign_in))
                    .service(register_fitgestao_routes()),
            )
            .await
        }};
    }

    macro_rules! sign_in_as {
        ($app:expr, $payload:expr) => {{
            let req = test::TestRequest::post().uri("/sign-in").set_json($payload).to_request();
            let resp = test::call_service(&$app, req).await;
            let cookie: Cookie<'static> = resp.response().cookies().next().expect("session cookie").into_owned();
            cookie
        }};
    }

    #[actix_rt::test]
    async fn test_menu_for_anonymous_is_empty() {
        let app = app!();
        let req = test::TestRequest::get().uri("/fitgestao/menu").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], json!([]));
    }

    #[actix_rt::test]
    async fn test_menu_for_gerente() {
        let app = app!();
        let cookie = sign_in_as!(app, json!({
            "role": "GERENTE",
            "permissions": {"modules": {"planos": {"acessar": true}, "relatorios": {"acessar": true}}},
            "license": {"daysRemaining": 5},
            "authenticated": true
        }));

        let req = test::TestRequest::get().uri("/fitgestao/menu").cookie(cookie).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["cadastros", "relatorios", "administracao"]);
        assert_eq!(body["data"][1]["children"].as_array().unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_permissions_summary() {
        let app = app!();
        let cookie = sign_in_as!(app, json!({
            "role": "USUARIO",
            "permissions": ["APPLY_DISCOUNT_OVER_30"],
            "license": {"daysRemaining": 1},
            "authenticated": true
        }));

        let req = test::TestRequest::get().uri("/fitgestao/me/permissions").cookie(cookie).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["role"], "USUARIO");
        assert_eq!(body["data"]["license_valid"], true);
        assert_eq!(body["data"]["full_access"], false);
        assert_eq!(body["data"]["special_actions"], json!(["APPLY_DISCOUNT_OVER_30"]));
        assert_eq!(body["data"]["modules"], json!([]));
    }

    #[actix_rt::test]
    async fn test_permissions_summary_requires_login() {
        let app = app!();
        let req = test::TestRequest::get().uri("/fitgestao/me/permissions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_can_endpoint() {
        let app = app!();
        let cookie = sign_in_as!(app, json!({
            "role": "GERENTE",
            "permissions": {"modules": {"planos": {"criar": true}}},
            "license": {"daysRemaining": 30},
            "authenticated": true
        }));

        let req = test::TestRequest::get()
            .uri("/fitgestao/me/can?module=planos&action=criar")
            .cookie(cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["allowed"], true);

        let req = test::TestRequest::get()
            .uri("/fitgestao/me/can?module=planos&action=excluir")
            .cookie(cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["allowed"], false);

        let req = test::TestRequest::get().uri("/fitgestao/me/can").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_licencas_only_for_super_admin() {
        let app = app!();

        let admin = sign_in_as!(app, json!({"role": "ADMIN", "authenticated": true}));
        let req = test::TestRequest::get().uri("/fitgestao/licencas").cookie(admin).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let super_admin = sign_in_as!(app, json!({"role": "SUPER_ADMIN", "license": {"daysRemaining": "∞"}, "authenticated": true}));
        let req = test::TestRequest::get().uri("/fitgestao/licencas").cookie(super_admin).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["daysRemaining"], "∞");
        assert_eq!(body["data"]["valid"], true);
    }

    #[actix_rt::test]
    async fn test_usuarios_blocked_for_gerente() {
        let app = app!();
        let gerente = sign_in_as!(app, json!({"role": "GERENTE", "license": {"daysRemaining": 10}, "authenticated": true}));
        let req = test::TestRequest::get().uri("/fitgestao/usuarios").cookie(gerente).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/fitgestao/usuarios").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/entrar");
    }

    #[actix_rt::test]
    async fn test_logout_redirects_to_login() {
        let app = app!();
        let cookie = sign_in_as!(app, json!({"role": "ADMIN", "authenticated": true}));
        let req = test::TestRequest::post().uri("/fitgestao/logout").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/entrar");
    }
}
