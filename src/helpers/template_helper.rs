// fitgestao/src/helpers/template_helper.rs
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use chrono::Datelike;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::error;

use crate::utils::gate::GateDecision;

const TEMPLATE_FILES: &[(&str, &str)] = &[
    ("layout.html.tera", include_str!("../templates/layout.html.tera")),
    ("loading.html.tera", include_str!("../templates/loading.html.tera")),
    ("license_expired.html.tera", include_str!("../templates/license_expired.html.tera")),
    ("wrong_role.html.tera", include_str!("../templates/wrong_role.html.tera")),
    ("permission_denied.html.tera", include_str!("../templates/permission_denied.html.tera")),
];

pub static FITGESTAO_TEMPLATES: Lazy<Arc<Tera>> = Lazy::new(|| {
    let mut tera = Tera::default();
    // Templates are compiled into the binary; a broken one is a build defect.
    if let Err(e) = tera.add_raw_templates(TEMPLATE_FILES.iter().copied()) {
        error!("Failed to load embedded templates: {:?}", e);
    }
    tera.autoescape_on(vec![".html.tera"]);
    Arc::new(tera)
});

pub fn create_base_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("app_name", "FitGestão");
    ctx.insert("app_version", env!("CARGO_PKG_VERSION"));
    ctx.insert("current_year", &chrono::Utc::now().year());
    ctx
}

pub fn render_page(template_name: &str, ctx: &Context) -> Result<String, tera::Error> {
    FITGESTAO_TEMPLATES.render(template_name, ctx)
}

fn html_response(status: StatusCode, template_name: &str, ctx: Context, fallback: &str) -> HttpResponse {
    let html = render_page(template_name, &ctx).unwrap_or_else(|err| {
        error!("Template render error for {}: {:?}", template_name, err);
        fallback.to_string()
    });
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// Denial screen for `decision`, or `None` when the request may go through.
///
/// `Unauthenticated` renders nothing: redirecting to the login page is up to
/// the caller, which knows where it lives.
pub fn render_gate_decision(decision: &GateDecision) -> Option<HttpResponse> {
    let mut ctx = create_base_context();
    match decision {
        GateDecision::Granted | GateDecision::Unauthenticated => None,
        GateDecision::Loading => Some(html_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "loading.html.tera",
            ctx,
            "<p>Carregando...</p>",
        )),
        GateDecision::LicenseExpired => Some(html_response(
            StatusCode::FORBIDDEN,
            "license_expired.html.tera",
            ctx,
            "<h1>Licença expirada</h1>",
        )),
        GateDecision::WrongRole { actual, allowed } => {
            let actual_role = actual.map(|r| r.as_str()).unwrap_or("nenhum");
            let allowed_roles: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
            ctx.insert("actual_role", actual_role);
            ctx.insert("allowed_roles", &allowed_roles);
            Some(html_response(
                StatusCode::FORBIDDEN,
                "wrong_role.html.tera",
                ctx,
                "<h1>Acesso negado</h1>",
            ))
        }
        GateDecision::PermissionDenied { required, special_actions } => {
            ctx.insert("required_permission", required);
            ctx.insert("special_actions", special_actions);
            Some(html_response(
                StatusCode::FORBIDDEN,
                "permission_denied.html.tera",
                ctx,
                "<h1>Permissão negada</h1>",
            ))
        }
    }
}
