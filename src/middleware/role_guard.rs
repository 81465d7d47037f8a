// fitgestao/src/middleware/role_guard.rs
use actix_session::SessionExt;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use tracing::{info, warn};

use crate::configs::initializer::FitgestaoConfig;
use crate::error::FitgestaoError;
use crate::helpers::template_helper::render_gate_decision;
use crate::models::session_model::{Role, Session};
use crate::utils::{
    auth::extract_session,
    gate::{evaluate_gate, GateDecision, GateRequirements, ModuleGate},
    structs::{RoleGuard, RouteGate},
};

#[derive(Debug, Clone)]
enum GateKind {
    Route(GateRequirements),
    Module(ModuleGate),
}

impl GateKind {
    fn decide(&self, session: &Session) -> GateDecision {
        match self {
            GateKind::Route(requirements) => evaluate_gate(Some(session), requirements),
            GateKind::Module(gate) => gate.decision(Some(session)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = GateMiddleware<S>;
    type InitError = ();
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let gate = GateKind::Route(self.requirements.clone());
        Box::pin(async move {
            Ok(GateMiddleware {
                service: Rc::new(service),
                gate,
            })
        })
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = GateMiddleware<S>;
    type InitError = ();
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let gate = GateKind::Module(self.as_module_gate());
        Box::pin(async move {
            Ok(GateMiddleware {
                service: Rc::new(service),
                gate,
            })
        })
    }
}

pub struct GateMiddleware<S> {
    service: Rc<S>,
    gate: GateKind,
}

impl<S, B> Service<ServiceRequest> for GateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = Rc::clone(&self.service);
        let gate = self.gate.clone();

        Box::pin(async move {
            let uri = req.uri().to_string();

            let config = req
                .app_data::<web::Data<FitgestaoConfig>>()
                .cloned()
                .ok_or_else(|| {
                    warn!("⚠️  FitGestão config not found in app data for request: {}", uri);
                    Error::from(FitgestaoError::InternalError)
                })?;

            // Re-resolved on every request: a logout between requests must take effect.
            let session = extract_session(&req.get_session(), config.get_ref());
            let decision = gate.decide(&session);

            match decision {
                GateDecision::Granted => {
                    info!("✅ Access granted for {} (role: {:?})", uri, session.role());
                    req.extensions_mut().insert(session);
                    let res = svc.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                GateDecision::Unauthenticated => {
                    warn!("🔐 Authentication required for request: {}", uri);
                    let response = HttpResponse::Found()
                        .append_header((header::LOCATION, config.login_path.clone()))
                        .finish();
                    Ok(req.into_response(response).map_into_right_body())
                }
                denied => {
                    warn!("🚫 Access denied for {} - {} (role: {:?})", uri, denied.reason(), session.role());
                    let response = render_gate_decision(&denied)
                        .unwrap_or_else(|| HttpResponse::Forbidden().finish());
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

impl RouteGate {
    /// Require `module.action` (plus session and license).
    pub fn permission(module: &str, action: &str) -> Self {
        Self::new(GateRequirements::permission(module, action))
    }

    /// Require one of `roles` (plus session and license).
    pub fn roles(roles: Vec<Role>) -> Self {
        Self::new(GateRequirements::roles(roles))
    }

    /// Only session and license.
    pub fn authenticated() -> Self {
        Self::new(GateRequirements::none())
    }
}

impl RoleGuard {
    pub fn full_access_only() -> Self {
        Self::new(vec![Role::SuperAdmin, Role::Admin])
    }

    pub fn managers_and_above() -> Self {
        Self::new(vec![Role::SuperAdmin, Role::Admin, Role::Gerente])
    }

    pub fn custom_roles(roles: Vec<Role>) -> Self {
        Self::new(roles)
    }
}
