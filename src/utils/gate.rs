// fitgestao/src/utils/gate.rs
use serde::Serialize;

use crate::menu::RequiredPermission;
use crate::models::session_model::{Role, Session, UserProfile};
use crate::utils::rbac::PermissionEvaluator;

/// What a protected area asks of the session, on top of being logged in with
/// a valid license.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateRequirements {
    pub required_role: Option<Vec<Role>>,
    pub required_permission: Option<RequiredPermission>,
}

impl GateRequirements {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn roles(roles: Vec<Role>) -> Self {
        Self {
            required_role: Some(roles),
            required_permission: None,
        }
    }

    pub fn permission(module: &str, action: &str) -> Self {
        Self {
            required_role: None,
            required_permission: Some(RequiredPermission::new(module, action)),
        }
    }

    pub fn and_permission(mut self, module: &str, action: &str) -> Self {
        self.required_permission = Some(RequiredPermission::new(module, action));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateDecision {
    Loading,
    Unauthenticated,
    LicenseExpired,
    WrongRole {
        actual: Option<Role>,
        allowed: Vec<Role>,
    },
    PermissionDenied {
        required: String,
        special_actions: Vec<String>,
    },
    Granted,
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            GateDecision::Loading => "loading",
            GateDecision::Unauthenticated => "unauthenticated",
            GateDecision::LicenseExpired => "license_expired",
            GateDecision::WrongRole { .. } => "wrong_role",
            GateDecision::PermissionDenied { .. } => "permission_denied",
            GateDecision::Granted => "granted",
        }
    }
}

/// Full-access roles never expire; everyone else needs more than zero days left.
pub fn license_is_valid(user: &UserProfile, evaluator: &PermissionEvaluator<'_>) -> bool {
    if evaluator.table().is_full_access(user.role) {
        return true;
    }
    user.license
        .as_ref()
        .map_or(false, |license| license.days_remaining.is_positive())
}

pub fn evaluate_gate(session: Option<&Session>, requirements: &GateRequirements) -> GateDecision {
    evaluate_gate_with(&PermissionEvaluator::standard(), session, requirements)
}

/// Ordered checks; the first one that fails decides.
pub fn evaluate_gate_with(
    evaluator: &PermissionEvaluator<'_>,
    session: Option<&Session>,
    requirements: &GateRequirements,
) -> GateDecision {
    if session.map_or(false, |s| s.loading) {
        return GateDecision::Loading;
    }

    let Some(user) = session.and_then(Session::active_user) else {
        return GateDecision::Unauthenticated;
    };

    if !license_is_valid(user, evaluator) {
        return GateDecision::LicenseExpired;
    }

    if let Some(allowed) = &requirements.required_role {
        if !evaluator.has_role(session, allowed) {
            return GateDecision::WrongRole {
                actual: user.role,
                allowed: allowed.clone(),
            };
        }
    }

    if let Some(required) = &requirements.required_permission {
        if !evaluator.has_permission(session, &required.module, &required.action) {
            return GateDecision::PermissionDenied {
                required: required.key(),
                special_actions: user.permissions.special_actions_list(),
            };
        }
    }

    GateDecision::Granted
}

/// Page-level gate: a plain role allow-list, no license or permission checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGate {
    pub allowed_roles: Vec<Role>,
}

impl ModuleGate {
    pub fn new(allowed_roles: Vec<Role>) -> Self {
        Self { allowed_roles }
    }

    pub fn allows(&self, session: Option<&Session>) -> bool {
        PermissionEvaluator::standard().has_role(session, &self.allowed_roles)
    }

    /// [`ModuleGate::allows`] as a renderable decision.
    pub fn decision(&self, session: Option<&Session>) -> GateDecision {
        if self.allows(session) {
            return GateDecision::Granted;
        }
        match session.and_then(Session::active_user) {
            None => GateDecision::Unauthenticated,
            Some(user) => GateDecision::WrongRole {
                actual: user.role,
                allowed: self.allowed_roles.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::permission_model::normalize_permissions;
    use crate::models::session_model::License;
    use serde_json::json;

    fn user(role: Role, days: Option<f64>, permissions: serde_json::Value) -> Session {
        let license = days.map(|d| if d.is_infinite() { License::unlimited() } else { License::days(d) });
        Session::authenticated(UserProfile::new(role, normalize_permissions(&permissions)).with_license(license))
    }

    #[test]
    fn test_loading_wins_over_everything() {
        let session = Session {
            user: Some(UserProfile::new(Role::Usuario, Default::default()).with_license(Some(License::days(0.0)))),
            authenticated: false,
            loading: true,
        };
        let requirements = GateRequirements::roles(vec![Role::SuperAdmin]).and_permission("licencas", "acessar");
        assert_eq!(evaluate_gate(Some(&session), &requirements), GateDecision::Loading);
        assert_eq!(evaluate_gate(Some(&Session::loading()), &GateRequirements::none()), GateDecision::Loading);
    }

    #[test]
    fn test_unauthenticated() {
        assert_eq!(evaluate_gate(None, &GateRequirements::none()), GateDecision::Unauthenticated);
        assert_eq!(
            evaluate_gate(Some(&Session::anonymous()), &GateRequirements::none()),
            GateDecision::Unauthenticated
        );

        let mut session = user(Role::Admin, None, json!(null));
        session.authenticated = false;
        assert_eq!(evaluate_gate(Some(&session), &GateRequirements::none()), GateDecision::Unauthenticated);
    }

    #[test]
    fn test_license_boundary() {
        let expired = user(Role::Usuario, Some(0.0), json!(null));
        assert_eq!(evaluate_gate(Some(&expired), &GateRequirements::none()), GateDecision::LicenseExpired);

        let last_day = user(Role::Usuario, Some(1.0), json!(null));
        assert_eq!(evaluate_gate(Some(&last_day), &GateRequirements::none()), GateDecision::Granted);

        let overdue = user(Role::Gerente, Some(-5.0), json!(null));
        assert_eq!(evaluate_gate(Some(&overdue), &GateRequirements::none()), GateDecision::LicenseExpired);
    }

    #[test]
    fn test_license_unlimited_and_missing() {
        let unlimited = user(Role::Usuario, Some(f64::INFINITY), json!(null));
        assert!(evaluate_gate(Some(&unlimited), &GateRequirements::none()).is_granted());

        let missing = user(Role::Instrutor, None, json!(null));
        assert_eq!(evaluate_gate(Some(&missing), &GateRequirements::none()), GateDecision::LicenseExpired);
    }

    #[test]
    fn test_full_access_license_always_valid() {
        for role in [Role::SuperAdmin, Role::Admin] {
            let session = user(role, Some(0.0), json!(null));
            assert!(evaluate_gate(Some(&session), &GateRequirements::none()).is_granted());
            let session = user(role, None, json!(null));
            assert!(evaluate_gate(Some(&session), &GateRequirements::none()).is_granted());
        }
    }

    #[test]
    fn test_license_checked_before_role() {
        let session = user(Role::Usuario, Some(0.0), json!(null));
        let requirements = GateRequirements::roles(vec![Role::Gerente]);
        assert_eq!(evaluate_gate(Some(&session), &requirements), GateDecision::LicenseExpired);
    }

    #[test]
    fn test_wrong_role_reports_both_sides() {
        let session = user(Role::Instrutor, Some(30.0), json!(null));
        let requirements = GateRequirements::roles(vec![Role::Gerente, Role::Admin]).and_permission("alunos", "acessar");
        assert_eq!(
            evaluate_gate(Some(&session), &requirements),
            GateDecision::WrongRole {
                actual: Some(Role::Instrutor),
                allowed: vec![Role::Gerente, Role::Admin],
            }
        );
    }

    #[test]
    fn test_permission_denied_reports_key_and_special_actions() {
        let session = user(
            Role::Gerente,
            Some(30.0),
            json!({"modules": {"planos": {"criar": true}}, "specialActions": ["CLOSE_CASH_REGISTER"]}),
        );

        assert!(evaluate_gate(Some(&session), &GateRequirements::permission("planos", "criar")).is_granted());
        assert_eq!(
            evaluate_gate(Some(&session), &GateRequirements::permission("planos", "excluir")),
            GateDecision::PermissionDenied {
                required: "planos.excluir".to_string(),
                special_actions: vec!["CLOSE_CASH_REGISTER".to_string()],
            }
        );
    }

    #[test]
    fn test_licencas_gate_for_admin() {
        let admin = user(Role::Admin, None, json!(null));
        let decision = evaluate_gate(Some(&admin), &GateRequirements::permission("licencas", "acessar"));
        assert_eq!(decision.reason(), "permission_denied");

        let super_admin = user(Role::SuperAdmin, None, json!(null));
        assert!(evaluate_gate(Some(&super_admin), &GateRequirements::permission("licencas", "acessar")).is_granted());
    }

    #[test]
    fn test_decision_follows_session_changes() {
        let requirements = GateRequirements::none();
        let mut session = user(Role::Usuario, Some(10.0), json!(null));
        assert!(evaluate_gate(Some(&session), &requirements).is_granted());
        session = Session::anonymous();
        assert_eq!(evaluate_gate(Some(&session), &requirements), GateDecision::Unauthenticated);
    }

    #[test]
    fn test_decision_serializes_with_reason_tag() {
        let decision = GateDecision::WrongRole { actual: None, allowed: vec![Role::Admin] };
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({"reason": "wrong_role", "actual": null, "allowed": ["ADMIN"]})
        );
    }

    #[test]
    fn test_module_gate_is_role_only() {
        let gate = ModuleGate::new(vec![Role::SuperAdmin, Role::Admin]);

        let expired_admin = user(Role::Admin, Some(0.0), json!(null));
        assert!(gate.allows(Some(&expired_admin)));

        let gerente = user(Role::Gerente, Some(30.0), json!({"modules": {"usuarios": {"acessar": true}}}));
        assert!(!gate.allows(Some(&gerente)));
        assert!(!gate.allows(None));

        assert_eq!(gate.decision(None), GateDecision::Unauthenticated);
        assert_eq!(gate.decision(Some(&expired_admin)), GateDecision::Granted);
        assert_eq!(
            gate.decision(Some(&gerente)),
            GateDecision::WrongRole { actual: Some(Role::Gerente), allowed: vec![Role::SuperAdmin, Role::Admin] }
        );
    }
}
