// fitgestao/src/utils/rbac.rs
use lazy_static::lazy_static;
use std::collections::BTreeMap;
use tracing::debug;

use crate::menu::MenuAction;
use crate::models::session_model::{Role, Session};

pub const MODULE_LICENCAS: &str = "licencas";

pub const APPLY_DISCOUNT_OVER_30: &str = "APPLY_DISCOUNT_OVER_30";
pub const CLOSE_CASH_REGISTER: &str = "CLOSE_CASH_REGISTER";

/// Per-module policy that replaces the normal evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModulePolicy {
    /// Only these roles get in; explicit grants and full-access roles are ignored.
    ExclusiveTo(Vec<Role>),
}

impl ModulePolicy {
    pub fn allows(&self, role: Option<Role>) -> bool {
        match self {
            ModulePolicy::ExclusiveTo(roles) => role.map_or(false, |r| roles.contains(&r)),
        }
    }
}

/// Declarative role capabilities: who bypasses the grant table and which
/// modules are carved out of that bypass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    pub full_access_roles: Vec<Role>,
    pub module_overrides: BTreeMap<String, ModulePolicy>,
}

impl CapabilityTable {
    pub fn standard() -> Self {
        let mut module_overrides = BTreeMap::new();
        module_overrides.insert(
            MODULE_LICENCAS.to_string(),
            ModulePolicy::ExclusiveTo(vec![Role::SuperAdmin]),
        );

        Self {
            full_access_roles: vec![Role::SuperAdmin, Role::Admin],
            module_overrides,
        }
    }

    pub fn with_override(mut self, module: &str, policy: ModulePolicy) -> Self {
        self.module_overrides.insert(module.to_string(), policy);
        self
    }

    pub fn is_full_access(&self, role: Option<Role>) -> bool {
        role.map_or(false, |r| self.full_access_roles.contains(&r))
    }

    pub fn override_for(&self, module: &str) -> Option<&ModulePolicy> {
        self.module_overrides.get(module)
    }
}

lazy_static! {
    static ref STANDARD_TABLE: CapabilityTable = CapabilityTable::standard();
}

/// Answers "can this session do X on module Y". Every check fails closed on
/// a missing session, an unauthenticated session or an unknown role.
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    table: &'a CapabilityTable,
}

impl PermissionEvaluator<'static> {
    pub fn standard() -> Self {
        Self { table: &*STANDARD_TABLE }
    }
}

impl<'a> PermissionEvaluator<'a> {
    pub fn new(table: &'a CapabilityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CapabilityTable {
        self.table
    }

    pub fn has_permission(&self, session: Option<&Session>, module: &str, action: &str) -> bool {
        let Some(user) = session.and_then(Session::active_user) else {
            return false;
        };

        if let Some(policy) = self.table.override_for(module) {
            let allowed = policy.allows(user.role);
            debug!("module override for {}: role {:?} allowed={}", module, user.role, allowed);
            return allowed;
        }

        if self.table.is_full_access(user.role) {
            return true;
        }

        user.permissions.allows(module, action)
    }

    pub fn has_special_action(&self, session: Option<&Session>, action_id: &str) -> bool {
        let Some(user) = session.and_then(Session::active_user) else {
            return false;
        };

        self.table.is_full_access(user.role) || user.permissions.has_special_action(action_id)
    }

    /// Exact membership test; there is no role hierarchy here.
    pub fn has_role(&self, session: Option<&Session>, allowed: &[Role]) -> bool {
        session
            .and_then(Session::role)
            .map_or(false, |role| allowed.contains(&role))
    }

    pub fn can_access_module(&self, session: Option<&Session>, module: &str) -> bool {
        self.has_permission(session, module, MenuAction::Acessar.as_str())
    }

    pub fn is_full_access(&self, session: Option<&Session>) -> bool {
        self.table.is_full_access(session.and_then(Session::role))
    }
}

pub fn has_permission(session: Option<&Session>, module: &str, action: &str) -> bool {
    PermissionEvaluator::standard().has_permission(session, module, action)
}

pub fn has_special_action(session: Option<&Session>, action_id: &str) -> bool {
    PermissionEvaluator::standard().has_special_action(session, action_id)
}

pub fn has_role(session: Option<&Session>, allowed: &[Role]) -> bool {
    PermissionEvaluator::standard().has_role(session, allowed)
}

pub fn can_access_module(session: Option<&Session>, module: &str) -> bool {
    PermissionEvaluator::standard().can_access_module(session, module)
}
