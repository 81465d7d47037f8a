// fitgestao/src/utils/structs.rs
use serde::{Deserialize, Serialize};

use crate::models::session_model::Role;
use crate::utils::gate::{GateRequirements, ModuleGate};

/// Wraps a scope with the full route gate: session, license, role, permission.
#[derive(Debug, Clone)]
pub struct RouteGate {
    pub requirements: GateRequirements,
}

impl RouteGate {
    pub fn new(requirements: GateRequirements) -> Self {
        Self { requirements }
    }
}

/// Wraps a scope with the page-level role allow-list only.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    pub allowed_roles: Vec<Role>,
}

impl RoleGuard {
    pub fn new(roles: Vec<Role>) -> Self {
        Self { allowed_roles: roles }
    }

    pub fn as_module_gate(&self) -> ModuleGate {
        ModuleGate::new(self.allowed_roles.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// `?module=...&action=...` for ad-hoc permission checks.
#[derive(Debug, Deserialize)]
pub struct PermissionQuery {
    pub module: Option<String>,
    pub action: Option<String>,
}
