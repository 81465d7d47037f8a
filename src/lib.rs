// fitgestao/src/lib.rs

pub mod error;
pub mod router;
pub mod menu;
pub mod registry;
pub mod middleware;
pub mod utils;
pub mod helpers;
pub mod controllers;
pub mod configs;
pub mod models;

// Export configuration and app creation functions
pub use configs::initializer::{
    fitgestao_initialize,
    get_session_middleware,
    load_session_key,
    session_middleware_with_key,
    setup_fitgestao_logging,
    ConfigError,
    FitgestaoConfig,
};

// Session and permission model
pub use models::permission_model::{normalize_permissions, PermissionGrant, PermissionPayload};
pub use models::session_model::{AuthPayload, DaysRemaining, License, Role, Session, SessionError, UserProfile};

// Evaluation
pub use utils::{
    gate::{evaluate_gate, evaluate_gate_with, license_is_valid, GateDecision, GateRequirements, ModuleGate},
    rbac::{can_access_module, has_permission, has_role, has_special_action, CapabilityTable, ModulePolicy, PermissionEvaluator},
    structs::{RoleGuard, RouteGate},
    jwt::{create_session_token, decode_session_token},
    auth::{clear_session, extract_session, store_session_token},
};

// Navigation
pub use menu::{filter_menu_tree, visible_menu_tree, MenuAction, MenuError, MenuNode, RequiredPermission};
pub use registry::{get_registered_menus, get_visible_menus, register_menu_tree};

pub use error::FitgestaoError;
pub use router::register_fitgestao_routes;
pub use middleware::role_guard::GateMiddleware;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

pub mod prelude {
    pub use crate::{
        FitgestaoConfig,
        fitgestao_initialize,
        Session,
        UserProfile,
        Role,
        PermissionEvaluator,
        GateDecision,
        GateRequirements,
        RouteGate,
        RoleGuard,
        MenuNode,
        has_permission,
        has_special_action,
        has_role,
        can_access_module,
    };
}

// Configuration validation
pub fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    FitgestaoConfig::from_env()?;
    Ok(())
}
