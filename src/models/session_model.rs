// fitgestao/src/models/session_model.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::permission_model::{normalize_permissions, PermissionGrant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "SUPER_ADMIN")]
    SuperAdmin,
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "GERENTE")]
    Gerente,
    #[serde(rename = "INSTRUTOR")]
    Instrutor,
    #[serde(rename = "USUARIO")]
    Usuario,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Gerente,
        Role::Instrutor,
        Role::Usuario,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Gerente => "GERENTE",
            Role::Instrutor => "INSTRUTOR",
            Role::Usuario => "USUARIO",
        }
    }

    /// Exact, case-sensitive match. `"admin"` is not a role.
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| SessionError::UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("invalid session payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Remaining subscription days. `"∞"` on the wire means unlimited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DaysRemaining {
    Unlimited,
    Days(f64),
}

pub const UNLIMITED_SENTINEL: &str = "∞";

impl DaysRemaining {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(DaysRemaining::from_f64).unwrap_or(DaysRemaining::Days(0.0)),
            Value::String(s) => DaysRemaining::from_text(s),
            _ => DaysRemaining::Days(0.0),
        }
    }

    fn from_f64(days: f64) -> Self {
        if days.is_nan() {
            DaysRemaining::Days(0.0)
        } else if days.is_infinite() && days > 0.0 {
            DaysRemaining::Unlimited
        } else {
            DaysRemaining::Days(days)
        }
    }

    fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text == UNLIMITED_SENTINEL || text == "Infinity" {
            return DaysRemaining::Unlimited;
        }
        text.parse::<f64>()
            .map(DaysRemaining::from_f64)
            .unwrap_or(DaysRemaining::Days(0.0))
    }

    pub fn is_positive(&self) -> bool {
        match self {
            DaysRemaining::Unlimited => true,
            DaysRemaining::Days(days) => *days > 0.0,
        }
    }
}

impl Serialize for DaysRemaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaysRemaining::Unlimited => serializer.serialize_str(UNLIMITED_SENTINEL),
            DaysRemaining::Days(days) if days.fract() == 0.0 => serializer.serialize_i64(*days as i64),
            DaysRemaining::Days(days) => serializer.serialize_f64(*days),
        }
    }
}

impl<'de> Deserialize<'de> for DaysRemaining {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(DaysRemaining::from_value(&value))
    }
}

impl fmt::Display for DaysRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaysRemaining::Unlimited => f.write_str(UNLIMITED_SENTINEL),
            DaysRemaining::Days(days) => write!(f, "{}", days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(rename = "daysRemaining")]
    pub days_remaining: DaysRemaining,
}

impl License {
    pub fn unlimited() -> Self {
        Self { days_remaining: DaysRemaining::Unlimited }
    }

    pub fn days(days: f64) -> Self {
        Self { days_remaining: DaysRemaining::Days(days) }
    }
}

/// Auth payload exactly as the login collaborator hands it over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Value,
    #[serde(default)]
    pub license: Option<Value>,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub role: Option<Role>,
    pub permissions: PermissionGrant,
    pub license: Option<License>,
}

impl UserProfile {
    pub fn new(role: Role, permissions: PermissionGrant) -> Self {
        Self {
            role: Some(role),
            permissions,
            license: Some(License::unlimited()),
        }
    }

    pub fn with_license(mut self, license: Option<License>) -> Self {
        self.license = license;
        self
    }
}

/// Snapshot of the authenticated user. Replaced whole on login/logout, never patched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub authenticated: bool,
    pub loading: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn authenticated(user: UserProfile) -> Self {
        Self {
            user: Some(user),
            authenticated: true,
            loading: false,
        }
    }

    /// The user, but only while the session is authenticated.
    pub fn active_user(&self) -> Option<&UserProfile> {
        if self.authenticated {
            self.user.as_ref()
        } else {
            None
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.active_user().and_then(|user| user.role)
    }

    pub fn from_payload(payload: &AuthPayload) -> Self {
        // A payload without any user data carries no user, even if flagged authenticated.
        let has_user = payload.role.is_some() || !payload.permissions.is_null() || payload.license.is_some();
        let user = has_user.then(|| UserProfile {
            role: payload.role.as_deref().and_then(Role::parse),
            permissions: normalize_permissions(&payload.permissions),
            license: payload.license.as_ref().and_then(parse_license),
        });

        Self {
            user,
            authenticated: payload.authenticated,
            loading: payload.loading,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SessionError> {
        let payload: AuthPayload = serde_json::from_str(raw)?;
        Ok(Self::from_payload(&payload))
    }

    /// Inverse of [`Session::from_payload`] for normalized sessions.
    pub fn to_payload(&self) -> AuthPayload {
        let user = self.user.as_ref();
        AuthPayload {
            role: user.and_then(|u| u.role).map(|r| r.as_str().to_string()),
            permissions: user
                .and_then(|u| serde_json::to_value(&u.permissions).ok())
                .unwrap_or(Value::Null),
            license: user
                .and_then(|u| u.license.as_ref())
                .and_then(|l| serde_json::to_value(l).ok()),
            authenticated: self.authenticated,
            loading: self.loading,
        }
    }
}

fn parse_license(value: &Value) -> Option<License> {
    value
        .as_object()
        .and_then(|obj| obj.get("daysRemaining"))
        .map(|days| License {
            days_remaining: DaysRemaining::from_value(days),
        })
}
