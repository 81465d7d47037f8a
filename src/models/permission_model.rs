// fitgestao/src/models/permission_model.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Per-module action grants, e.g. `{"alunos": {"acessar": true, "criar": false}}`.
pub type ModuleGrants = BTreeMap<String, BTreeMap<String, bool>>;

/// Normalized capabilities granted to a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(default)]
    pub modules: ModuleGrants,
    #[serde(default, rename = "specialActions")]
    pub special_actions: BTreeSet<String>,
}

impl PermissionGrant {
    /// Explicit grant lookup. Absent module or action means `false`.
    pub fn allows(&self, module: &str, action: &str) -> bool {
        self.modules
            .get(module)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(false)
    }

    pub fn has_special_action(&self, action_id: &str) -> bool {
        self.special_actions.contains(action_id)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.special_actions.is_empty()
    }

    pub fn special_actions_list(&self) -> Vec<String> {
        self.special_actions.iter().cloned().collect()
    }
}

/// Permission payload as delivered by the auth layer, before normalization.
///
/// Older sessions carry a flat list of special-action flags; current ones carry
/// the `{modules, specialActions}` object. Anything else is treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub enum PermissionPayload {
    Legacy(Vec<String>),
    Structured {
        modules: ModuleGrants,
        special_actions: Vec<String>,
    },
    Absent,
}

impl PermissionPayload {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => PermissionPayload::Legacy(string_members(items)),
            Value::Object(map) => {
                let modules = map.get("modules").map(parse_modules).unwrap_or_default();
                let special_actions = match map.get("specialActions") {
                    Some(Value::Array(items)) => string_members(items),
                    _ => Vec::new(),
                };
                PermissionPayload::Structured {
                    modules,
                    special_actions,
                }
            }
            _ => PermissionPayload::Absent,
        }
    }

    pub fn normalize(self) -> PermissionGrant {
        match self {
            PermissionPayload::Legacy(flags) => PermissionGrant {
                modules: BTreeMap::new(),
                special_actions: flags.into_iter().collect(),
            },
            PermissionPayload::Structured {
                modules,
                special_actions,
            } => PermissionGrant {
                modules,
                special_actions: special_actions.into_iter().collect(),
            },
            PermissionPayload::Absent => PermissionGrant::default(),
        }
    }
}

/// Ingest any permission JSON into a [`PermissionGrant`]. Never fails.
pub fn normalize_permissions(value: &Value) -> PermissionGrant {
    PermissionPayload::from_value(value).normalize()
}

fn string_members(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

// Only JSON booleans count; `"true"` or `1` are dropped so they can never grant.
fn parse_modules(value: &Value) -> ModuleGrants {
    let Some(map) = value.as_object() else {
        return ModuleGrants::new();
    };

    map.iter()
        .filter_map(|(module, actions)| {
            let actions = actions.as_object()?;
            let parsed = actions
                .iter()
                .filter_map(|(action, flag)| flag.as_bool().map(|b| (action.clone(), b)))
                .collect::<BTreeMap<_, _>>();
            Some((module.clone(), parsed))
        })
        .collect()
}
