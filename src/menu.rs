// fitgestao/src/menu.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::models::session_model::Session;
use crate::utils::rbac::PermissionEvaluator;

/// Deepest allowed nesting: top menu → submenu → sub-submenu.
pub const MAX_MENU_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequiredPermission {
    pub module: String,
    pub action: String,
}

impl RequiredPermission {
    pub fn new(module: &str, action: &str) -> Self {
        Self {
            module: module.to_string(),
            action: action.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.module, self.action)
    }

    /// Parses `"module.action"`.
    pub fn parse(key: &str) -> Option<Self> {
        let (module, action) = key.split_once('.')?;
        if module.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self::new(module, action))
    }
}

impl fmt::Display for RequiredPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<RequiredPermission>,
    #[serde(default)]
    pub has_submenus: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Top-level group.
    pub fn group(id: &str, label: &str, children: Vec<MenuNode>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: None,
            path: None,
            required_permission: None,
            has_submenus: true,
            children,
        }
    }

    pub fn leaf(id: &str, label: &str, path: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: None,
            path: Some(path.to_string()),
            required_permission: None,
            has_submenus: false,
            children: Vec::new(),
        }
    }

    pub fn requires(mut self, module: &str, action: MenuAction) -> Self {
        self.required_permission = Some(RequiredPermission::new(module, action.as_str()));
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    /// A node with children is a group whatever `has_submenus` says.
    pub fn is_leaf(&self) -> bool {
        !self.has_submenus && self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Acessar,
    Criar,
    Editar,
    Excluir,
    Exportar,
}

impl MenuAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuAction::Acessar => "acessar",
            MenuAction::Criar => "criar",
            MenuAction::Editar => "editar",
            MenuAction::Excluir => "excluir",
            MenuAction::Exportar => "exportar",
        }
    }

    pub fn to_path(&self, base_path: &str) -> String {
        match self {
            MenuAction::Acessar => base_path.to_string(),
            MenuAction::Criar => format!("{}/novo", base_path),
            MenuAction::Editar => format!("{}/{{id}}/editar", base_path),
            MenuAction::Excluir => base_path.to_string(),
            MenuAction::Exportar => format!("{}/exportar", base_path),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("menu '{id}' is nested {depth} levels deep")]
    TooDeep { id: String, depth: usize },
    #[error("duplicate menu id '{0}'")]
    DuplicateId(String),
    #[error("menu id must not be empty")]
    EmptyId,
}

/// Filter a navigation tree down to what `allow` lets through.
///
/// Bottom-up fold: children are resolved first and a group survives only if
/// at least one of its children did. A group's own `required_permission` plays
/// no part in that. Top-level entries are always groups.
/// The input is never touched and sibling order is kept.
pub fn filter_menu_tree<F>(tree: &[MenuNode], allow: F) -> Vec<MenuNode>
where
    F: Fn(&RequiredPermission) -> bool,
{
    tree.iter().filter_map(|node| fold_group(node, &allow)).collect()
}

fn fold_node<F>(node: &MenuNode, allow: &F) -> Option<MenuNode>
where
    F: Fn(&RequiredPermission) -> bool,
{
    if node.is_leaf() {
        return passes(node, allow).then(|| node.clone());
    }
    fold_group(node, allow)
}

fn fold_group<F>(node: &MenuNode, allow: &F) -> Option<MenuNode>
where
    F: Fn(&RequiredPermission) -> bool,
{
    let children: Vec<MenuNode> = node
        .children
        .iter()
        .filter_map(|child| fold_node(child, allow))
        .collect();

    if children.is_empty() {
        return None;
    }

    Some(MenuNode {
        children,
        has_submenus: true,
        ..node_shell(node)
    })
}

fn passes<F>(node: &MenuNode, allow: &F) -> bool
where
    F: Fn(&RequiredPermission) -> bool,
{
    node.required_permission.as_ref().map_or(true, allow)
}

fn node_shell(node: &MenuNode) -> MenuNode {
    MenuNode {
        id: node.id.clone(),
        label: node.label.clone(),
        icon: node.icon.clone(),
        path: node.path.clone(),
        required_permission: node.required_permission.clone(),
        has_submenus: false,
        children: Vec::new(),
    }
}

/// The part of `tree` this session may see, using the standard capability table.
pub fn visible_menu_tree(tree: &[MenuNode], session: Option<&Session>) -> Vec<MenuNode> {
    let evaluator = PermissionEvaluator::standard();
    filter_menu_tree(tree, |required| {
        evaluator.has_permission(session, &required.module, &required.action)
    })
}

pub fn validate_menu_tree(tree: &[MenuNode]) -> Result<(), MenuError> {
    let mut seen = HashSet::new();
    for node in tree {
        validate_node(node, 1, &mut seen)?;
    }
    Ok(())
}

fn validate_node<'a>(node: &'a MenuNode, depth: usize, seen: &mut HashSet<&'a str>) -> Result<(), MenuError> {
    if depth > MAX_MENU_DEPTH {
        return Err(MenuError::TooDeep { id: node.id.clone(), depth });
    }
    if node.id.is_empty() {
        return Err(MenuError::EmptyId);
    }
    if !seen.insert(node.id.as_str()) {
        return Err(MenuError::DuplicateId(node.id.clone()));
    }
    for child in &node.children {
        validate_node(child, depth + 1, seen)?;
    }
    Ok(())
}

pub fn count_leaves(tree: &[MenuNode]) -> usize {
    tree.iter()
        .map(|node| {
            if node.children.is_empty() {
                usize::from(node.is_leaf())
            } else {
                count_leaves(&node.children)
            }
        })
        .sum()
}

/// Modules reachable with `acessar` anywhere in the tree, in tree order.
pub fn modules_in(tree: &[MenuNode]) -> Vec<String> {
    let mut modules = Vec::new();
    collect_modules(tree, &mut modules);
    modules
}

fn collect_modules(tree: &[MenuNode], out: &mut Vec<String>) {
    for node in tree {
        if let Some(required) = &node.required_permission {
            if required.action == MenuAction::Acessar.as_str() && !out.contains(&required.module) {
                out.push(required.module.clone());
            }
        }
        collect_modules(&node.children, out);
    }
}
