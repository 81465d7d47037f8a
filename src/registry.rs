// fitgestao/src/registry.rs
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::menu::{validate_menu_tree, visible_menu_tree, MenuAction, MenuError, MenuNode};
use crate::models::session_model::Session;

lazy_static! {
    static ref MENU_REGISTRY: RwLock<Vec<MenuNode>> = RwLock::new(default_menu_tree());
}

// A poisoned lock still holds a whole tree: writers replace it in one assignment.
fn read_registry() -> RwLockReadGuard<'static, Vec<MenuNode>> {
    MENU_REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_registry() -> RwLockWriteGuard<'static, Vec<MenuNode>> {
    MENU_REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// FitGestão navigation as shipped.
pub fn default_menu_tree() -> Vec<MenuNode> {
    vec![
        MenuNode::group(
            "cadastros",
            "Cadastros",
            vec![
                MenuNode::leaf("alunos", "Alunos", "/alunos").requires("alunos", MenuAction::Acessar),
                MenuNode::leaf("funcionarios", "Funcionários", "/funcionarios").requires("funcionarios", MenuAction::Acessar),
                MenuNode::leaf("planos", "Planos", "/planos").requires("planos", MenuAction::Acessar),
                MenuNode::leaf("matriculas", "Nova matrícula", "/matriculas/nova").requires("matriculas", MenuAction::Criar),
            ],
        )
        .with_icon("users"),
        MenuNode::group(
            "financeiro",
            "Financeiro",
            vec![
                MenuNode::leaf("mensalidades", "Mensalidades", "/financeiro/mensalidades").requires("financeiro", MenuAction::Acessar),
                MenuNode::group(
                    "caixa",
                    "Caixa",
                    vec![
                        MenuNode::leaf("caixa-abrir", "Abrir caixa", "/financeiro/caixa/abrir").requires("caixa", MenuAction::Acessar),
                        MenuNode::leaf("caixa-fechar", "Fechar caixa", "/financeiro/caixa/fechar").requires("caixa", MenuAction::Editar),
                    ],
                ),
            ],
        )
        .with_icon("wallet"),
        MenuNode::group(
            "frequencia",
            "Frequência",
            vec![MenuNode::leaf("frequencia-registro", "Registro de frequência", "/frequencia").requires("frequencia", MenuAction::Acessar)],
        )
        .with_icon("calendar"),
        MenuNode::group(
            "relatorios",
            "Relatórios",
            vec![
                MenuNode::leaf("relatorios-gerais", "Relatórios gerais", "/relatorios").requires("relatorios", MenuAction::Acessar),
                MenuNode::leaf("relatorios-exportar", "Exportar", "/relatorios/exportar").requires("relatorios", MenuAction::Exportar),
            ],
        )
        .with_icon("chart"),
        MenuNode::group(
            "administracao",
            "Administração",
            vec![
                MenuNode::leaf("usuarios", "Usuários", "/usuarios").requires("usuarios", MenuAction::Acessar),
                MenuNode::leaf("licencas", "Licenças", "/licencas").requires("licencas", MenuAction::Acessar),
                MenuNode::leaf("sobre", "Sobre", "/sobre"),
            ],
        )
        .with_icon("settings"),
    ]
}

/// Replace the registered navigation tree after validating it.
pub fn register_menu_tree(tree: Vec<MenuNode>) -> Result<(), MenuError> {
    validate_menu_tree(&tree)?;
    *write_registry() = tree;
    Ok(())
}

pub fn load_menu_tree_from_file(path: &Path) -> Result<Vec<MenuNode>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read menu file {}", path.display()))?;
    let tree: Vec<MenuNode> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse menu file {}", path.display()))?;
    validate_menu_tree(&tree).context("Invalid menu definition")?;
    Ok(tree)
}

pub fn get_registered_menus() -> Vec<MenuNode> {
    read_registry().clone()
}

/// Filtered on every call; the result depends on the session at hand.
pub fn get_visible_menus(session: Option<&Session>) -> Vec<MenuNode> {
    visible_menu_tree(&read_registry(), session)
}

/// Restore the shipped navigation (useful for testing)
pub fn reset_registry() {
    *write_registry() = default_menu_tree();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{count_leaves, filter_menu_tree};
    use crate::models::permission_model::normalize_permissions;
    use crate::models::session_model::{Role, UserProfile};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_default_tree_is_valid() {
        let tree = default_menu_tree();
        assert!(validate_menu_tree(&tree).is_ok());
        assert_eq!(count_leaves(&tree), 13);
        assert_eq!(filter_menu_tree(&tree, |_| true), tree);
    }

    #[test]
    fn test_default_tree_for_roles() {
        let tree = default_menu_tree();

        let super_admin = Session::authenticated(UserProfile::new(Role::SuperAdmin, Default::default()));
        assert_eq!(visible_menu_tree(&tree, Some(&super_admin)), tree);

        let admin = Session::authenticated(UserProfile::new(Role::Admin, Default::default()));
        let admin_view = visible_menu_tree(&tree, Some(&admin));
        let admin_tools: Vec<&str> = admin_view[4].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(admin_tools, vec!["usuarios", "sobre"]);

        let instrutor = Session::authenticated(UserProfile::new(
            Role::Instrutor,
            normalize_permissions(&json!({"modules": {"frequencia": {"acessar": true}}})),
        ));
        let view = visible_menu_tree(&tree, Some(&instrutor));
        let top: Vec<&str> = view.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(top, vec!["frequencia", "administracao"]);
    }

    #[test]
    fn test_load_menu_tree_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "top", "label": "Top", "hasSubmenus": true, "children": [
                {{"id": "alunos", "label": "Alunos", "requiredPermission": {{"module": "alunos", "action": "acessar"}}}}
            ]}}]"#
        )
        .unwrap();

        let tree = load_menu_tree_from_file(file.path()).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].id, "alunos");
    }

    #[test]
    fn test_loaded_submenu_without_flag_hides_denied_children() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "fin", "label": "Financeiro", "children": [
                {{"id": "caixa", "label": "Caixa", "children": [
                    {{"id": "fechar", "label": "Fechar", "path": "/caixa/fechar",
                      "requiredPermission": {{"module": "caixa", "action": "editar"}}}}
                ]}}
            ]}}]"#
        )
        .unwrap();

        let tree = load_menu_tree_from_file(file.path()).unwrap();
        assert!(filter_menu_tree(&tree, |_| false).is_empty());

        let usuario = Session::authenticated(UserProfile::new(Role::Usuario, Default::default()));
        assert!(visible_menu_tree(&tree, Some(&usuario)).is_empty());

        let gerente = Session::authenticated(UserProfile::new(
            Role::Gerente,
            normalize_permissions(&json!({"modules": {"caixa": {"editar": true}}})),
        ));
        let view = visible_menu_tree(&tree, Some(&gerente));
        assert_eq!(view[0].children[0].children[0].id, "fechar");
    }

    #[test]
    fn test_load_menu_tree_rejects_invalid_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a", "label": "A"}}, {{"id": "a", "label": "B"}}]"#).unwrap();
        assert!(load_menu_tree_from_file(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_menu_tree_from_file(file.path()).is_err());

        assert!(load_menu_tree_from_file(Path::new("/nonexistent/menu.json")).is_err());
    }

    #[test]
    fn test_register_rejects_invalid_tree() {
        let dup = vec![
            MenuNode::leaf("x", "X", "/x"),
            MenuNode::leaf("x", "Y", "/y"),
        ];
        assert_eq!(register_menu_tree(dup), Err(MenuError::DuplicateId("x".to_string())));
    }
}
