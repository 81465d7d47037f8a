// fitgestao/src/bin/fitgestao.rs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use actix_web::{web, App, HttpServer};
use fitgestao::{
    configs::initializer::{
        fitgestao_initialize, load_session_key, session_middleware_with_key, setup_fitgestao_logging, FitgestaoConfig,
    },
    menu::{visible_menu_tree, MenuNode, RequiredPermission},
    models::session_model::{AuthPayload, Role, Session},
    registry::{get_registered_menus, load_menu_tree_from_file},
    router::register_fitgestao_routes,
    utils::{
        gate::{evaluate_gate, GateDecision, GateRequirements},
        jwt::create_session_token,
        rbac::PermissionEvaluator,
    },
};

#[derive(Parser)]
#[command(name = "fitgestao")]
#[command(about = "FitGestão access tool: evaluate sessions, menus and route gates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a module/action permission
    Check {
        /// Session payload JSON file, or - for stdin
        #[arg(short, long)]
        session: PathBuf,
        #[arg(short, long)]
        module: String,
        #[arg(short, long, default_value = "acessar")]
        action: String,
    },
    /// Check a special action
    Special {
        #[arg(short, long)]
        session: PathBuf,
        #[arg(short, long)]
        action: String,
    },
    /// Print the menu visible to a session
    Menu {
        #[arg(short, long)]
        session: PathBuf,
        /// Menu definition JSON (defaults to the built-in menu)
        #[arg(long, env = "FITGESTAO_MENU_PATH")]
        menu: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "tree")]
        format: MenuFormat,
    },
    /// Evaluate a route gate
    Gate {
        #[arg(short, long)]
        session: PathBuf,
        /// Accepted role (repeatable)
        #[arg(short, long = "role")]
        roles: Vec<String>,
        /// Required permission as module.action
        #[arg(short, long)]
        permission: Option<String>,
    },
    /// Mint a session token for development
    Token {
        #[arg(short, long)]
        session: PathBuf,
        #[arg(short, long)]
        user_id: String,
    },
    /// Serve the FitGestão routes
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MenuFormat {
    Tree,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

// Ok(false) means the evaluation denied.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Check { session, module, action } => {
            let session = read_session(&session)?;
            let allowed = PermissionEvaluator::standard().has_permission(Some(&session), &module, &action);
            println!("{}.{}: {}", module, action, verdict(allowed));
            Ok(allowed)
        }
        Commands::Special { session, action } => {
            let session = read_session(&session)?;
            let allowed = PermissionEvaluator::standard().has_special_action(Some(&session), &action);
            println!("{}: {}", action, verdict(allowed));
            Ok(allowed)
        }
        Commands::Menu { session, menu, format } => {
            let session = read_session(&session)?;
            let tree = match menu {
                Some(path) => load_menu_tree_from_file(&path)?,
                None => get_registered_menus(),
            };
            let visible = visible_menu_tree(&tree, Some(&session));
            match format {
                MenuFormat::Json => println!("{}", serde_json::to_string_pretty(&visible)?),
                MenuFormat::Tree => print_tree(&visible, 0),
            }
            Ok(true)
        }
        Commands::Gate { session, roles, permission } => {
            let session = read_session(&session)?;
            let requirements = build_requirements(&roles, permission.as_deref())?;
            let decision = evaluate_gate(Some(&session), &requirements);
            print_decision(&decision);
            Ok(decision.is_granted())
        }
        Commands::Token { session, user_id } => {
            let payload = read_payload(&session)?;
            let config = FitgestaoConfig::from_env().context("JWT_SECRET must be configured to mint tokens")?;
            println!("{}", create_session_token(&user_id, &payload, &config)?);
            Ok(true)
        }
        Commands::Serve { bind } => {
            serve(bind)?;
            Ok(true)
        }
    }
}

fn read_payload(path: &Path) -> Result<AuthPayload> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read session from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read session file {}", path.display()))?
    };
    serde_json::from_str(&raw).context("Session is not a valid auth payload")
}

fn read_session(path: &Path) -> Result<Session> {
    Ok(Session::from_payload(&read_payload(path)?))
}

fn build_requirements(roles: &[String], permission: Option<&str>) -> Result<GateRequirements> {
    let mut requirements = GateRequirements::none();

    if !roles.is_empty() {
        let parsed = roles
            .iter()
            .map(|r| Role::parse(r).with_context(|| format!("Unknown role '{}'", r)))
            .collect::<Result<Vec<_>>>()?;
        requirements = GateRequirements::roles(parsed);
    }

    if let Some(key) = permission {
        let Some(required) = RequiredPermission::parse(key) else {
            bail!("Permission must look like module.action, got '{}'", key);
        };
        requirements = requirements.and_permission(&required.module, &required.action);
    }

    Ok(requirements)
}

fn verdict(allowed: bool) -> &'static str {
    if allowed {
        "allowed"
    } else {
        "denied"
    }
}

fn print_decision(decision: &GateDecision) {
    match decision {
        GateDecision::Granted => println!("granted"),
        GateDecision::Loading => println!("loading"),
        GateDecision::Unauthenticated => println!("unauthenticated: redirect to login"),
        GateDecision::LicenseExpired => println!("license expired"),
        GateDecision::WrongRole { actual, allowed } => {
            let allowed: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            println!(
                "wrong role: {} not in [{}]",
                actual.map(|r| r.as_str()).unwrap_or("none"),
                allowed.join(", ")
            );
        }
        GateDecision::PermissionDenied { required, special_actions } => {
            println!("permission denied: {}", required);
            if !special_actions.is_empty() {
                println!("  special actions: {}", special_actions.join(", "));
            }
        }
    }
}

fn print_tree(nodes: &[MenuNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match &node.path {
            Some(path) => println!("{}- {} ({})", indent, node.label, path),
            None => println!("{}+ {}", indent, node.label),
        }
        print_tree(&node.children, depth + 1);
    }
}

fn serve(bind: String) -> Result<()> {
    let config = FitgestaoConfig::from_env()?;
    setup_fitgestao_logging(&config);
    fitgestao_initialize(&config)?;

    actix_web::rt::System::new().block_on(async move {
        log::info!("🚀 FitGestão listening on {}", bind);
        let data = web::Data::new(config.clone());
        // Workers must agree on the key or their cookies reject each other.
        let key = load_session_key(&config);

        HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .wrap(session_middleware_with_key(&config, key.clone()))
                .service(register_fitgestao_routes())
        })
        .bind(&bind)
        .with_context(|| format!("Failed to bind {}", bind))?
        .run()
        .await?;

        Ok::<(), anyhow::Error>(())
    })
}
