// src/configs/initializer.rs
use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use anyhow::{Context, Error as AnyhowError};
use env_logger::Env;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Once;
use std::{env, time::Duration};
use thiserror::Error;

use crate::registry::{load_menu_tree_from_file, register_menu_tree};

pub const MIN_JWT_SECRET_LEN: usize = 32;
pub const MIN_SESSION_SECRET_LEN: usize = 64;
/// One year.
pub const MAX_SESSION_TIMEOUT_SECS: u64 = 31_536_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least 32 characters long")]
    WeakJwtSecret,
    #[error("SESSION_SECRET must be at least 64 characters long")]
    WeakSessionSecret,
    #[error("SESSION_SECRET is required in production")]
    MissingSessionSecret,
    #[error("invalid SESSION_TIMEOUT: {0}")]
    InvalidTimeout(String),
    #[error("SESSION_TIMEOUT must be at most 31536000 seconds, got {0}")]
    TimeoutTooLong(u64),
}

#[derive(Debug, Clone)]
pub struct FitgestaoConfig {
    pub jwt_secret: String,
    pub session_secret: String,
    pub environment: String,
    pub log_level: String,
    pub session_timeout: Duration,
    pub login_path: String,
    pub menu_path: Option<PathBuf>,
}

impl FitgestaoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`FitgestaoConfig::from_env`] but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_timeout = match lookup("SESSION_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            None => 86400,
        };

        let config = Self {
            jwt_secret: lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            session_secret: lookup("SESSION_SECRET").unwrap_or_default(),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_timeout: Duration::from_secs(session_timeout),
            login_path: lookup("FITGESTAO_LOGIN_PATH").unwrap_or_else(|| "/login".to_string()),
            menu_path: lookup("FITGESTAO_MENU_PATH").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakJwtSecret);
        }
        if self.session_timeout.as_secs() > MAX_SESSION_TIMEOUT_SECS {
            return Err(ConfigError::TimeoutTooLong(self.session_timeout.as_secs()));
        }
        if self.session_secret.is_empty() {
            if self.is_production() {
                return Err(ConfigError::MissingSessionSecret);
            }
            warn!("⚠️  SESSION_SECRET not set, a generated key will be used - NOT suitable for production!");
        } else if self.session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::WeakSessionSecret);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Session lifetime in seconds, capped at [`MAX_SESSION_TIMEOUT_SECS`] for
    /// configs that skipped `validate`.
    pub fn session_timeout_secs(&self) -> i64 {
        let secs = self.session_timeout.as_secs().min(MAX_SESSION_TIMEOUT_SECS);
        i64::try_from(secs).unwrap_or(i64::MAX)
    }
}

/// Cookie signing key. Without a secret a fresh key is generated, so build it
/// once per process and share it between workers.
pub fn load_session_key(config: &FitgestaoConfig) -> Key {
    if config.session_secret.is_empty() {
        warn!("⚠️  Using generated session key - sessions will not survive a restart");
        Key::generate()
    } else {
        Key::from(config.session_secret.as_bytes())
    }
}

pub fn get_session_middleware(config: &FitgestaoConfig) -> SessionMiddleware<CookieSessionStore> {
    session_middleware_with_key(config, load_session_key(config))
}

pub fn session_middleware_with_key(config: &FitgestaoConfig, secret_key: Key) -> SessionMiddleware<CookieSessionStore> {
    let session_ttl = actix_web::cookie::time::Duration::seconds(config.session_timeout_secs());

    SessionMiddleware::builder(CookieSessionStore::default(), secret_key)
        .cookie_name("fitgestao_session".to_string())
        .cookie_secure(config.is_production())
        .cookie_http_only(true)
        .cookie_same_site(if config.is_production() {
            SameSite::Strict
        } else {
            SameSite::Lax
        })
        .session_lifecycle(PersistentSession::default().session_ttl(session_ttl))
        .build()
}

static LOGGING: Once = Once::new();

pub fn setup_fitgestao_logging(config: &FitgestaoConfig) {
    LOGGING.call_once(|| {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level))
            .format_timestamp_millis()
            .try_init();

        info!("✅ FitGestão logging initialized");
        info!("🔧 FitGestão environment: {}", config.environment);
        debug!("🔍 FitGestão debug logging active");
    });
}

/// Registers the configured navigation file, if any. Without one the shipped
/// tree stays in place.
pub fn fitgestao_initialize(config: &FitgestaoConfig) -> Result<(), AnyhowError> {
    if let Some(path) = &config.menu_path {
        let tree = load_menu_tree_from_file(path)?;
        register_menu_tree(tree).context("Failed to register menu tree")?;
        info!("📋 Menu loaded from {}", path.display());
    }
    info!("FitGestão initialized successfully");
    Ok(())
}
