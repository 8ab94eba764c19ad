//! Server configuration from the environment

use std::env;

use anyhow::{Context, bail};
use auth::{AppEnv, AuthConfig};
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173";

/// Process-wide settings, read once at startup
pub struct ServerConfig {
    pub app_env: AppEnv,
    pub database_url: String,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_env = AppEnv::from_env_value(env::var("APP_ENV").ok().as_deref());

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port = match env::var("PORT") {
            Ok(port) => port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let frontend_origins = parse_origins(
            &env::var("FRONTEND_ORIGINS").unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string()),
        );

        let session_secret = env::var("SESSION_SECRET")
            .ok()
            .map(|s| decode_secret(&s))
            .transpose()?;

        let mut auth = auth_config_for(app_env, session_secret)?;
        auth.password_pepper = env::var("PASSWORD_PEPPER")
            .ok()
            .filter(|p| !p.is_empty())
            .map(String::into_bytes);

        Ok(Self {
            app_env,
            database_url,
            port,
            frontend_origins,
            auth,
        })
    }
}

/// Auth settings for the deployment environment.
///
/// Production needs a persistent secret, and never echoes reset tokens.
pub fn auth_config_for(app_env: AppEnv, session_secret: Option<[u8; 32]>) -> anyhow::Result<AuthConfig> {
    let config = match (app_env, session_secret) {
        (AppEnv::Production, Some(secret)) => AuthConfig::production(secret),
        (AppEnv::Production, None) => bail!("SESSION_SECRET must be set in production"),
        (AppEnv::Development, Some(secret)) => AuthConfig {
            session_secret: secret,
            ..AuthConfig::development()
        },
        // Random per process: sessions do not survive a restart
        (AppEnv::Development, None) => AuthConfig::development(),
    };
    Ok(config)
}

/// Comma-separated list, blanks dropped
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Standard base64 encoding of exactly 32 bytes
pub fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .context("SESSION_SECRET is not valid base64")?;

    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", bytes.len()))
}
