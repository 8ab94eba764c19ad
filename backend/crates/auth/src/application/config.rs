//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Deployment environment, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl AppEnv {
    /// Parse an `APP_ENV` value. Anything but `production`/`prod` is development.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") || v.eq_ignore_ascii_case("prod") => {
                AppEnv::Production
            }
            _ => AppEnv::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == AppEnv::Production
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Absolute session lifetime (7 days)
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Reset token lifetime (1 hour)
    pub reset_token_ttl: Duration,
    /// Return freshly issued reset tokens in the forgot-password response.
    /// Development only: production delivers them out of band.
    pub expose_reset_token: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "auth_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            reset_token_ttl: Duration::from_secs(3600), // 1 hour
            expose_reset_token: false,
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie, tokens echoed)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            expose_reset_token: true,
            ..Self::with_random_secret()
        }
    }

    /// Create config for production with a persistent secret
    pub fn production(session_secret: [u8; 32]) -> Self {
        Self {
            session_secret,
            cookie_secure: true,
            expose_reset_token: false,
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Session TTL as a chrono duration
    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::from_std(self.session_ttl).ok()
    }

    /// Reset token TTL as a chrono duration
    pub fn reset_token_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::from_std(self.reset_token_ttl).ok()
    }

    /// Cookie attributes for the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }
}
