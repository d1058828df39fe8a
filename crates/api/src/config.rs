use crate::auth::jwt::JwtConfig;

/// Argon2id digest of the admin sign-up key used when `ADMIN_SIGNUP_KEY_HASH`
/// is not set. The plaintext key is never stored or logged anywhere.
pub const DEFAULT_ADMIN_SIGNUP_KEY_HASH: &str =
    "$argon2id$v=19$m=65536,t=3,p=4$8Us7xohW4tWs8X/747dzjg$DtCbX44fuylcbyHjiJNn/G1sWwu64DxNYeIaUl8DZrg";

/// Runtime settings for the HTTP server, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Allowed CORS origins, from the comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight requests before giving up.
    pub shutdown_timeout_secs: u64,
    /// Token signing secret and lifetimes.
    pub jwt: JwtConfig,
    /// PHC-format Argon2id digest that admin sign-up keys are verified against.
    pub admin_signup_key_hash: String,
}

impl ServerConfig {
    /// Read settings from the environment, falling back to local-dev defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `ADMIN_SIGNUP_KEY_HASH` | built-in Argon2id digest   |
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 3000),
            cors_origins: split_origins(&env_or("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            admin_signup_key_hash: env_or("ADMIN_SIGNUP_KEY_HASH", DEFAULT_ADMIN_SIGNUP_KEY_HASH),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
